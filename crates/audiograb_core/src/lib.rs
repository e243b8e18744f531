//! Audiograb core: pure domain types, output classification, command
//! construction and the presentation state machine.
mod classify;
mod command;
mod effect;
mod job;
mod msg;
mod options;
mod state;
mod status;
mod summary;
mod update;
mod urls;
mod view_model;

pub use classify::{classify_line, StatusTag};
pub use command::{
    build_command, CommandLine, ToolLocations, AUDIO_QUALITY, CONCURRENT_FRAGMENTS, JS_RUNTIME,
    OUTPUT_TEMPLATE, PARALLEL_FRAGMENTS, SINGLE_ITEM_FLAG,
};
pub use effect::Effect;
pub use job::{number_jobs, Job};
pub use msg::Msg;
pub use options::{AudioFormat, BatchOptions, ParseOptionError, PlaylistMode};
pub use state::{AppState, FormState, START_MARKER};
pub use status::{JobIndex, JobStatus, SENTINEL_CODE};
pub use summary::BatchSummary;
pub use update::update;
pub use urls::parse_urls;
pub use view_model::{AppViewModel, JobRowView};
