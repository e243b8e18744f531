//! Audiograb engine: tool provisioning, worker processes and batch execution.
mod config;
mod coordinator;
mod engine;
mod error;
mod log_sink;
mod paths;
mod persist;
mod process;
mod provision;
mod runner;
mod types;
mod url_source;

pub use config::EngineConfig;
pub use coordinator::{Coordinator, MAX_WORKERS};
pub use engine::{provision_tools, EngineHandle, ProvisionReport};
pub use error::{ProvisionError, RunError};
pub use log_sink::{FileLogSink, LogSink, MemoryLogSink};
pub use paths::AppPaths;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use process::{OutputLines, Spawner, SystemSpawner, WorkerProcess};
pub use provision::{
    Provisioner, ReqwestTransport, ToolSources, ToolState, Transport, CONVERTER_ARCHIVE_URL,
    DOWNLOADER_RELEASE_URL,
};
pub use runner::WorkerRunner;
pub use types::{ChannelEventSink, EngineEvent, EventSink, JobResult};
pub use url_source::{load_url_file, UrlSourceError};
