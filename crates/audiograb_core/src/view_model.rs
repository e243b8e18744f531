use crate::{AudioFormat, BatchSummary, JobIndex, JobStatus, PlaylistMode};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub urls_text: String,
    pub output_dir: String,
    pub audio_format: AudioFormat,
    pub playlist_mode: PlaylistMode,
    pub archive_available: bool,
    pub use_archive: bool,
    pub start_enabled: bool,
    pub jobs: Vec<JobRowView>,
    pub notice: Option<String>,
    pub last_summary: Option<BatchSummary>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub index: JobIndex,
    pub url: String,
    pub status: JobStatus,
}
