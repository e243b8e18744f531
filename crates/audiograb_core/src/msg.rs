use crate::{AudioFormat, BatchSummary, JobIndex, JobStatus, PlaylistMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// User typed or browsed to an output directory.
    OutputDirChanged(String),
    AudioFormatSelected(AudioFormat),
    PlaylistModeSelected(PlaylistMode),
    /// User toggled skipping of items recorded in the download archive.
    ArchiveToggled(bool),
    /// User clicked Download.
    StartClicked,
    /// Engine produced a log line.
    LogAppended(String),
    /// Engine reported a status for one job.
    JobStatusChanged { index: JobIndex, status: JobStatus },
    /// Engine finished the whole batch.
    BatchDone(BatchSummary),
    /// UI drain tick.
    Tick,
}
