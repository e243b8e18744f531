use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::view_model::{AppViewModel, JobRowView};
use crate::{AudioFormat, BatchOptions, BatchSummary, Job, JobIndex, JobStatus, PlaylistMode};

pub const START_MARKER: &str = "=== Start ===";

/// Values collected by the input form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub urls_text: String,
    pub output_dir: String,
    pub audio_format: AudioFormat,
    pub playlist_mode: PlaylistMode,
    /// Ledger location, when the host has one to offer.
    pub archive_path: Option<PathBuf>,
    pub use_archive: bool,
}

impl FormState {
    pub(crate) fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            output_dir: PathBuf::from(self.output_dir.trim()),
            audio_format: self.audio_format,
            playlist_mode: self.playlist_mode,
            download_archive: self
                .archive_path
                .clone()
                .filter(|_| self.use_archive),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobRow {
    url: String,
    status: JobStatus,
    terminal_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    form: FormState,
    jobs: BTreeMap<JobIndex, JobRow>,
    log: Vec<String>,
    running: bool,
    notice: Option<String>,
    last_summary: Option<BatchSummary>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form: FormState) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn job_status(&self, index: JobIndex) -> Option<JobStatus> {
        self.jobs.get(&index).map(|row| row.status)
    }

    pub fn terminal_code(&self, index: JobIndex) -> Option<i32> {
        self.jobs.get(&index).and_then(|row| row.terminal_code)
    }

    /// Log lines in arrival order; borrowed so renderers never copy the whole log.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            urls_text: self.form.urls_text.clone(),
            output_dir: self.form.output_dir.clone(),
            audio_format: self.form.audio_format,
            playlist_mode: self.form.playlist_mode,
            archive_available: self.form.archive_path.is_some(),
            use_archive: self.form.use_archive,
            start_enabled: !self.running,
            jobs: self
                .jobs
                .iter()
                .map(|(index, row)| JobRowView {
                    index: *index,
                    url: row.url.clone(),
                    status: row.status,
                })
                .collect(),
            notice: self.notice.clone(),
            last_summary: self.last_summary,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn form_mut(&mut self) -> &mut FormState {
        self.dirty = true;
        &mut self.form
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.dirty = true;
    }

    /// Replaces the job table with a fresh batch and locks the start control.
    pub(crate) fn begin_batch(&mut self, jobs: &[Job]) {
        self.jobs = jobs
            .iter()
            .map(|job| {
                (
                    job.index,
                    JobRow {
                        url: job.url.clone(),
                        status: JobStatus::Queued,
                        terminal_code: None,
                    },
                )
            })
            .collect();
        self.log.push(START_MARKER.to_string());
        self.running = true;
        self.notice = None;
        self.last_summary = None;
        self.dirty = true;
    }

    pub(crate) fn append_log(&mut self, text: String) {
        self.log.push(text);
        self.dirty = true;
    }

    /// Applies a status to a known job. Unknown indices and jobs that are
    /// already terminal are left alone.
    pub(crate) fn apply_status(&mut self, index: JobIndex, status: JobStatus) {
        let Some(row) = self.jobs.get_mut(&index) else {
            return;
        };
        if row.status.is_terminal() {
            return;
        }
        row.status = status;
        row.terminal_code = match status {
            JobStatus::Done => Some(0),
            JobStatus::Failed(code) => Some(code),
            _ => None,
        };
        self.dirty = true;
    }

    pub(crate) fn finish_batch(&mut self, summary: BatchSummary) {
        self.running = false;
        self.last_summary = Some(summary);
        self.dirty = true;
    }
}
