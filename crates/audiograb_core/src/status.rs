use std::fmt;

use crate::StatusTag;

/// 1-based position of a job in its batch; the key that ties events to rows.
pub type JobIndex = usize;

/// Exit code reported when a job failed before the tool could report one.
pub const SENTINEL_CODE: i32 = -1;

/// Visible status of one job.
///
/// `Queued` is initial. `Progress` values overwrite each other freely.
/// `Done`, `Failed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Progress(StatusTag),
    Done,
    Failed(i32),
    Error,
}

impl JobStatus {
    /// Final status for a process that exited with `code`.
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            JobStatus::Done
        } else {
            JobStatus::Failed(code)
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed(_) | JobStatus::Error)
    }
}

impl From<StatusTag> for JobStatus {
    fn from(tag: StatusTag) -> Self {
        JobStatus::Progress(tag)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Progress(tag) => write!(f, "{tag}"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed(code) => write!(f, "failed ({code})"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}
