use std::time::Duration;

use crate::JobStatus;

/// Final tally of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs whose result could not be retrieved at all.
    pub errored: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Counts one terminal status. Non-terminal statuses are ignored.
    pub fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Done => self.succeeded += 1,
            JobStatus::Failed(_) => self.failed += 1,
            JobStatus::Error => self.errored += 1,
            JobStatus::Queued | JobStatus::Running | JobStatus::Progress(_) => {}
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.errored
    }
}
