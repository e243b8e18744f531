use std::sync::mpsc;

use audiograb_core::{BatchSummary, JobIndex, JobStatus};

/// Everything the engine reports back to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// One line for the on-screen log, already prefixed with the job number.
    Log(String),
    Status { index: JobIndex, status: JobStatus },
    /// Sent exactly once per batch, after every job reached a terminal status.
    Done(BatchSummary),
}

/// Outcome of one worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub index: JobIndex,
    pub url: String,
    pub code: i32,
}

/// Receives engine events from any worker thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        // A closed receiver means the host is gone; nothing left to tell.
        let _ = self.tx.send(event);
    }
}
