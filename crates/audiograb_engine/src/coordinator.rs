use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use audiograb_core::{BatchOptions, BatchSummary, Job, JobStatus, ToolLocations};
use grab_logging::{grab_error, grab_info};

use crate::log_sink::LogSink;
use crate::process::Spawner;
use crate::runner::WorkerRunner;
use crate::types::{EngineEvent, EventSink, JobResult};

pub const MAX_WORKERS: usize = 4;

/// Runs a batch on a bounded pool and aggregates the results.
pub struct Coordinator {
    spawner: Arc<dyn Spawner>,
    log: Arc<dyn LogSink>,
    tools: ToolLocations,
    max_workers: usize,
}

impl Coordinator {
    pub fn new(spawner: Arc<dyn Spawner>, log: Arc<dyn LogSink>, tools: ToolLocations) -> Self {
        Self {
            spawner,
            log,
            tools,
            max_workers: MAX_WORKERS,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn pool_size(&self, job_count: usize) -> usize {
        self.max_workers.min(job_count)
    }

    /// Blocks until every job has finished. Final statuses arrive in
    /// completion order; `Done` is always the last event.
    pub fn run(&self, jobs: Vec<Job>, options: &BatchOptions, events: &dyn EventSink) -> BatchSummary {
        let started = Instant::now();
        let workers = self.pool_size(jobs.len());
        grab_info!("batch of {} jobs on {workers} workers", jobs.len());

        let queue = Mutex::new(VecDeque::from(jobs));
        let mut summary = BatchSummary::default();

        thread::scope(|scope| {
            let (done_tx, done_rx) = mpsc::channel::<(Job, thread::Result<JobResult>)>();
            for _ in 0..workers {
                let done_tx = done_tx.clone();
                let queue = &queue;
                scope.spawn(move || {
                    let runner = WorkerRunner::new(
                        self.spawner.as_ref(),
                        self.log.as_ref(),
                        events,
                        &self.tools,
                    );
                    while let Some(job) = next_job(queue) {
                        let outcome =
                            panic::catch_unwind(AssertUnwindSafe(|| runner.run(&job, options)));
                        if done_tx.send((job, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            for (job, outcome) in done_rx {
                let status = match outcome {
                    Ok(result) => JobStatus::from_exit_code(result.code),
                    Err(payload) => self.record_panic(&job, payload.as_ref(), events),
                };
                summary.record(status);
                events.emit(EngineEvent::Status {
                    index: job.index,
                    status,
                });
            }
        });

        summary.elapsed = started.elapsed();
        grab_info!(
            "batch finished: {} ok, {} failed, {} errors",
            summary.succeeded,
            summary.failed,
            summary.errored
        );
        events.emit(EngineEvent::Log(format!(
            "All done. Elapsed: {:.1}s",
            summary.elapsed.as_secs_f64()
        )));
        events.emit(EngineEvent::Done(summary));
        summary
    }

    fn record_panic(&self, job: &Job, payload: &(dyn Any + Send), events: &dyn EventSink) -> JobStatus {
        let message = panic_message(payload);
        grab_error!("job {} ({}) aborted: {message}", job.index, job.url);
        let _ = self
            .log
            .append_error(&format!("Exception for {}: {message}", job.url));
        events.emit(EngineEvent::Log(format!(
            "[ERROR] {} raised exception: {message}",
            job.url
        )));
        JobStatus::Error
    }
}

fn next_job(queue: &Mutex<VecDeque<Job>>) -> Option<Job> {
    queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
