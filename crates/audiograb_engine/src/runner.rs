use audiograb_core::{
    build_command, classify_line, BatchOptions, Job, JobStatus, ToolLocations, SENTINEL_CODE,
};
use grab_logging::{grab_debug, grab_warn};

use crate::error::RunError;
use crate::log_sink::LogSink;
use crate::process::{Spawner, WorkerProcess};
use crate::types::{EngineEvent, EventSink, JobResult};

/// Runs one job to completion: spawn, stream output, record the exit code.
pub struct WorkerRunner<'a> {
    spawner: &'a dyn Spawner,
    log: &'a dyn LogSink,
    events: &'a dyn EventSink,
    tools: &'a ToolLocations,
}

impl<'a> WorkerRunner<'a> {
    pub fn new(
        spawner: &'a dyn Spawner,
        log: &'a dyn LogSink,
        events: &'a dyn EventSink,
        tools: &'a ToolLocations,
    ) -> Self {
        Self {
            spawner,
            log,
            events,
            tools,
        }
    }

    /// Never fails: anything that goes wrong becomes the sentinel code plus
    /// an error-log entry.
    pub fn run(&self, job: &Job, options: &BatchOptions) -> JobResult {
        let command = build_command(&job.url, options, self.tools);
        let code = match self.spawner.spawn(&command) {
            Ok(mut process) => match self.drive(job, process.as_mut()) {
                Ok(code) => code,
                Err(err) => {
                    process.kill();
                    self.record_failure(job, &err);
                    SENTINEL_CODE
                }
            },
            Err(err) => {
                self.record_failure(job, &RunError::Spawn(err));
                SENTINEL_CODE
            }
        };
        JobResult {
            index: job.index,
            url: job.url.clone(),
            code,
        }
    }

    fn drive(&self, job: &Job, process: &mut dyn WorkerProcess) -> Result<i32, RunError> {
        self.events.emit(EngineEvent::Status {
            index: job.index,
            status: JobStatus::Running,
        });
        self.log
            .append(&format!("=== START {} URL={}", timestamp(), job.url))
            .map_err(RunError::Log)?;

        let prefix = job.prefix();
        for line in process.lines() {
            let line = line.map_err(RunError::Read)?;
            let prefixed = format!("{prefix}{line}");
            grab_debug!("{prefixed}");
            self.log.append(&prefixed).map_err(RunError::Log)?;
            self.events.emit(EngineEvent::Log(prefixed));
            if let Some(tag) = classify_line(&line) {
                self.events.emit(EngineEvent::Status {
                    index: job.index,
                    status: tag.into(),
                });
            }
        }

        let code = process
            .wait()
            .map_err(RunError::Wait)?
            .unwrap_or(SENTINEL_CODE);
        self.log
            .append(&format!("=== END returncode={code}"))
            .map_err(RunError::Log)?;
        grab_debug!("job {} exited with {code}", job.index);
        Ok(code)
    }

    fn record_failure(&self, job: &Job, err: &RunError) {
        grab_warn!("job {} ({}) failed: {err}", job.index, job.url);
        let _ = self
            .log
            .append_error(&format!("ERROR for {}: {err}", job.url));
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
