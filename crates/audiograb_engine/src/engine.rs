use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use audiograb_core::{BatchOptions, Job};
use grab_logging::{grab_debug, grab_info, grab_warn};

use crate::coordinator::Coordinator;
use crate::log_sink::{FileLogSink, LogSink};
use crate::process::{Spawner, SystemSpawner};
use crate::provision::{Provisioner, ReqwestTransport, ToolState};
use crate::types::{ChannelEventSink, EngineEvent, EventSink};
use crate::{ensure_output_dir, EngineConfig, ProvisionError};

enum EngineCommand {
    StartBatch { jobs: Vec<Job>, options: BatchOptions },
}

/// Owns the background engine thread. Events are polled with `try_recv`.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    spawner: SystemSpawner,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> io::Result<Self> {
        config.paths.ensure_dirs()?;
        let log: Arc<dyn LogSink> = Arc::new(FileLogSink::open(
            &config.paths.combined_log(),
            &config.paths.error_log(),
        )?);
        let spawner = SystemSpawner::new();
        let workers: Arc<dyn Spawner> = Arc::new(spawner.clone());

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let sink = ChannelEventSink::new(event_tx);
            let tools = ToolSetup::build(&config);
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartBatch { jobs, options } => {
                        if let Some(tools) = &tools {
                            tools.prepare(&sink);
                        }
                        // Resolved after provisioning so a converter fetched just now is used.
                        let coordinator = Coordinator::new(
                            workers.clone(),
                            log.clone(),
                            config.paths.tool_locations(),
                        )
                        .with_max_workers(config.max_workers);
                        run_batch(&coordinator, jobs, options, &sink);
                    }
                }
            }
            grab_debug!("engine thread exiting");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            spawner,
        })
    }

    pub fn start_batch(&self, jobs: Vec<Job>, options: BatchOptions) {
        let _ = self.cmd_tx.send(EngineCommand::StartBatch { jobs, options });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Kills any worker process still running.
    pub fn shutdown(&self) {
        self.spawner.terminate_all();
    }
}

/// Outcome of one provisioning pass; each tool is reported separately.
#[derive(Debug)]
pub struct ProvisionReport {
    pub downloader: Result<ToolState, ProvisionError>,
    pub converter: Result<ToolState, ProvisionError>,
}

/// Provisions both tools on a private runtime, blocking the caller.
pub fn provision_tools(config: &EngineConfig) -> Result<ProvisionReport, ProvisionError> {
    Ok(ToolSetup::new(config)?.run())
}

struct ToolSetup {
    runtime: tokio::runtime::Runtime,
    provisioner: Provisioner,
}

impl ToolSetup {
    fn new(config: &EngineConfig) -> Result<Self, ProvisionError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let transport = ReqwestTransport::new()?;
        let provisioner = Provisioner::new(
            config.paths.clone(),
            config.sources.clone(),
            Arc::new(transport),
        )
        .with_self_update(config.self_update);
        Ok(Self {
            runtime,
            provisioner,
        })
    }

    fn build(config: &EngineConfig) -> Option<Self> {
        if !config.provision {
            return None;
        }
        Self::new(config)
            .inspect_err(|err| grab_warn!("tool setup unavailable: {err}"))
            .ok()
    }

    fn run(&self) -> ProvisionReport {
        self.runtime.block_on(async {
            ProvisionReport {
                downloader: self.provisioner.ensure_downloader().await,
                converter: self.provisioner.ensure_converter().await,
            }
        })
    }

    /// Tool failures are reported and the batch goes ahead regardless.
    fn prepare(&self, sink: &dyn EventSink) {
        let report = self.run();
        match report.downloader {
            Ok(state) => grab_debug!("downloader: {state:?}"),
            Err(err) => {
                grab_warn!("downloader setup failed: {err}");
                sink.emit(EngineEvent::Log(format!("Failed to ensure yt-dlp: {err}")));
            }
        }
        match report.converter {
            Ok(state) => grab_debug!("converter: {state:?}"),
            Err(err) => {
                grab_warn!("converter setup failed: {err}");
                sink.emit(EngineEvent::Log(format!(
                    "Warning: ffmpeg unavailable ({err}). Conversion may fail."
                )));
            }
        }
    }
}

fn run_batch(
    coordinator: &Coordinator,
    jobs: Vec<Job>,
    mut options: BatchOptions,
    sink: &dyn EventSink,
) {
    if let Ok(absolute) = std::path::absolute(&options.output_dir) {
        options.output_dir = absolute;
    }
    if let Err(err) = ensure_output_dir(&options.output_dir) {
        grab_warn!("output dir {}: {err}", options.output_dir.display());
        sink.emit(EngineEvent::Log(format!(
            "Output directory unavailable: {err}"
        )));
    }
    grab_info!(
        "starting batch into {} as {}",
        options.output_dir.display(),
        options.audio_format
    );
    coordinator.run(jobs, &options, sink);
}
