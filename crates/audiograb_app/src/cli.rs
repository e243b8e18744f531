use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use audiograb_core::{number_jobs, BatchOptions, BatchSummary, JobIndex, JobStatus, PlaylistMode};
use audiograb_engine::{
    ensure_output_dir, load_url_file, provision_tools, AppPaths, Coordinator, EngineConfig,
    EngineEvent, EventSink, FileLogSink, SystemSpawner,
};
use grab_logging::{grab_info, grab_warn};

use crate::Args;

/// Batch mode: every URL in `urls.txt`, console output only.
pub fn run(args: &Args, paths: &AppPaths) -> anyhow::Result<ExitCode> {
    paths
        .ensure_dirs()
        .with_context(|| format!("preparing {}", paths.base().display()))?;

    let urls = match load_url_file(&paths.urls_file()) {
        Ok(urls) => urls,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let config = EngineConfig {
        paths: paths.clone(),
        ..EngineConfig::for_base_dir(paths.base())
    };
    println!("[INFO] Checking tools in {}", paths.bin_dir().display());
    let report = provision_tools(&config).context("starting tool setup")?;
    if let Err(err) = report.downloader {
        eprintln!("[ERROR] Failed to ensure yt-dlp: {err}");
        return Ok(ExitCode::FAILURE);
    }
    if let Err(err) = report.converter {
        eprintln!("[WARN] ffmpeg unavailable ({err}). Conversion may fail.");
    }

    let options = batch_options(args, paths);
    ensure_output_dir(&options.output_dir)
        .with_context(|| format!("output directory {}", options.output_dir.display()))?;

    let jobs = number_jobs(urls);
    println!(
        "[INFO] {} URL(s) -> {} as {} ({})",
        jobs.len(),
        options.output_dir.display(),
        options.audio_format,
        options.playlist_mode
    );
    grab_info!("batch mode with {} jobs", jobs.len());

    let sink = ConsoleSink::new(
        jobs.iter().map(|job| (job.index, job.url.clone())),
        paths.combined_log(),
        paths.error_log(),
    );
    let log = FileLogSink::open(&paths.combined_log(), &paths.error_log())
        .context("opening tool logs")?;
    let coordinator = Coordinator::new(
        Arc::new(SystemSpawner::new()),
        Arc::new(log),
        paths.tool_locations(),
    )
    .with_max_workers(config.max_workers);

    let started = Instant::now();
    let summary = coordinator.run(jobs, &options, &sink);
    grab_info!(
        "batch mode finished in {:?}: {} ok, {} failed, {} errors",
        started.elapsed(),
        summary.succeeded,
        summary.failed,
        summary.errored
    );
    Ok(ExitCode::SUCCESS)
}

fn batch_options(args: &Args, paths: &AppPaths) -> BatchOptions {
    let output_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| paths.default_output_dir().to_path_buf());
    BatchOptions {
        output_dir: std::path::absolute(&output_dir).unwrap_or(output_dir),
        audio_format: args.format,
        playlist_mode: if args.single && !args.playlist {
            PlaylistMode::Single
        } else {
            PlaylistMode::Playlist
        },
        download_archive: args.archive.then(|| paths.download_archive()),
    }
}

/// Prints tool output, one summary line per finished job and the batch totals.
struct ConsoleSink {
    urls: HashMap<JobIndex, String>,
    combined_log: PathBuf,
    error_log: PathBuf,
}

impl ConsoleSink {
    fn new(
        urls: impl IntoIterator<Item = (JobIndex, String)>,
        combined_log: PathBuf,
        error_log: PathBuf,
    ) -> Self {
        Self {
            urls: urls.into_iter().collect(),
            combined_log,
            error_log,
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::Log(line) => println!("{line}"),
            EngineEvent::Status { index, status } => {
                let Some(url) = self.urls.get(&index) else {
                    grab_warn!("status for unknown job {index}");
                    return;
                };
                if let Some(line) = summary_line(url, status) {
                    println!("{line}");
                }
            }
            EngineEvent::Done(summary) => {
                for line in done_lines(&summary, &self.combined_log, &self.error_log) {
                    println!("{line}");
                }
            }
        }
    }
}

/// Console line for a terminal status; panicked jobs were already reported.
fn summary_line(url: &str, status: JobStatus) -> Option<String> {
    match status {
        JobStatus::Done => Some(format!("[SUMMARY] {url} -> OK")),
        JobStatus::Failed(code) => Some(format!("[SUMMARY] {url} -> FAILED (code {code})")),
        _ => None,
    }
}

/// Closing lines of a batch: totals, then where the tool output went.
fn done_lines(summary: &BatchSummary, combined_log: &Path, error_log: &Path) -> [String; 3] {
    [
        format!(
            "[DONE] {} ok, {} failed, {} errors. Elapsed: {:.1}s",
            summary.succeeded,
            summary.failed,
            summary.errored,
            summary.elapsed.as_secs_f64()
        ),
        format!("Logs: {}", combined_log.display()),
        format!("Errors: {}", error_log.display()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiograb_core::StatusTag;
    use clap::Parser;

    #[test]
    fn summary_lines_cover_terminal_results() {
        assert_eq!(
            summary_line("https://a", JobStatus::Done).as_deref(),
            Some("[SUMMARY] https://a -> OK")
        );
        assert_eq!(
            summary_line("https://a", JobStatus::Failed(-1)).as_deref(),
            Some("[SUMMARY] https://a -> FAILED (code -1)")
        );
        assert_eq!(summary_line("https://a", JobStatus::Error), None);
        assert_eq!(
            summary_line("https://a", JobStatus::Progress(StatusTag::Warning)),
            None
        );
    }

    #[test]
    fn done_lines_report_totals_and_log_paths() {
        let paths = AppPaths::from_base("/base");
        let summary = BatchSummary {
            succeeded: 3,
            failed: 1,
            errored: 0,
            elapsed: std::time::Duration::from_millis(12_340),
        };

        let lines = done_lines(&summary, &paths.combined_log(), &paths.error_log());

        assert_eq!(lines[0], "[DONE] 3 ok, 1 failed, 0 errors. Elapsed: 12.3s");
        assert_eq!(
            lines[1],
            format!("Logs: {}", paths.combined_log().display())
        );
        assert_eq!(
            lines[2],
            format!("Errors: {}", paths.error_log().display())
        );
        assert!(lines[1].ends_with("yt-dlp.log"));
        assert!(lines[2].ends_with("yt-dlp-errors.log"));
    }

    #[test]
    fn batch_mode_defaults_to_playlists() {
        let paths = AppPaths::from_base("/base").with_output_dir("/base/downloads");
        let args = Args::parse_from(["audiograb", "--cli"]);

        let options = batch_options(&args, &paths);

        assert_eq!(options.playlist_mode, PlaylistMode::Playlist);
        assert_eq!(options.output_dir, std::path::PathBuf::from("/base/downloads"));
        assert_eq!(options.download_archive, None);
    }

    #[test]
    fn flags_shape_batch_options() {
        let paths = AppPaths::from_base("/base");
        let args = Args::parse_from([
            "audiograb", "--cli", "--single", "--format", "FLAC", "--out-dir", "/music", "--archive",
        ]);

        let options = batch_options(&args, &paths);

        assert_eq!(options.playlist_mode, PlaylistMode::Single);
        assert_eq!(options.audio_format, audiograb_core::AudioFormat::Flac);
        assert_eq!(options.output_dir, std::path::PathBuf::from("/music"));
        assert_eq!(
            options.download_archive,
            Some(std::path::PathBuf::from("/base/download-archive.txt"))
        );
    }

    #[test]
    fn single_and_playlist_conflict() {
        assert!(Args::try_parse_from(["audiograb", "--single", "--playlist"]).is_err());
    }
}
