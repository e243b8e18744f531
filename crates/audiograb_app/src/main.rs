mod cli;
mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use audiograb_core::AudioFormat;
use audiograb_engine::AppPaths;
use clap::Parser;
use grab_logging::{grab_error, LogDestination};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "audiograb", version, about = "Batch audio downloader built on yt-dlp and ffmpeg")]
pub struct Args {
    /// Run headless over urls.txt instead of opening the window
    #[arg(long)]
    cli: bool,

    /// Fetch only the linked item, never the whole playlist
    #[arg(long, conflicts_with = "playlist")]
    single: bool,

    /// Fetch every item of a playlist link (batch mode default)
    #[arg(long)]
    playlist: bool,

    /// Target audio format
    #[arg(long, default_value_t = AudioFormat::Mp3)]
    format: AudioFormat,

    /// Output directory for batch mode
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Skip items recorded in the download archive
    #[arg(long)]
    archive: bool,

    /// Base directory holding bin/, logs/ and urls.txt
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Diagnostic log level
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let base = match args.base_dir.clone() {
        Some(dir) => dir,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(err) => {
                eprintln!("[ERROR] cannot determine working directory: {err}");
                return ExitCode::FAILURE;
            }
        },
    };
    let paths = AppPaths::from_base(base);

    let destination = if args.cli {
        LogDestination::File
    } else {
        LogDestination::Both
    };
    grab_logging::initialize(destination, args.log_level, &paths.diagnostic_log());

    let outcome = if args.cli {
        cli::run(&args, &paths)
    } else {
        platform::run_app(paths).map(|()| ExitCode::SUCCESS)
    };
    outcome.unwrap_or_else(|err| {
        grab_error!("fatal: {err:#}");
        eprintln!("[ERROR] {err:#}");
        ExitCode::FAILURE
    })
}
