use std::ffi::OsString;
use std::path::PathBuf;

use crate::{BatchOptions, PlaylistMode};

/// Fragment parallelism inside one download process (`-N`).
pub const PARALLEL_FRAGMENTS: u32 = 16;
/// Value for `--concurrent-fragments`.
pub const CONCURRENT_FRAGMENTS: u32 = 16;
/// Best variable bitrate.
pub const AUDIO_QUALITY: &str = "0";
/// Output file template relative to the output directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
pub const SINGLE_ITEM_FLAG: &str = "--no-playlist";
/// JavaScript runtime the downloader uses for sites that need script evaluation.
pub const JS_RUNTIME: &str = "node";

/// Where the external tools live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocations {
    pub downloader: PathBuf,
    /// Directory holding the converter; handed to the downloader, never run directly.
    /// `None` leaves the downloader to find the converter on its own.
    pub converter_dir: Option<PathBuf>,
}

/// A program plus its arguments, ready to be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn last_arg(&self) -> Option<&OsString> {
        self.args.last()
    }
}

/// Builds the download tool invocation for one URL. The URL is always the
/// final argument.
pub fn build_command(url: &str, options: &BatchOptions, tools: &ToolLocations) -> CommandLine {
    let mut args: Vec<OsString> = vec![
        "-f".into(),
        "bestaudio/best".into(),
        "--js-runtimes".into(),
        JS_RUNTIME.into(),
        "--extract-audio".into(),
        "--audio-format".into(),
        options.audio_format.as_str().into(),
        "--audio-quality".into(),
        AUDIO_QUALITY.into(),
        "-o".into(),
        options.output_dir.join(OUTPUT_TEMPLATE).into_os_string(),
        "-N".into(),
        PARALLEL_FRAGMENTS.to_string().into(),
        "--concurrent-fragments".into(),
        CONCURRENT_FRAGMENTS.to_string().into(),
    ];
    if let Some(dir) = &tools.converter_dir {
        args.push("--ffmpeg-location".into());
        args.push(dir.clone().into_os_string());
    }
    args.extend([
        "--add-metadata".into(),
        "--embed-metadata".into(),
        "--embed-thumbnail".into(),
        "--progress".into(),
        "--newline".into(),
        "--ignore-errors".into(),
        "--no-mtime".into(),
        "--restrict-filenames".into(),
    ]);

    if let Some(archive) = &options.download_archive {
        args.push("--download-archive".into());
        args.push(archive.clone().into_os_string());
    }
    if options.playlist_mode == PlaylistMode::Single {
        args.push(SINGLE_ITEM_FLAG.into());
    }
    args.push(url.into());

    CommandLine {
        program: tools.downloader.clone().into_os_string(),
        args,
    }
}
