use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use audiograb_core::ToolLocations;
use grab_logging::{grab_info, grab_warn};

const DOWNLOADER_NAME: &str = "yt-dlp";
const CONVERTER_NAME: &str = "ffmpeg";

/// Well-known locations under one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    base: PathBuf,
    default_output_dir: PathBuf,
}

impl AppPaths {
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let default_output_dir = platform_downloads_dir().unwrap_or_else(|| base.join("downloads"));
        Self {
            base,
            default_output_dir,
        }
    }

    /// Same layout, but with an explicit default output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_output_dir = dir.into();
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.base.join("bin")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }

    pub fn default_output_dir(&self) -> &Path {
        &self.default_output_dir
    }

    /// URL source read by batch mode.
    pub fn urls_file(&self) -> PathBuf {
        self.base.join("urls.txt")
    }

    pub fn combined_log(&self) -> PathBuf {
        self.logs_dir().join("yt-dlp.log")
    }

    pub fn error_log(&self) -> PathBuf {
        self.logs_dir().join("yt-dlp-errors.log")
    }

    /// Diagnostic log of the application itself.
    pub fn diagnostic_log(&self) -> PathBuf {
        self.logs_dir().join("audiograb.log")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base.join("settings.ron")
    }

    pub fn download_archive(&self) -> PathBuf {
        self.base.join("download-archive.txt")
    }

    pub fn downloader_path(&self) -> PathBuf {
        self.bin_dir().join(executable_name(DOWNLOADER_NAME))
    }

    pub fn converter_path(&self) -> PathBuf {
        self.bin_dir().join(executable_name(CONVERTER_NAME))
    }

    pub fn converter_stamp(&self) -> PathBuf {
        self.bin_dir().join("ffmpeg.version")
    }

    /// Tool locations for a batch, searching `PATH` for the converter when `bin/` has none.
    pub fn tool_locations(&self) -> ToolLocations {
        self.tool_locations_with(|name| which::which(name).ok())
    }

    /// Same as [`Self::tool_locations`] with a caller-supplied executable lookup.
    pub fn tool_locations_with(&self, lookup: impl Fn(&str) -> Option<PathBuf>) -> ToolLocations {
        ToolLocations {
            downloader: self.downloader_path(),
            converter_dir: self.converter_dir_with(lookup),
        }
    }

    fn converter_dir_with(&self, lookup: impl Fn(&str) -> Option<PathBuf>) -> Option<PathBuf> {
        if self.converter_path().is_file() {
            return Some(self.bin_dir());
        }
        match lookup(CONVERTER_NAME).and_then(|found| found.parent().map(Path::to_path_buf)) {
            Some(dir) => {
                grab_info!("using {CONVERTER_NAME} from {}", dir.display());
                Some(dir)
            }
            None => {
                grab_warn!("{CONVERTER_NAME} not found in {} or on PATH", self.bin_dir().display());
                None
            }
        }
    }

    /// Creates every directory and touches both tool-output logs.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [self.bin_dir(), self.logs_dir(), self.default_output_dir.clone()] {
            fs::create_dir_all(&dir)?;
        }
        for log in [self.combined_log(), self.error_log()] {
            OpenOptions::new().create(true).append(true).open(log)?;
        }
        Ok(())
    }
}

pub(crate) fn executable_name(stem: &str) -> String {
    if cfg!(windows) {
        format!("{stem}.exe")
    } else {
        stem.to_string()
    }
}

fn platform_downloads_dir() -> Option<PathBuf> {
    if !cfg!(windows) {
        return None;
    }
    std::env::var_os("USERPROFILE").map(|profile| PathBuf::from(profile).join("Downloads"))
}
