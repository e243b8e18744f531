use std::fs;
use std::io;
use std::path::Path;

use audiograb_core::{AudioFormat, FormState, PlaylistMode};
use audiograb_engine::{AppPaths, AtomicFileWriter};
use grab_logging::{grab_error, grab_info, grab_warn};
use serde::{Deserialize, Serialize};

/// Window preferences kept between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    output_dir: Option<String>,
    audio_format: String,
    playlist_mode: String,
    use_archive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: None,
            audio_format: AudioFormat::default().as_str().to_string(),
            playlist_mode: PlaylistMode::default().as_str().to_string(),
            use_archive: false,
        }
    }
}

impl Settings {
    pub(crate) fn from_form(form: &FormState) -> Self {
        Self {
            output_dir: Some(form.output_dir.clone()).filter(|dir| !dir.trim().is_empty()),
            audio_format: form.audio_format.as_str().to_string(),
            playlist_mode: form.playlist_mode.as_str().to_string(),
            use_archive: form.use_archive,
        }
    }

    /// Initial form; unknown stored values fall back to defaults.
    pub(crate) fn into_form(self, paths: &AppPaths) -> FormState {
        FormState {
            urls_text: String::new(),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| paths.default_output_dir().display().to_string()),
            audio_format: self.audio_format.parse().unwrap_or_default(),
            playlist_mode: self.playlist_mode.parse().unwrap_or_default(),
            archive_path: Some(paths.download_archive()),
            use_archive: self.use_archive,
        }
    }
}

pub(crate) fn load(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Settings::default(),
        Err(err) => {
            grab_warn!("Failed to read settings from {:?}: {}", path, err);
            return Settings::default();
        }
    };
    match ron::from_str(&content) {
        Ok(settings) => {
            grab_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            grab_warn!("Failed to parse settings from {:?}: {}", path, err);
            Settings::default()
        }
    }
}

pub(crate) fn save(path: &Path, settings: &Settings) {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        grab_error!("Settings path {:?} has no parent directory", path);
        return;
    };
    let content = match ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::new()) {
        Ok(text) => text,
        Err(err) => {
            grab_error!("Failed to serialize settings: {}", err);
            return;
        }
    };
    if let Err(err) = AtomicFileWriter::new(dir).write(&name.to_string_lossy(), content) {
        grab_error!("Failed to write settings to {:?}: {}", path, err);
    }
}
