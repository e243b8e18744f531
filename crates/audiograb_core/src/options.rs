use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Target audio container handed to the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioFormat {
    #[default]
    Mp3,
    Aac,
    Flac,
    Webm,
    Mp4,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Mp3,
        AudioFormat::Aac,
        AudioFormat::Flac,
        AudioFormat::Webm,
        AudioFormat::Mp4,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Webm => "webm",
            AudioFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AudioFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseOptionError::AudioFormat(s.to_string()))
    }
}

/// Whether a playlist URL is expanded into all of its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaylistMode {
    #[default]
    Single,
    Playlist,
}

impl PlaylistMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaylistMode::Single => "single",
            PlaylistMode::Playlist => "playlist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaylistMode::Single => "Single file",
            PlaylistMode::Playlist => "Playlist (all items)",
        }
    }
}

impl fmt::Display for PlaylistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaylistMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(PlaylistMode::Single),
            "playlist" => Ok(PlaylistMode::Playlist),
            _ => Err(ParseOptionError::PlaylistMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseOptionError {
    #[error("unsupported audio format: {0:?}")]
    AudioFormat(String),
    #[error("unknown playlist mode: {0:?}")]
    PlaylistMode(String),
}

/// Options shared by every job of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub audio_format: AudioFormat,
    pub playlist_mode: PlaylistMode,
    /// Ledger of already fetched item ids, passed through to the download tool.
    pub download_archive: Option<PathBuf>,
}

impl BatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            audio_format: AudioFormat::default(),
            playlist_mode: PlaylistMode::default(),
            download_archive: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_format_parses_case_insensitively() {
        assert_eq!("FLAC".parse::<AudioFormat>(), Ok(AudioFormat::Flac));
        assert_eq!(" mp3 ".parse::<AudioFormat>(), Ok(AudioFormat::Mp3));
    }

    #[test]
    fn unknown_audio_format_is_rejected() {
        assert_eq!(
            "ogg".parse::<AudioFormat>(),
            Err(ParseOptionError::AudioFormat("ogg".to_string()))
        );
    }

    #[test]
    fn playlist_mode_round_trips_through_display() {
        for mode in [PlaylistMode::Single, PlaylistMode::Playlist] {
            assert_eq!(mode.to_string().parse::<PlaylistMode>(), Ok(mode));
        }
        assert!("all".parse::<PlaylistMode>().is_err());
    }
}
