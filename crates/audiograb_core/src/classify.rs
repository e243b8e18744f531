use std::fmt;

/// Coarse progress tag derived from one line of download tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTag {
    Downloading,
    Converting,
    Tagging,
    Cleanup,
    Warning,
    Error,
}

impl StatusTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusTag::Downloading => "downloading",
            StatusTag::Converting => "converting",
            StatusTag::Tagging => "tagging",
            StatusTag::Cleanup => "cleanup",
            StatusTag::Warning => "warning",
            StatusTag::Error => "error",
        }
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Evaluated top to bottom. Content-specific rules come before the generic
// warning/error checks, which come before the download catch-all.
const RULES: &[(StatusTag, &[&str])] = &[
    (
        StatusTag::Converting,
        &["extracting audio", "post-process", "ffmpeg"],
    ),
    (StatusTag::Tagging, &["adding metadata", "embedding"]),
    (StatusTag::Cleanup, &["deleting original"]),
    (StatusTag::Warning, &["warning"]),
    (StatusTag::Error, &["error"]),
    (StatusTag::Downloading, &["[download]", "%", "destination"]),
];

/// Classifies a newline-stripped output line, or `None` when nothing matches.
pub fn classify_line(line: &str) -> Option<StatusTag> {
    let lowered = line.to_lowercase();
    RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(tag, _)| *tag)
}
