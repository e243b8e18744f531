use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use grab_logging::grab_warn;

/// Shared destination for tool output. Each call writes one whole line.
pub trait LogSink: Send + Sync {
    /// Appends to the combined log.
    fn append(&self, line: &str) -> io::Result<()>;
    /// Appends to the error log.
    fn append_error(&self, line: &str) -> io::Result<()>;
}

/// Append-only files; the lock is held across write and flush so lines from
/// concurrent workers never interleave.
pub struct FileLogSink {
    combined: Mutex<File>,
    errors: Mutex<File>,
}

impl FileLogSink {
    pub fn open(combined: &Path, errors: &Path) -> io::Result<Self> {
        Ok(Self {
            combined: Mutex::new(open_append(combined)?),
            errors: Mutex::new(open_append(errors)?),
        })
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn write_line(file: &Mutex<File>, line: &str) -> io::Result<()> {
    let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()
}

impl LogSink for FileLogSink {
    fn append(&self, line: &str) -> io::Result<()> {
        write_line(&self.combined, line)
    }

    fn append_error(&self, line: &str) -> io::Result<()> {
        write_line(&self.errors, line).inspect_err(|err| {
            grab_warn!("error log write failed: {err}");
        })
    }
}

/// In-memory sink for hosts that do not keep files.
#[derive(Default)]
pub struct MemoryLogSink {
    combined: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.combined
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, line: &str) -> io::Result<()> {
        self.combined
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }

    fn append_error(&self, line: &str) -> io::Result<()> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_appends_keep_lines_whole() {
        let temp = tempfile::TempDir::new().unwrap();
        let combined = temp.path().join("logs/combined.log");
        let errors = temp.path().join("logs/errors.log");
        let sink = Arc::new(FileLogSink::open(&combined, &errors).unwrap());

        let writers: Vec<_> = (0..4)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for n in 0..200 {
                        sink.append(&format!("[{worker}] line {n} {}", "x".repeat(64)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let text = fs::read_to_string(&combined).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 800);
        for line in lines {
            assert!(line.starts_with('['), "torn line: {line}");
            assert!(line.ends_with(&"x".repeat(64)), "torn line: {line}");
        }
    }

    #[test]
    fn error_lines_go_to_their_own_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let combined = temp.path().join("combined.log");
        let errors = temp.path().join("errors.log");
        let sink = FileLogSink::open(&combined, &errors).unwrap();

        sink.append("normal").unwrap();
        sink.append_error("ERROR for u: boom").unwrap();

        assert_eq!(fs::read_to_string(&combined).unwrap(), "normal\n");
        assert_eq!(fs::read_to_string(&errors).unwrap(), "ERROR for u: boom\n");
    }
}
