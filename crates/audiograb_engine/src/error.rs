use std::io;

use thiserror::Error;

use crate::PersistError;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("{binary} not found inside the downloaded archive")]
    MissingInArchive { binary: String },
    #[error("no download source for {tool} on this platform")]
    NoSource { tool: &'static str },
    #[error("could not record version stamp: {0}")]
    Stamp(#[from] PersistError),
}

/// Why a worker ended without a real exit code.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start: {0}")]
    Spawn(#[source] io::Error),
    #[error("failed to read output: {0}")]
    Read(#[source] io::Error),
    #[error("failed to wait for exit: {0}")]
    Wait(#[source] io::Error),
    #[error("failed to write log: {0}")]
    Log(#[source] io::Error),
}
