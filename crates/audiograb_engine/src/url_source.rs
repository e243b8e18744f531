use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use audiograb_core::parse_urls;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UrlSourceError {
    #[error("{0} not found")]
    Missing(PathBuf),
    #[error("no URLs found in {0}")]
    Empty(PathBuf),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads a newline-delimited URL list. An absent file or one with no usable
/// lines is an error.
pub fn load_url_file(path: &Path) -> Result<Vec<String>, UrlSourceError> {
    let raw = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            UrlSourceError::Missing(path.to_path_buf())
        } else {
            UrlSourceError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let urls = parse_urls(&String::from_utf8_lossy(&raw));
    if urls.is_empty() {
        return Err(UrlSourceError::Empty(path.to_path_buf()));
    }
    Ok(urls)
}
