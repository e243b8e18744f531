use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use grab_logging::{grab_debug, grab_info, grab_warn};
use reqwest::header::LAST_MODIFIED;
use tokio::io::AsyncWriteExt;

use crate::paths::executable_name;
use crate::{AppPaths, AtomicFileWriter, ProvisionError};

#[cfg(windows)]
pub const DOWNLOADER_RELEASE_URL: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp.exe";
#[cfg(target_os = "macos")]
pub const DOWNLOADER_RELEASE_URL: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp_macos";
#[cfg(not(any(windows, target_os = "macos")))]
pub const DOWNLOADER_RELEASE_URL: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp";

#[cfg(windows)]
pub const CONVERTER_ARCHIVE_URL: Option<&str> =
    Some("https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip");
#[cfg(not(windows))]
pub const CONVERTER_ARCHIVE_URL: Option<&str> = None;

const USER_AGENT: &str = concat!("audiograb/", env!("CARGO_PKG_VERSION"));

/// Where the tools are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSources {
    pub downloader_url: String,
    /// Zip archive holding the converter binary somewhere inside it.
    pub converter_archive_url: Option<String>,
}

impl Default for ToolSources {
    fn default() -> Self {
        Self {
            downloader_url: DOWNLOADER_RELEASE_URL.to_string(),
            converter_archive_url: CONVERTER_ARCHIVE_URL.map(str::to_string),
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Streams the body of `url` into `dest`, returning the byte count.
    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, ProvisionError>;
    /// `Last-Modified` of `url`, if the server reports one.
    async fn last_modified(&self, url: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ProvisionError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| ProvisionError::Network {
                url: String::new(),
                message: err.to_string(),
            })?;
        Ok(Self { client })
    }
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> ProvisionError {
    ProvisionError::Network {
        url: url.to_string(),
        message: err.to_string(),
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, ProvisionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(url, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(url, err))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        grab_debug!("downloaded {written} bytes from {url}");
        Ok(written)
    }

    async fn last_modified(&self, url: &str) -> Option<String> {
        let response = match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                grab_debug!("HEAD {url}: {}", response.status());
                return None;
            }
            Err(err) => {
                grab_debug!("HEAD {url}: {err}");
                return None;
            }
        };
        response
            .headers()
            .get(LAST_MODIFIED)?
            .to_str()
            .ok()
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    AlreadyPresent,
    Installed,
    Updated,
}

/// Makes sure the downloader and converter exist under `bin/`.
pub struct Provisioner {
    paths: AppPaths,
    sources: ToolSources,
    transport: Arc<dyn Transport>,
    self_update: bool,
}

impl Provisioner {
    pub fn new(paths: AppPaths, sources: ToolSources, transport: Arc<dyn Transport>) -> Self {
        Self {
            paths,
            sources,
            transport,
            self_update: true,
        }
    }

    /// Whether an existing downloader is asked to update itself.
    pub fn with_self_update(mut self, enabled: bool) -> Self {
        self.self_update = enabled;
        self
    }

    pub async fn ensure_downloader(&self) -> Result<ToolState, ProvisionError> {
        let target = self.paths.downloader_path();
        if target.is_file() {
            if self.self_update {
                run_self_update(target).await;
            }
            return Ok(ToolState::AlreadyPresent);
        }

        grab_info!("installing downloader from {}", self.sources.downloader_url);
        fs::create_dir_all(self.paths.bin_dir())?;
        let partial = target.with_extension("partial");
        let result = async {
            self.transport
                .download_to(&self.sources.downloader_url, &partial)
                .await?;
            make_executable(&partial)?;
            tokio::fs::rename(&partial, &target).await?;
            Ok::<_, ProvisionError>(ToolState::Installed)
        }
        .await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&partial).await;
        }
        result
    }

    /// Installs the converter when missing, or refreshes it when the source
    /// reports a different `Last-Modified` than the recorded stamp.
    pub async fn ensure_converter(&self) -> Result<ToolState, ProvisionError> {
        let target = self.paths.converter_path();
        let present = target.is_file();
        let Some(url) = self.sources.converter_archive_url.as_deref() else {
            return if present {
                Ok(ToolState::AlreadyPresent)
            } else {
                Err(ProvisionError::NoSource { tool: "ffmpeg" })
            };
        };

        let remote = self.transport.last_modified(url).await;
        let recorded = read_stamp(&self.paths.converter_stamp());
        let stale = remote.is_some() && remote != recorded;
        if present && !stale {
            return Ok(ToolState::AlreadyPresent);
        }

        grab_info!("fetching converter archive from {url}");
        fs::create_dir_all(self.paths.bin_dir())?;
        let archive = self.paths.bin_dir().join("ffmpeg.zip");
        let result = async {
            self.transport.download_to(url, &archive).await?;
            let binary = executable_name("ffmpeg");
            let (zip_path, dest) = (archive.clone(), target.clone());
            tokio::task::spawn_blocking(move || extract_binary(&zip_path, &binary, &dest))
                .await
                .map_err(|err| io::Error::other(err.to_string()))??;
            if let Some(stamp) = &remote {
                AtomicFileWriter::new(self.paths.bin_dir()).write("ffmpeg.version", stamp)?;
            }
            Ok::<_, ProvisionError>(if present {
                ToolState::Updated
            } else {
                ToolState::Installed
            })
        }
        .await;
        if let Err(err) = tokio::fs::remove_file(&archive).await {
            grab_debug!("remove {}: {err}", archive.display());
        }
        result
    }
}

fn read_stamp(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

async fn run_self_update(target: PathBuf) {
    let outcome = tokio::task::spawn_blocking(move || {
        Command::new(&target)
            .arg("-U")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
    })
    .await;
    match outcome {
        Ok(Ok(status)) => grab_debug!("downloader self-update exited with {status}"),
        Ok(Err(err)) => grab_warn!("downloader self-update failed: {err}"),
        Err(err) => grab_warn!("downloader self-update task failed: {err}"),
    }
}

/// Finds the first file entry named `binary` at any depth and writes it to `dest`.
fn extract_binary(archive: &Path, binary: &str, dest: &Path) -> Result<(), ProvisionError> {
    let mut archive = zip::ZipArchive::new(File::open(archive)?)?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() {
            continue;
        }
        let matches = Path::new(entry.name()).file_name() == Some(OsStr::new(binary));
        if !matches {
            continue;
        }
        let partial = dest.with_extension("partial");
        let mut out = File::create(&partial)?;
        io::copy(&mut entry, &mut out)?;
        drop(out);
        make_executable(&partial)?;
        fs::rename(&partial, dest)?;
        return Ok(());
    }
    Err(ProvisionError::MissingInArchive {
        binary: binary.to_string(),
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
