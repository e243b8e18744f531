use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use audiograb_engine::{AppPaths, ProvisionError, Provisioner, ToolSources, ToolState, Transport};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const ZIP_URL: &str = "https://tools.test/ffmpeg.zip";
const DOWNLOADER_URL: &str = "https://tools.test/yt-dlp";

/// Serves fixed bodies and counts requests.
struct FakeTransport {
    bodies: Mutex<Vec<(String, Vec<u8>)>>,
    last_modified: Option<String>,
    downloads: AtomicUsize,
    heads: AtomicUsize,
}

impl FakeTransport {
    fn new(last_modified: Option<&str>) -> Self {
        Self {
            bodies: Mutex::new(Vec::new()),
            last_modified: last_modified.map(str::to_string),
            downloads: AtomicUsize::new(0),
            heads: AtomicUsize::new(0),
        }
    }

    fn serve(self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.lock().unwrap().push((url.to_string(), body));
        self
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, ProvisionError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let body = self
            .bodies
            .lock()
            .unwrap()
            .iter()
            .find(|(known, _)| known == url)
            .map(|(_, body)| body.clone());
        match body {
            Some(body) => {
                fs::write(dest, &body)?;
                Ok(body.len() as u64)
            }
            None => Err(ProvisionError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn last_modified(&self, _url: &str) -> Option<String> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        self.last_modified.clone()
    }
}

fn zip_with(entry: &str, content: &[u8]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        writer.add_directory("ffmpeg-7.0-essentials/bin/", zip::write::FileOptions::default()).unwrap();
        writer
            .start_file(entry, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

fn sources() -> ToolSources {
    ToolSources {
        downloader_url: DOWNLOADER_URL.to_string(),
        converter_archive_url: Some(ZIP_URL.to_string()),
    }
}

fn converter_entry() -> String {
    let name = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
    format!("ffmpeg-7.0-essentials/bin/{name}")
}

fn provisioner(temp: &TempDir, transport: Arc<FakeTransport>) -> Provisioner {
    Provisioner::new(AppPaths::from_base(temp.path()), sources(), transport).with_self_update(false)
}

#[tokio::test]
async fn installs_missing_downloader() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(FakeTransport::new(None).serve(DOWNLOADER_URL, b"#!bin".to_vec()));
    let provisioner = provisioner(&temp, transport.clone());

    let state = provisioner.ensure_downloader().await.unwrap();

    assert_eq!(state, ToolState::Installed);
    let target = AppPaths::from_base(temp.path()).downloader_path();
    assert_eq!(fs::read(&target).unwrap(), b"#!bin");
    assert!(!target.with_extension("partial").exists());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

#[tokio::test]
async fn present_tools_are_left_alone() {
    let temp = TempDir::new().unwrap();
    let paths = AppPaths::from_base(temp.path());
    fs::create_dir_all(paths.bin_dir()).unwrap();
    fs::write(paths.downloader_path(), b"old").unwrap();
    fs::write(paths.converter_path(), b"old").unwrap();
    fs::write(paths.converter_stamp(), "Mon, 01 Jan 2024 00:00:00 GMT\n").unwrap();
    let transport = Arc::new(FakeTransport::new(Some("Mon, 01 Jan 2024 00:00:00 GMT")));
    let provisioner = provisioner(&temp, transport.clone());

    assert_eq!(provisioner.ensure_downloader().await.unwrap(), ToolState::AlreadyPresent);
    assert_eq!(provisioner.ensure_converter().await.unwrap(), ToolState::AlreadyPresent);
    assert_eq!(provisioner.ensure_converter().await.unwrap(), ToolState::AlreadyPresent);

    assert_eq!(transport.downloads.load(Ordering::SeqCst), 0);
    assert_eq!(fs::read(paths.converter_path()).unwrap(), b"old");
}

#[tokio::test]
async fn changed_stamp_refreshes_converter() {
    let temp = TempDir::new().unwrap();
    let paths = AppPaths::from_base(temp.path());
    fs::create_dir_all(paths.bin_dir()).unwrap();
    fs::write(paths.converter_path(), b"old").unwrap();
    fs::write(paths.converter_stamp(), "stamp-1").unwrap();
    let transport = Arc::new(
        FakeTransport::new(Some("stamp-2")).serve(ZIP_URL, zip_with(&converter_entry(), b"new")),
    );
    let provisioner = provisioner(&temp, transport.clone());

    let state = provisioner.ensure_converter().await.unwrap();

    assert_eq!(state, ToolState::Updated);
    assert_eq!(fs::read(paths.converter_path()).unwrap(), b"new");
    assert_eq!(fs::read_to_string(paths.converter_stamp()).unwrap(), "stamp-2");
    assert!(!paths.bin_dir().join("ffmpeg.zip").exists());

    assert_eq!(provisioner.ensure_converter().await.unwrap(), ToolState::AlreadyPresent);
    assert_eq!(transport.downloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_converter_installs_without_remote_stamp() {
    let temp = TempDir::new().unwrap();
    let transport =
        Arc::new(FakeTransport::new(None).serve(ZIP_URL, zip_with(&converter_entry(), b"bin")));
    let provisioner = provisioner(&temp, transport.clone());

    let state = provisioner.ensure_converter().await.unwrap();

    let paths = AppPaths::from_base(temp.path());
    assert_eq!(state, ToolState::Installed);
    assert_eq!(fs::read(paths.converter_path()).unwrap(), b"bin");
    assert!(!paths.converter_stamp().exists());
}

#[tokio::test]
async fn archive_without_binary_is_an_error() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(
        FakeTransport::new(Some("stamp")).serve(ZIP_URL, zip_with("docs/README.txt", b"read me")),
    );
    let provisioner = provisioner(&temp, transport);

    let err = provisioner.ensure_converter().await.unwrap_err();

    assert!(matches!(err, ProvisionError::MissingInArchive { .. }), "{err}");
    let paths = AppPaths::from_base(temp.path());
    assert!(!paths.converter_path().exists());
    assert!(!paths.converter_stamp().exists());
    assert!(!paths.bin_dir().join("ffmpeg.zip").exists());
}

#[tokio::test]
async fn no_source_and_no_binary_reports_no_source() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(FakeTransport::new(None));
    let provisioner = Provisioner::new(
        AppPaths::from_base(temp.path()),
        ToolSources {
            downloader_url: DOWNLOADER_URL.to_string(),
            converter_archive_url: None,
        },
        transport.clone(),
    );

    let err = provisioner.ensure_converter().await.unwrap_err();

    assert!(matches!(err, ProvisionError::NoSource { tool: "ffmpeg" }));
    assert_eq!(transport.heads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_download_leaves_no_partial_file() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(FakeTransport::new(None));
    let provisioner = provisioner(&temp, transport);

    let err = provisioner.ensure_downloader().await.unwrap_err();

    assert!(matches!(err, ProvisionError::HttpStatus { status: 404, .. }));
    let target = AppPaths::from_base(temp.path()).downloader_path();
    assert!(!target.exists());
    assert!(!target.with_extension("partial").exists());
}
