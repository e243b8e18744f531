use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use audiograb_core::CommandLine;
use grab_logging::{grab_debug, grab_warn};

const WAIT_POLL: Duration = Duration::from_millis(50);

/// Merged stdout/stderr lines of a worker, in the order the process wrote them.
pub type OutputLines<'a> = Box<dyn Iterator<Item = io::Result<String>> + 'a>;

/// A started worker process.
pub trait WorkerProcess: Send {
    /// Yields output lines until both streams close. A second call yields nothing.
    fn lines(&mut self) -> OutputLines<'_>;
    /// Blocks until exit. `None` when the process ended without an exit code.
    fn wait(&mut self) -> io::Result<Option<i32>>;
    /// Best-effort termination.
    fn kill(&mut self);
}

pub trait Spawner: Send + Sync {
    fn spawn(&self, command: &CommandLine) -> io::Result<Box<dyn WorkerProcess>> {
        // Both streams share one pipe so lines arrive in the order they were written.
        let (reader, writer) = io::pipe()?;
        let child = {
            let mut cmd = Command::new(&command.program);
            cmd.args(&command.args)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            hide_console_window(&mut cmd);
            cmd.spawn()?
        };

        let (tx, rx) = mpsc::channel();
        let pump = spawn_pump(reader, tx);

        let pid = child.id();
        let child = Arc::new(Mutex::new(child));
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pid, Arc::clone(&child));
        grab_debug!("spawned pid {pid}");

        Ok(Box::new(SystemProcess {
            pid,
            child,
            lines: Some(rx),
            pump: Some(pump),
            registry: Arc::clone(&self.live),
        }))
    }
}

struct SystemProcess {
    pid: u32,
    child: Arc<Mutex<Child>>,
    lines: Option<mpsc::Receiver<io::Result<String>>>,
    pump: Option<JoinHandle<()>>,
    registry: LiveChildren,
}

impl SystemProcess {
    fn unregister(&self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.pid);
    }
}

impl WorkerProcess for SystemProcess {
    fn lines(&mut self) -> OutputLines<'_> {
        Box::new(self.lines.take().into_iter().flat_map(|rx| rx.into_iter()))
    }

    fn wait(&mut self) -> io::Result<Option<i32>> {
        let status = loop {
            let polled = self
                .child
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .try_wait()?;
            match polled {
                Some(status) => break status,
                None => thread::sleep(WAIT_POLL),
            }
        };
        if let Some(pump) = self.pump.take() {
            if pump.join().is_err() {
                grab_warn!("output reader for pid {} panicked", self.pid);
            }
        }
        self.unregister();
        Ok(status.code())
    }

    fn kill(&mut self) {
        {
            let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(child.try_wait(), Ok(None)) {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
        self.unregister();
    }
}

impl Drop for SystemProcess {
    fn drop(&mut self) {
        self.unregister();
    }
}

/// Reads the merged stream to the end, decoding each line lossily.
fn spawn_pump<R>(reader: R, tx: mpsc::Sender<io::Result<String>>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    while matches!(buf.last(), Some(b'\n' | b'\r')) {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }
    })
}

#[cfg(windows)]
fn hide_console_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console_window(_cmd: &mut Command) {}
