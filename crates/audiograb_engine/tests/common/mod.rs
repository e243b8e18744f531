#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use audiograb_core::CommandLine;
use audiograb_engine::{EngineEvent, EventSink, OutputLines, Spawner, WorkerProcess};

/// What a fake worker does for one URL.
#[derive(Clone)]
pub enum Script {
    Run {
        lines: Vec<&'static str>,
        code: Option<i32>,
        hold: Duration,
    },
    SpawnFails,
    ReadFails,
    Panics,
}

impl Script {
    pub fn ok(lines: Vec<&'static str>) -> Self {
        Script::Run {
            lines,
            code: Some(0),
            hold: Duration::ZERO,
        }
    }

    pub fn exit(code: i32) -> Self {
        Script::Run {
            lines: vec!["ERROR: unavailable"],
            code: Some(code),
            hold: Duration::ZERO,
        }
    }
}

#[derive(Default)]
pub struct Counters {
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
    pub spawned: AtomicUsize,
    pub killed: AtomicUsize,
}

/// Spawner that plays back a script keyed by the URL (the last argument).
pub struct ScriptedSpawner {
    scripts: HashMap<String, Script>,
    fallback: Script,
    pub counters: Arc<Counters>,
    pub commands: Mutex<Vec<CommandLine>>,
}

impl ScriptedSpawner {
    pub fn new(fallback: Script) -> Self {
        Self {
            scripts: HashMap::new(),
            fallback,
            counters: Arc::new(Counters::default()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }
}

impl Spawner for ScriptedSpawner {
    fn spawn(&self, command: &CommandLine) -> io::Result<Box<dyn WorkerProcess>> {
        self.commands.lock().unwrap().push(command.clone());
        let url = command
            .last_arg()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default();
        let script = self.scripts.get(&url).unwrap_or(&self.fallback).clone();

        let (lines, code, hold, read_fails) = match script {
            Script::SpawnFails => {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"))
            }
            Script::Panics => panic!("spawner blew up for {url}"),
            Script::ReadFails => (Vec::new(), Some(0), Duration::ZERO, true),
            Script::Run { lines, code, hold } => (lines, code, hold, false),
        };

        self.counters.spawned.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(FakeProcess {
            lines: Some(lines.into_iter().map(str::to_string).collect()),
            read_fails,
            code,
            hold,
            counters: Arc::clone(&self.counters),
            finished: false,
        }))
    }
}

struct FakeProcess {
    lines: Option<Vec<String>>,
    read_fails: bool,
    code: Option<i32>,
    hold: Duration,
    counters: Arc<Counters>,
    finished: bool,
}

impl FakeProcess {
    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.counters.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl WorkerProcess for FakeProcess {
    fn lines(&mut self) -> OutputLines<'_> {
        let lines = self.lines.take().unwrap_or_default();
        let mut items: Vec<io::Result<String>> = lines.into_iter().map(Ok).collect();
        if self.read_fails {
            items.push(Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")));
        }
        Box::new(items.into_iter())
    }

    fn wait(&mut self) -> io::Result<Option<i32>> {
        thread::sleep(self.hold);
        self.finish();
        Ok(self.code)
    }

    fn kill(&mut self) {
        self.counters.killed.fetch_add(1, Ordering::SeqCst);
        self.finish();
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
