use std::path::PathBuf;

use crate::coordinator::MAX_WORKERS;
use crate::{AppPaths, ToolSources};

/// Engine settings, fixed for the life of an `EngineHandle`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub paths: AppPaths,
    pub max_workers: usize,
    pub sources: ToolSources,
    /// Fetch missing tools before each batch.
    pub provision: bool,
    /// Ask an existing downloader to update itself before each batch.
    pub self_update: bool,
}

impl EngineConfig {
    pub fn for_base_dir(base: impl Into<PathBuf>) -> Self {
        Self {
            paths: AppPaths::from_base(base),
            max_workers: MAX_WORKERS,
            sources: ToolSources::default(),
            provision: true,
            self_update: true,
        }
    }
}
