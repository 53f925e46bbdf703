//! Asset manager configuration.

use std::path::PathBuf;

use ares_core::EngineConfig;

#[derive(Debug, Clone)]
pub struct AssetManagerConfig {
    /// Directory that relative disk sources are resolved against.
    pub asset_root: PathBuf,
    /// Threads for the manager's own task pool. Ignored when a pool is
    /// supplied to [`AssetManager::new`](crate::AssetManager::new).
    pub worker_threads: Option<usize>,
}

impl Default for AssetManagerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            worker_threads: None,
        }
    }
}

impl AssetManagerConfig {
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads.max(1));
        self
    }
}

impl From<&EngineConfig> for AssetManagerConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            asset_root: config.asset_root.clone(),
            worker_threads: config.worker_threads,
        }
    }
}
