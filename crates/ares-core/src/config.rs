//! Engine-wide configuration.

use std::path::PathBuf;

/// Default `tracing` filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,ares_events=debug,ares_assets=debug";

/// Configuration for the Ares engine.
///
/// All fields have sensible defaults; use the builder-style setters to
/// override individual values.
///
/// ```
/// use ares_core::config::{EngineConfig, ProfilingMode};
///
/// let config = EngineConfig::default()
///     .with_asset_root("assets")
///     .with_worker_threads(2)
///     .with_profiling(ProfilingMode::On);
///
/// assert_eq!(config.resolved_worker_threads(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Filter directive passed to the log subscriber when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Number of background threads used for asset loading.
    /// `None` picks `max(1, num_cpus - 1)`.
    pub worker_threads: Option<usize>,
    /// Base directory that relative disk asset paths are resolved against.
    pub asset_root: PathBuf,
    /// Profiling mode.
    pub profiling: ProfilingMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            worker_threads: None,
            asset_root: PathBuf::from("."),
            profiling: ProfilingMode::Off,
        }
    }
}

impl EngineConfig {
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads.max(1));
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_profiling(mut self, mode: ProfilingMode) -> Self {
        self.profiling = mode;
        self
    }

    /// The number of worker threads to spawn, after applying the default policy.
    pub fn resolved_worker_threads(&self) -> usize {
        self.worker_threads
            .unwrap_or_else(|| num_cpus::get().saturating_sub(1))
            .max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfilingMode {
    /// Profiling scopes are disabled
    #[default]
    Off,
    /// Profiling scopes are recorded in-process
    On,
    /// Profiling scopes are recorded and served to `puffin_viewer`
    /// (requires the `profiling` feature)
    WithWebserver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.profiling, ProfilingMode::Off);
        assert!(config.resolved_worker_threads() >= 1);
    }

    #[test]
    fn test_zero_threads_is_clamped() {
        let config = EngineConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, Some(1));
        assert_eq!(config.resolved_worker_threads(), 1);
    }
}
