//! Ares Core
//!
//! Shared plumbing for the Ares engine crates: logging setup, engine
//! configuration, hash collections, profiling hooks and the background
//! task pool used for asynchronous asset loading.

pub mod alloc;
pub mod config;
pub mod logging;
pub mod profiling;
pub mod task_pool;

pub use config::{EngineConfig, ProfilingMode};
pub use task_pool::TaskPool;
