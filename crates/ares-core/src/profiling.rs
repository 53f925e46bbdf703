//! Profiling utilities based on the `puffin` crate.

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

pub use puffin::{profile_function, profile_scope};

use crate::config::ProfilingMode;

/// Global profiling server instance.
#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Enable profiling according to `mode`.
///
/// # Example
/// ```no_run
/// use ares_core::config::ProfilingMode;
/// use ares_core::profiling::init_profiling;
///
/// init_profiling(ProfilingMode::On);
/// ```
pub fn init_profiling(mode: ProfilingMode) {
    match mode {
        ProfilingMode::Off => puffin::set_scopes_on(false),
        ProfilingMode::On => puffin::set_scopes_on(true),
        ProfilingMode::WithWebserver => {
            puffin::set_scopes_on(true);
            start_server();
        }
    }
}

#[cfg(feature = "profiling")]
fn start_server() {
    if PROFILING_SERVER.get().is_some() {
        return;
    }

    match puffin_http::Server::new("0.0.0.0:8585") {
        Ok(server) => {
            tracing::info!("Puffin profiler server started on http://0.0.0.0:8585");
            let _ = PROFILING_SERVER.set(server);
        }
        Err(e) => {
            tracing::error!("Failed to start puffin server: {}", e);
        }
    }
}

#[cfg(not(feature = "profiling"))]
fn start_server() {
    tracing::warn!("profiling web server requested but the `profiling` feature is disabled");
}

/// Mark the start of a new frame for profiling.
///
/// Call this once per frame in your main loop to organize profiling data by frame.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
