//! Asset loaders with scripted behavior.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ares_assets::{Asset, AssetLoader, AssetResult, LoadContext};
use parking_lot::{Condvar, Mutex};

/// What [`ScriptedLoader`] produces: the source bytes plus which attempt
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedAsset {
    pub bytes: Vec<u8>,
    pub attempt: usize,
}

impl Asset for ScriptedAsset {
    fn type_name() -> &'static str {
        "ScriptedAsset"
    }
}

/// A latch that holds loads back until the test opens it.
#[derive(Clone, Default)]
pub struct Gate {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (open, cond) = &*self.state;
        *open.lock() = true;
        cond.notify_all();
    }

    pub fn is_open(&self) -> bool {
        *self.state.0.lock()
    }

    fn wait(&self) {
        let (open, cond) = &*self.state;
        let mut open = open.lock();
        while !*open {
            cond.wait(&mut open);
        }
    }
}

/// Loads `.scripted` sources into [`ScriptedAsset`].
///
/// Clones share their counters, so keep one clone after registering another.
#[derive(Clone)]
pub struct ScriptedLoader {
    failures_left: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
    delay: Option<Duration>,
    gate: Option<Gate>,
}

impl ScriptedLoader {
    pub const EXTENSION: &'static str = "scripted";

    pub fn new() -> Self {
        Self {
            failures_left: Arc::new(AtomicUsize::new(0)),
            attempts: Arc::new(AtomicUsize::new(0)),
            delay: None,
            gate: None,
        }
    }

    /// Fail the first `count` loads.
    pub fn failing_first(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block every load until `gate` is opened.
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of loads started so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for ScriptedLoader {
    type Asset = ScriptedAsset;

    fn extensions(&self) -> &[&str] {
        &[Self::EXTENSION]
    }

    fn load(&self, ctx: LoadContext<'_>) -> AssetResult<ScriptedAsset> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(gate) = &self.gate {
            gate.wait();
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ctx.error(format!("scripted failure on attempt {}", attempt)));
        }

        Ok(ScriptedAsset {
            bytes: ctx.bytes.to_vec(),
            attempt,
        })
    }
}
