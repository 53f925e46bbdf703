//! Engine root - owns the event queue, the asset manager and the task pool.

use std::sync::Arc;

use ares_assets::{AssetLoader, AssetManager, AssetManagerConfig};
use ares_core::config::EngineConfig;
use ares_core::{TaskPool, logging, profiling};
use ares_events::{Event, EventQueue};

type LoaderSetup = Box<dyn FnOnce(&AssetManager)>;

/// Explicitly constructed and torn down engine state.
///
/// Asset events are forwarded into [`events`](Self::events), so they reach
/// application code on the thread that calls [`update`](Self::update).
pub struct Engine {
    config: EngineConfig,
    events: EventQueue,
    assets: AssetManager,
    pool: Arc<TaskPool>,
    frame: u64,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn new(config: EngineConfig) -> Self {
        EngineBuilder::new().with_config(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    pub fn task_pool(&self) -> &Arc<TaskPool> {
        &self.pool
    }

    /// Number of completed [`update`](Self::update) calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Queue an event for the next [`update`](Self::update).
    pub fn push_event(&self, event: impl Into<Event>) {
        self.events.push(event);
    }

    /// Deliver everything queued since the last call. Returns the number of
    /// events delivered.
    pub fn update(&mut self, callback: impl FnMut(&mut Event)) -> usize {
        profiling::new_frame();
        let delivered = self.events.process(callback);
        self.frame += 1;
        delivered
    }

    /// Stop the asset manager, then the task pool.
    pub fn shutdown(self) {
        let Engine {
            events,
            assets,
            pool,
            frame,
            ..
        } = self;

        tracing::info!("Shutting down engine after {} frames", frame);
        assets.shutdown();
        events.clear();
        drop(assets);

        match Arc::try_unwrap(pool) {
            Ok(pool) => pool.shutdown(),
            Err(_) => tracing::warn!("Task pool still shared; it stops when the last handle drops"),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("frame", &self.frame)
            .field("events", &self.events)
            .field("assets", &self.assets)
            .field("pool", &self.pool)
            .finish()
    }
}

/// Builder for constructing an [`Engine`].
///
/// # Example
///
/// ```
/// use ares::{EngineBuilder, core::EngineConfig};
///
/// let engine = EngineBuilder::new()
///     .with_config(EngineConfig::default().with_worker_threads(1))
///     .without_logging()
///     .build();
///
/// assert_eq!(engine.task_pool().thread_count(), 1);
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    init_logging: bool,
    loaders: Vec<LoaderSetup>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            init_logging: true,
            loaders: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Leave log subscriber installation to the application.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Register an asset loader before the engine starts.
    pub fn with_loader<L: AssetLoader>(mut self, loader: L) -> Self {
        self.loaders
            .push(Box::new(move |assets: &AssetManager| assets.register_loader(loader)));
        self
    }

    pub fn build(self) -> Engine {
        if self.init_logging {
            logging::init_with_filter(&self.config.log_filter);
        }
        profiling::init_profiling(self.config.profiling);

        let pool = Arc::new(TaskPool::new(self.config.resolved_worker_threads()));
        let events = EventQueue::new();
        let assets = AssetManager::new(AssetManagerConfig::from(&self.config), Arc::clone(&pool));
        assets.forward_to(events.clone());

        for setup in self.loaders {
            setup(&assets);
        }

        tracing::info!(
            "Engine started ({} worker threads, asset root {})",
            pool.thread_count(),
            self.config.asset_root.display()
        );

        Engine {
            config: self.config,
            events,
            assets,
            pool,
            frame: 0,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ares_events::{EventType, KeyCode};

    fn engine() -> Engine {
        Engine::builder()
            .with_config(EngineConfig::default().with_worker_threads(1))
            .without_logging()
            .build()
    }

    #[test]
    fn test_update_processes_queue() {
        let mut engine = engine();
        engine.push_event(Event::key_pressed(KeyCode::SPACE, 0));
        engine.push_event(Event::app_tick());

        let mut seen = Vec::new();
        assert_eq!(engine.update(|e| seen.push(e.event_type())), 2);
        assert_eq!(seen, vec![EventType::KeyPressed, EventType::AppTick]);
        assert_eq!(engine.frame(), 1);
        assert_eq!(engine.update(|_| {}), 0);
    }

    #[test]
    fn test_shutdown_stops_assets() {
        let engine = engine();
        let assets = engine.assets().clone();
        engine.shutdown();
        assert!(assets.is_shut_down());
    }
}
