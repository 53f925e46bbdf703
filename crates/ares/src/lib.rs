//! Ares - event system and asset manager
//!
//! This crate ties the Ares sub-crates together behind an explicit
//! [`Engine`] root:
//!
//! - **Events** (`ares-events`): typed, categorized events, a dispatcher and
//!   a thread-safe application queue.
//! - **Assets** (`ares-assets`): staged assets loaded on background threads,
//!   with every lifecycle step reported as an event.
//! - **Core** (`ares-core`): logging, configuration, profiling and the task
//!   pool.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use ares::prelude::*;
//!
//! let mut engine = Engine::builder()
//!     .with_config(EngineConfig::default().with_worker_threads(1))
//!     .build();
//!
//! engine.assets().add_memory_asset("motd.txt", b"welcome".as_slice());
//! engine.assets().stage::<String>("motd", AssetSource::memory("motd.txt")).unwrap();
//! engine.assets().load("motd").unwrap();
//! assert!(engine.assets().wait_idle(Duration::from_secs(5)));
//!
//! let mut loaded = Vec::new();
//! engine.update(|event| {
//!     let mut dispatcher = EventDispatcher::new(event);
//!     dispatcher.dispatch::<AssetLoadedEvent>(|e| {
//!         loaded.push(e.asset_id().to_string());
//!         true
//!     });
//! });
//! assert_eq!(loaded, vec!["motd"]);
//!
//! engine.shutdown();
//! ```

pub mod engine;

pub use ares_assets as assets;
pub use ares_core as core;
pub use ares_events as events;

pub use engine::{Engine, EngineBuilder};

pub mod prelude {
    pub use crate::engine::{Engine, EngineBuilder};
    pub use ares_assets::prelude::*;
    pub use ares_core::config::{EngineConfig, ProfilingMode};
    pub use ares_events::{
        AssetData, AssetEventInfo, AssetFailedEvent, AssetId, AssetLoadedEvent,
        AssetUnloadedEvent, AssetUpdateEvent, Event, EventCategory, EventDispatcher, EventKind,
        EventQueue, EventType, KeyCode, KeyPressedEvent, KeyReleasedEvent, KeyTypedEvent,
        ListenerId, MouseButton, MouseButtonPressedEvent, MouseButtonReleasedEvent,
        MouseMovedEvent, MouseScrolledEvent, TypedEvent, WindowCloseEvent, WindowResizeEvent,
    };
}
