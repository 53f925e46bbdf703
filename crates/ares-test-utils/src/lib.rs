//! Test utilities for the Ares engine.
//!
//! - [`EventRecorder`] - a listener that records every event it sees and lets
//!   tests block until a given event arrives.
//! - [`ScriptedLoader`] - an asset loader whose failures and timing are
//!   controlled by the test.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use ares_assets::{AssetFilter, AssetManager, AssetSource};
//! use ares_events::EventType;
//! use ares_test_utils::{EventRecorder, ScriptedAsset, ScriptedLoader};
//!
//! let assets = AssetManager::default();
//! let loader = ScriptedLoader::new().failing_first(1);
//! assets.register_loader(loader.clone());
//!
//! let recorder = EventRecorder::new();
//! assets.add_listener(AssetFilter::Any, recorder.listener());
//!
//! assets.stage::<ScriptedAsset>("a", AssetSource::bytes("a.scripted", vec![1u8])).unwrap();
//! assets.load("a").unwrap();
//! assert!(recorder.wait_for(EventType::AssetFailed, Duration::from_secs(5)));
//! assert_eq!(loader.attempts(), 1);
//! ```

pub mod loader;
pub mod recorder;

pub use loader::{Gate, ScriptedAsset, ScriptedLoader};
pub use recorder::EventRecorder;
