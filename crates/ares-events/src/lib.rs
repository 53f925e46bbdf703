//! Ares Events
//!
//! Typed, categorized events and the machinery that routes them:
//!
//! - [`Event`] wraps a closed [`EventKind`] with a `handled` flag.
//! - [`EventDispatcher`] runs a handler only when the event type matches.
//! - [`ListenerRegistry`] keeps ordered listeners and stops delivery once an
//!   event is handled.
//! - [`EventQueue`] buffers events from any thread until the owner processes
//!   them.
//!
//! # Example
//!
//! ```
//! use ares_events::{Event, EventQueue, WindowResizeEvent};
//!
//! let queue = EventQueue::new();
//! queue.add_listener::<WindowResizeEvent>(|resize| {
//!     println!("resized to {}x{}", resize.width, resize.height);
//!     true
//! });
//!
//! queue.push(Event::window_resize(1280, 720));
//! assert_eq!(queue.process(|_| {}), 1);
//! ```

pub mod asset;
pub mod category;
pub mod dispatcher;
pub mod event;
pub mod input;
pub mod listener;
pub mod queue;

pub use asset::{AssetData, AssetEventInfo, AssetId};
pub use category::{EventCategory, EventType};
pub use dispatcher::EventDispatcher;
pub use event::*;
pub use input::{KeyCode, MouseButton};
pub use listener::{Listener, ListenerId, ListenerRegistry};
pub use queue::{EventQueue, EventStats};
