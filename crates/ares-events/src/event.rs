//! Event representation.
//!
//! An [`Event`] wraps a closed [`EventKind`] enum whose variants carry one
//! payload struct each. Categories are derived from the variant through a
//! fixed table, so an event can never be categorized inconsistently with its
//! type.

use std::fmt;
use std::ops::Deref;

use crate::asset::{AssetEventInfo, AssetId};
use crate::category::{EventCategory, EventType};
use crate::input::{KeyCode, MouseButton};

/// A payload type that corresponds to exactly one [`EventType`].
///
/// Implemented for every payload struct in this module. Extracting a payload
/// is a pattern match on [`EventKind`], never a cast.
pub trait TypedEvent: Sized + 'static {
    const EVENT_TYPE: EventType;

    /// Borrow this payload out of `kind` if the variant matches.
    fn from_kind(kind: &EventKind) -> Option<&Self>;

    fn into_kind(self) -> EventKind;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCloseEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowResizeEvent {
    pub width: u32,
    pub height: u32,
    pub client_width: u32,
    pub client_height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowFocusEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowLostFocusEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowMovedEvent {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppTickEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppUpdateEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppRenderEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPressedEvent {
    pub key: KeyCode,
    pub repeat_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyReleasedEvent {
    pub key: KeyCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTypedEvent {
    pub key: KeyCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonPressedEvent {
    pub button: MouseButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonReleasedEvent {
    pub button: MouseButton,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseMovedEvent {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseScrolledEvent {
    pub x_offset: f32,
    pub y_offset: f32,
}

macro_rules! asset_payloads {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone)]
            pub struct $name {
                pub info: AssetEventInfo,
            }

            impl $name {
                pub fn new(info: AssetEventInfo) -> Self {
                    Self { info }
                }

                pub fn info(&self) -> &AssetEventInfo {
                    &self.info
                }

                pub fn asset_id(&self) -> &AssetId {
                    &self.info.id
                }
            }

            impl Deref for $name {
                type Target = AssetEventInfo;

                fn deref(&self) -> &AssetEventInfo {
                    &self.info
                }
            }
        )*
    };
}

asset_payloads! {
    /// A loaded asset's data was replaced in place.
    AssetUpdateEvent,
    /// An asset was registered and is ready to be loaded.
    AssetStagedEvent,
    /// Background loading of an asset started.
    AssetLoadingEvent,
    /// An asset finished loading; `info.data` holds the asset.
    AssetLoadedEvent,
    /// An asset failed to load; `info.message` holds the error.
    AssetFailedEvent,
    /// An asset's data was released.
    AssetUnloadedEvent,
    /// An asset was removed from the manager.
    AssetUnstagedEvent,
}

macro_rules! event_kinds {
    ($($variant:ident($payload:ident)),* $(,)?) => {
        /// Every kind of event, with its payload.
        #[derive(Debug, Clone)]
        pub enum EventKind {
            $($variant($payload),)*
        }

        impl EventKind {
            pub const fn event_type(&self) -> EventType {
                match self {
                    $(EventKind::$variant(_) => EventType::$variant,)*
                }
            }
        }

        $(
            impl TypedEvent for $payload {
                const EVENT_TYPE: EventType = EventType::$variant;

                fn from_kind(kind: &EventKind) -> Option<&Self> {
                    match kind {
                        EventKind::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }

                fn into_kind(self) -> EventKind {
                    EventKind::$variant(self)
                }
            }

            impl From<$payload> for EventKind {
                fn from(payload: $payload) -> Self {
                    EventKind::$variant(payload)
                }
            }

            impl From<$payload> for Event {
                fn from(payload: $payload) -> Self {
                    Event::new(EventKind::$variant(payload))
                }
            }
        )*
    };
}

event_kinds! {
    WindowClose(WindowCloseEvent),
    WindowResize(WindowResizeEvent),
    WindowFocus(WindowFocusEvent),
    WindowLostFocus(WindowLostFocusEvent),
    WindowMoved(WindowMovedEvent),
    AppTick(AppTickEvent),
    AppUpdate(AppUpdateEvent),
    AppRender(AppRenderEvent),
    KeyPressed(KeyPressedEvent),
    KeyReleased(KeyReleasedEvent),
    KeyTyped(KeyTypedEvent),
    MouseButtonPressed(MouseButtonPressedEvent),
    MouseButtonReleased(MouseButtonReleasedEvent),
    MouseMoved(MouseMovedEvent),
    MouseScrolled(MouseScrolledEvent),
    AssetUpdate(AssetUpdateEvent),
    AssetStaged(AssetStagedEvent),
    AssetLoading(AssetLoadingEvent),
    AssetLoaded(AssetLoadedEvent),
    AssetFailed(AssetFailedEvent),
    AssetUnloaded(AssetUnloadedEvent),
    AssetUnstaged(AssetUnstagedEvent),
}

impl EventKind {
    /// The asset details if this is an asset lifecycle event.
    pub fn asset_info(&self) -> Option<&AssetEventInfo> {
        match self {
            EventKind::AssetUpdate(e) => Some(&e.info),
            EventKind::AssetStaged(e) => Some(&e.info),
            EventKind::AssetLoading(e) => Some(&e.info),
            EventKind::AssetLoaded(e) => Some(&e.info),
            EventKind::AssetFailed(e) => Some(&e.info),
            EventKind::AssetUnloaded(e) => Some(&e.info),
            EventKind::AssetUnstaged(e) => Some(&e.info),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::WindowResize(e) => write!(f, "WindowResizeEvent: {}, {}", e.width, e.height),
            EventKind::WindowMoved(e) => write!(f, "WindowMovedEvent: {}, {}", e.x, e.y),
            EventKind::KeyPressed(e) => {
                write!(f, "KeyPressedEvent: {} ({} repeats)", e.key, e.repeat_count)
            }
            EventKind::KeyReleased(e) => write!(f, "KeyReleasedEvent: {}", e.key),
            EventKind::KeyTyped(e) => write!(f, "KeyTypedEvent: {}", e.key),
            EventKind::MouseButtonPressed(e) => write!(f, "MouseButtonPressedEvent: {}", e.button),
            EventKind::MouseButtonReleased(e) => {
                write!(f, "MouseButtonReleasedEvent: {}", e.button)
            }
            EventKind::MouseMoved(e) => write!(f, "MouseMovedEvent: {}, {}", e.x, e.y),
            EventKind::MouseScrolled(e) => {
                write!(f, "MouseScrolledEvent: {}, {}", e.x_offset, e.y_offset)
            }
            other => match other.asset_info() {
                Some(info) => {
                    write!(f, "{}: {}", other.event_type(), info.id)?;
                    if !info.source.is_empty() {
                        write!(f, " ({})", info.source)?;
                    }
                    if !info.message.is_empty() {
                        write!(f, " - {}", info.message)?;
                    }
                    Ok(())
                }
                None => f.write_str(other.event_type().name()),
            },
        }
    }
}

/// Something that happened, plus whether it has been consumed.
///
/// Everything except the `handled` flag is fixed at construction.
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    handled: bool,
}

impl Event {
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            handled: false,
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn into_kind(self) -> EventKind {
        self.kind
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    pub fn name(&self) -> &'static str {
        self.event_type().name()
    }

    pub fn category_flags(&self) -> EventCategory {
        self.event_type().categories()
    }

    pub fn is_in_category(&self, category: EventCategory) -> bool {
        self.category_flags().intersects(category)
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Mark the event as consumed. There is no way to un-handle an event.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// Borrow the payload if the event is of type `T`.
    pub fn payload<T: TypedEvent>(&self) -> Option<&T> {
        T::from_kind(&self.kind)
    }

    pub fn is<T: TypedEvent>(&self) -> bool {
        self.event_type() == T::EVENT_TYPE
    }

    pub fn asset_info(&self) -> Option<&AssetEventInfo> {
        self.kind.asset_info()
    }

    pub fn window_close() -> Self {
        Self::new(WindowCloseEvent)
    }

    pub fn window_resize(width: u32, height: u32) -> Self {
        Self::new(WindowResizeEvent {
            width,
            height,
            client_width: width,
            client_height: height,
        })
    }

    pub fn window_focus() -> Self {
        Self::new(WindowFocusEvent)
    }

    pub fn window_lost_focus() -> Self {
        Self::new(WindowLostFocusEvent)
    }

    pub fn window_moved(x: i32, y: i32) -> Self {
        Self::new(WindowMovedEvent { x, y })
    }

    pub fn app_tick() -> Self {
        Self::new(AppTickEvent)
    }

    pub fn app_update() -> Self {
        Self::new(AppUpdateEvent)
    }

    pub fn app_render() -> Self {
        Self::new(AppRenderEvent)
    }

    pub fn key_pressed(key: KeyCode, repeat_count: u32) -> Self {
        Self::new(KeyPressedEvent { key, repeat_count })
    }

    pub fn key_released(key: KeyCode) -> Self {
        Self::new(KeyReleasedEvent { key })
    }

    pub fn key_typed(key: KeyCode) -> Self {
        Self::new(KeyTypedEvent { key })
    }

    pub fn mouse_button_pressed(button: MouseButton) -> Self {
        Self::new(MouseButtonPressedEvent { button })
    }

    pub fn mouse_button_released(button: MouseButton) -> Self {
        Self::new(MouseButtonReleasedEvent { button })
    }

    pub fn mouse_moved(x: f32, y: f32) -> Self {
        Self::new(MouseMovedEvent { x, y })
    }

    pub fn mouse_scrolled(x_offset: f32, y_offset: f32) -> Self {
        Self::new(MouseScrolledEvent { x_offset, y_offset })
    }

    /// Build the asset lifecycle event of the given type.
    ///
    /// Returns `None` if `event_type` is not in the asset group.
    pub fn asset(event_type: EventType, info: AssetEventInfo) -> Option<Self> {
        let kind = match event_type {
            EventType::AssetUpdate => EventKind::AssetUpdate(AssetUpdateEvent::new(info)),
            EventType::AssetStaged => EventKind::AssetStaged(AssetStagedEvent::new(info)),
            EventType::AssetLoading => EventKind::AssetLoading(AssetLoadingEvent::new(info)),
            EventType::AssetLoaded => EventKind::AssetLoaded(AssetLoadedEvent::new(info)),
            EventType::AssetFailed => EventKind::AssetFailed(AssetFailedEvent::new(info)),
            EventType::AssetUnloaded => EventKind::AssetUnloaded(AssetUnloadedEvent::new(info)),
            EventType::AssetUnstaged => EventKind::AssetUnstaged(AssetUnstagedEvent::new(info)),
            _ => return None,
        };
        Some(Self::new(kind))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// One sample event of every type, in [`EventType::ALL`] order.
///
/// Handy for exhaustive tests over (event type, handler type) pairs.
pub fn sample_events() -> Vec<Event> {
    let info = |state| AssetEventInfo::new("sample", state);
    vec![
        Event::window_close(),
        Event::window_resize(1280, 720),
        Event::window_focus(),
        Event::window_lost_focus(),
        Event::window_moved(10, 20),
        Event::app_tick(),
        Event::app_update(),
        Event::app_render(),
        Event::key_pressed(KeyCode::A, 0),
        Event::key_released(KeyCode::A),
        Event::key_typed(KeyCode::A),
        Event::mouse_button_pressed(MouseButton::LEFT),
        Event::mouse_button_released(MouseButton::LEFT),
        Event::mouse_moved(1.0, 2.0),
        Event::mouse_scrolled(0.0, -1.0),
        Event::new(AssetUpdateEvent::new(info("Loaded"))),
        Event::new(AssetStagedEvent::new(info("Staged"))),
        Event::new(AssetLoadingEvent::new(info("Loading"))),
        Event::new(AssetLoadedEvent::new(info("Loaded"))),
        Event::new(AssetFailedEvent::new(info("Failed"))),
        Event::new(AssetUnloadedEvent::new(info("Unloaded"))),
        Event::new(AssetUnstagedEvent::new(info("Unstaged"))),
    ]
}
