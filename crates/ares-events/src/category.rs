//! Event types and categories.

use std::fmt;

bitflags::bitflags! {
    /// Coarse, combinable classification of events.
    ///
    /// The empty set is the "none" category.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventCategory: u16 {
        const APPLICATION = 1 << 0;
        const INPUT = 1 << 1;
        const KEYBOARD = 1 << 2;
        const MOUSE = 1 << 3;
        const MOUSE_BUTTON = 1 << 4;
        const ASSET = 1 << 5;
    }
}

impl EventCategory {
    pub const NONE: Self = Self::empty();
}

/// The exact kind of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    WindowClose,
    WindowResize,
    WindowFocus,
    WindowLostFocus,
    WindowMoved,
    AppTick,
    AppUpdate,
    AppRender,
    KeyPressed,
    KeyReleased,
    KeyTyped,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseScrolled,
    AssetUpdate,
    AssetStaged,
    AssetLoading,
    AssetLoaded,
    AssetFailed,
    AssetUnloaded,
    AssetUnstaged,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [EventType; 22] = [
        EventType::WindowClose,
        EventType::WindowResize,
        EventType::WindowFocus,
        EventType::WindowLostFocus,
        EventType::WindowMoved,
        EventType::AppTick,
        EventType::AppUpdate,
        EventType::AppRender,
        EventType::KeyPressed,
        EventType::KeyReleased,
        EventType::KeyTyped,
        EventType::MouseButtonPressed,
        EventType::MouseButtonReleased,
        EventType::MouseMoved,
        EventType::MouseScrolled,
        EventType::AssetUpdate,
        EventType::AssetStaged,
        EventType::AssetLoading,
        EventType::AssetLoaded,
        EventType::AssetFailed,
        EventType::AssetUnloaded,
        EventType::AssetUnstaged,
    ];

    /// The fixed category set of this event type.
    pub const fn categories(self) -> EventCategory {
        match self {
            EventType::WindowClose
            | EventType::WindowResize
            | EventType::WindowFocus
            | EventType::WindowLostFocus
            | EventType::WindowMoved
            | EventType::AppTick
            | EventType::AppUpdate
            | EventType::AppRender => EventCategory::APPLICATION,

            EventType::KeyPressed | EventType::KeyReleased | EventType::KeyTyped => {
                EventCategory::KEYBOARD.union(EventCategory::INPUT)
            }

            EventType::MouseButtonPressed | EventType::MouseButtonReleased => {
                EventCategory::MOUSE_BUTTON
                    .union(EventCategory::MOUSE)
                    .union(EventCategory::INPUT)
            }

            EventType::MouseMoved | EventType::MouseScrolled => {
                EventCategory::MOUSE.union(EventCategory::INPUT)
            }

            EventType::AssetUpdate
            | EventType::AssetStaged
            | EventType::AssetLoading
            | EventType::AssetLoaded
            | EventType::AssetFailed
            | EventType::AssetUnloaded
            | EventType::AssetUnstaged => EventCategory::ASSET.union(EventCategory::APPLICATION),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EventType::WindowClose => "WindowClose",
            EventType::WindowResize => "WindowResize",
            EventType::WindowFocus => "WindowFocus",
            EventType::WindowLostFocus => "WindowLostFocus",
            EventType::WindowMoved => "WindowMoved",
            EventType::AppTick => "AppTick",
            EventType::AppUpdate => "AppUpdate",
            EventType::AppRender => "AppRender",
            EventType::KeyPressed => "KeyPressed",
            EventType::KeyReleased => "KeyReleased",
            EventType::KeyTyped => "KeyTyped",
            EventType::MouseButtonPressed => "MouseButtonPressed",
            EventType::MouseButtonReleased => "MouseButtonReleased",
            EventType::MouseMoved => "MouseMoved",
            EventType::MouseScrolled => "MouseScrolled",
            EventType::AssetUpdate => "AssetUpdate",
            EventType::AssetStaged => "AssetStaged",
            EventType::AssetLoading => "AssetLoading",
            EventType::AssetLoaded => "AssetLoaded",
            EventType::AssetFailed => "AssetFailed",
            EventType::AssetUnloaded => "AssetUnloaded",
            EventType::AssetUnstaged => "AssetUnstaged",
        }
    }

    pub const fn is_in_category(self, category: EventCategory) -> bool {
        self.categories().intersects(category)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_exhaustive_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for ty in EventType::ALL {
            assert!(seen.insert(ty), "{ty} listed twice");
        }
        assert_eq!(seen.len(), EventType::ALL.len());
    }

    #[test]
    fn test_every_type_has_a_category() {
        for ty in EventType::ALL {
            assert!(!ty.categories().is_empty(), "{ty} has no category");
        }
    }

    #[test]
    fn test_input_categories() {
        assert!(EventType::KeyTyped.is_in_category(EventCategory::KEYBOARD));
        assert!(EventType::KeyTyped.is_in_category(EventCategory::INPUT));
        assert!(!EventType::KeyTyped.is_in_category(EventCategory::MOUSE));

        let button = EventType::MouseButtonPressed.categories();
        assert!(button.contains(EventCategory::MOUSE_BUTTON | EventCategory::MOUSE | EventCategory::INPUT));
        assert!(!EventType::MouseMoved.is_in_category(EventCategory::MOUSE_BUTTON));
    }

    #[test]
    fn test_asset_and_application_categories() {
        assert_eq!(EventType::WindowResize.categories(), EventCategory::APPLICATION);
        assert!(EventType::AssetLoaded.is_in_category(EventCategory::ASSET));
        assert!(!EventType::AppTick.is_in_category(EventCategory::ASSET));
        assert!(!EventType::AppTick.is_in_category(EventCategory::NONE));
    }

    #[test]
    fn test_names_match_debug() {
        for ty in EventType::ALL {
            assert_eq!(ty.name(), format!("{ty:?}"));
        }
    }
}
