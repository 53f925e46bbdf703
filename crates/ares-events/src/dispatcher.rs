//! Type-directed routing of a single event to handlers.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::event::{Event, TypedEvent};
use crate::listener::panic_message;

/// Routes one bound event to whichever typed handler matches it.
///
/// ```
/// use ares_events::{Event, EventDispatcher, WindowResizeEvent, KeyPressedEvent};
///
/// let mut event = Event::window_resize(800, 600);
/// let mut dispatcher = EventDispatcher::new(&mut event);
///
/// assert!(!dispatcher.dispatch::<KeyPressedEvent>(|_| true));
/// assert!(dispatcher.dispatch::<WindowResizeEvent>(|e| e.width == 800));
/// assert!(dispatcher.is_handled());
/// ```
pub struct EventDispatcher<'a> {
    event: &'a mut Event,
}

impl<'a> EventDispatcher<'a> {
    pub fn new(event: &'a mut Event) -> Self {
        Self { event }
    }

    /// Run `handler` if the bound event is a `T`.
    ///
    /// Returns whether the handler ran. A handler returning `true` marks the
    /// event handled. Handlers still run on an already handled event; check
    /// [`is_handled`](Self::is_handled) to stop early.
    ///
    /// A panicking handler is logged and counts as not handling the event.
    pub fn dispatch<T: TypedEvent>(&mut self, handler: impl FnOnce(&T) -> bool) -> bool {
        if self.event.event_type() != T::EVENT_TYPE {
            return false;
        }

        let payload = T::from_kind(self.event.kind());
        debug_assert!(
            payload.is_some(),
            "event of type {} does not carry a {} payload",
            self.event.event_type(),
            std::any::type_name::<T>()
        );
        let Some(payload) = payload else {
            return false;
        };

        tracing::trace!("Dispatching {}", T::EVENT_TYPE);
        match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
            Ok(true) => self.event.mark_handled(),
            Ok(false) => {}
            Err(panic) => {
                tracing::error!(
                    "Handler for {} panicked: {}",
                    T::EVENT_TYPE,
                    panic_message(&*panic)
                );
            }
        }
        true
    }

    pub fn event(&self) -> &Event {
        self.event
    }

    pub fn is_handled(&self) -> bool {
        self.event.is_handled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::*;

    #[test]
    fn test_matching_handler_runs() {
        let mut event = Event::key_typed(crate::KeyCode::A);
        let mut seen = None;

        let ran = EventDispatcher::new(&mut event).dispatch::<KeyTypedEvent>(|e| {
            seen = Some(e.key);
            false
        });

        assert!(ran);
        assert_eq!(seen, Some(crate::KeyCode::A));
        assert!(!event.is_handled());
    }

    #[test]
    fn test_mismatched_handler_is_noop() {
        let mut event = Event::app_tick();
        let mut called = false;

        let ran = EventDispatcher::new(&mut event).dispatch::<AppRenderEvent>(|_| {
            called = true;
            true
        });

        assert!(!ran);
        assert!(!called);
        assert!(!event.is_handled());
    }

    #[test]
    fn test_handled_is_or_ed() {
        let mut event = Event::window_close();
        let mut dispatcher = EventDispatcher::new(&mut event);

        assert!(dispatcher.dispatch::<WindowCloseEvent>(|_| true));
        // A later `false` cannot clear the flag.
        assert!(dispatcher.dispatch::<WindowCloseEvent>(|_| false));
        assert!(dispatcher.is_handled());
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let mut event = Event::app_tick();
        let mut dispatcher = EventDispatcher::new(&mut event);

        let ran = dispatcher.dispatch::<AppTickEvent>(|_| -> bool { panic!("handler failure") });
        assert!(ran);
        assert!(!dispatcher.is_handled());

        // The same event still reaches later handlers.
        assert!(dispatcher.dispatch::<AppTickEvent>(|_| true));
        assert!(dispatcher.is_handled());
    }
}
