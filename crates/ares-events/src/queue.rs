//! Application event queue.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use ares_core::profiling::profile_function;
use parking_lot::Mutex;

use crate::category::EventType;
use crate::dispatcher::EventDispatcher;
use crate::event::{Event, TypedEvent};
use crate::listener::{Listener, ListenerId, ListenerRegistry, panic_message};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStats {
    pub events_received: usize,
    pub events_processed: usize,
    pub events_handled: usize,
}

struct QueueInner {
    /// Front buffer; `process` swaps it out for an empty one.
    pending: Mutex<Vec<Event>>,
    listeners: ListenerRegistry<EventType>,
    stats: Mutex<EventStats>,
}

/// Double-buffered, thread-safe event queue.
///
/// Any thread may `push`; the owner drains it once per frame with
/// [`process`](Self::process). Cloning gives another handle to the same queue.
#[derive(Clone)]
pub struct EventQueue {
    inner: Arc<QueueInner>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(QueueInner {
                pending: Mutex::new(Vec::with_capacity(64)),
                listeners: ListenerRegistry::new(),
                stats: Mutex::new(EventStats::default()),
            }),
        }
    }

    pub fn push(&self, event: impl Into<Event>) {
        let event = event.into();
        tracing::trace!("Queued {}", event.name());
        self.inner.pending.lock().push(event);
        self.inner.stats.lock().events_received += 1;
    }

    /// Listen for events carrying a `T` payload.
    ///
    /// Returning `true` from `handler` marks the event handled.
    pub fn add_listener<T: TypedEvent>(
        &self,
        handler: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> ListenerId {
        self.inner.listeners.add(T::EVENT_TYPE, move |event: &mut Event| {
            EventDispatcher::new(event).dispatch::<T>(&handler);
            event.is_handled()
        })
    }

    /// Listen for every event of `event_type` with access to the whole event.
    pub fn add_type_listener(&self, event_type: EventType, listener: impl Listener) -> ListenerId {
        self.inner.listeners.add(event_type, listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Deliver every pending event in FIFO order.
    ///
    /// `callback` sees each event first; listeners for the event's type run
    /// afterwards unless the event was handled. Events pushed while this runs
    /// are kept for the next call. Returns the number of events delivered.
    ///
    /// A panic in `callback` is logged; the event still goes to its
    /// listeners and the rest of the batch is delivered.
    pub fn process(&self, mut callback: impl FnMut(&mut Event)) -> usize {
        profile_function!();

        let batch = std::mem::take(&mut *self.inner.pending.lock());
        let count = batch.len();
        let mut handled = 0;

        for mut event in batch {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(&mut event))) {
                tracing::error!(
                    "Event callback panicked on {}: {}",
                    event.name(),
                    panic_message(&*panic)
                );
            }
            if !event.is_handled() {
                let event_type = event.event_type();
                self.inner
                    .listeners
                    .notify(&mut event, |key| *key == event_type);
            }
            if event.is_handled() {
                handled += 1;
            }
        }

        let mut stats = self.inner.stats.lock();
        stats.events_processed += count;
        stats.events_handled += handled;
        count
    }

    /// Drop pending events and all listeners.
    pub fn clear(&self) {
        self.inner.pending.lock().clear();
        self.inner.listeners.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn stats(&self) -> EventStats {
        *self.inner.stats.lock()
    }

    pub fn reset_stats(&self) {
        *self.inner.stats.lock() = EventStats::default();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending_len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AppTickEvent, KeyPressedEvent, WindowResizeEvent};
    use crate::input::KeyCode;

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new();
        queue.push(Event::app_tick());
        queue.push(Event::app_update());
        queue.push(Event::app_render());

        let mut seen = Vec::new();
        assert_eq!(queue.process(|e| seen.push(e.event_type())), 3);
        assert_eq!(
            seen,
            vec![EventType::AppTick, EventType::AppUpdate, EventType::AppRender]
        );
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_events_pushed_during_process_wait_for_next_pass() {
        let queue = EventQueue::new();
        queue.push(Event::app_tick());

        let inner = queue.clone();
        let delivered = queue.process(|_| inner.push(Event::app_render()));
        assert_eq!(delivered, 1);
        assert_eq!(queue.pending_len(), 1);

        let mut seen = Vec::new();
        queue.process(|e| seen.push(e.event_type()));
        assert_eq!(seen, vec![EventType::AppRender]);
    }

    #[test]
    fn test_typed_listener_only_sees_its_type() {
        let queue = EventQueue::new();
        let widths = Arc::new(Mutex::new(Vec::new()));
        let sink = widths.clone();
        queue.add_listener::<WindowResizeEvent>(move |e| {
            sink.lock().push(e.width);
            false
        });

        queue.push(Event::window_resize(640, 480));
        queue.push(Event::key_pressed(KeyCode::A, 0));
        queue.push(Event::window_resize(800, 600));
        queue.process(|_| {});

        assert_eq!(*widths.lock(), vec![640, 800]);
    }

    #[test]
    fn test_handled_by_callback_skips_listeners() {
        let queue = EventQueue::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        queue.add_listener::<KeyPressedEvent>(move |_| {
            *counter.lock() += 1;
            true
        });

        queue.push(Event::key_pressed(KeyCode::ESCAPE, 0));
        queue.push(Event::key_pressed(KeyCode::ENTER, 0));
        queue.process(|e| {
            if e.payload::<KeyPressedEvent>().map(|k| k.key) == Some(KeyCode::ESCAPE) {
                e.mark_handled();
            }
        });

        assert_eq!(*calls.lock(), 1);
        let stats = queue.stats();
        assert_eq!(stats.events_received, 2);
        assert_eq!(stats.events_processed, 2);
        assert_eq!(stats.events_handled, 2);
    }

    #[test]
    fn test_handled_listener_stops_later_listeners() {
        let queue = EventQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = log.clone();
        queue.add_type_listener(EventType::WindowClose, move |_: &mut Event| {
            first.lock().push("first");
            true
        });
        let second = log.clone();
        queue.add_type_listener(EventType::WindowClose, move |_: &mut Event| {
            second.lock().push("second");
            false
        });

        queue.push(Event::window_close());
        queue.process(|_| {});
        assert_eq!(*log.lock(), vec!["first"]);
    }

    #[test]
    fn test_push_from_other_threads() {
        let queue = EventQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        queue.push(Event::app_tick());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.process(|_| {}), 100);
    }

    #[test]
    fn test_panicking_callback_does_not_drop_batch() {
        let queue = EventQueue::new();
        let ticks = Arc::new(Mutex::new(0));
        let counter = ticks.clone();
        queue.add_listener::<AppTickEvent>(move |_| {
            *counter.lock() += 1;
            false
        });

        queue.push(Event::app_tick());
        queue.push(Event::app_update());
        queue.push(Event::app_render());

        let mut seen = Vec::new();
        let delivered = queue.process(|e| {
            seen.push(e.event_type());
            if e.event_type() == EventType::AppTick {
                panic!("callback failure");
            }
        });

        assert_eq!(delivered, 3);
        assert_eq!(
            seen,
            vec![EventType::AppTick, EventType::AppUpdate, EventType::AppRender]
        );
        assert_eq!(*ticks.lock(), 1);
        assert_eq!(queue.pending_len(), 0);

        let stats = queue.stats();
        assert_eq!(stats.events_received, 3);
        assert_eq!(stats.events_processed, 3);
    }

    #[test]
    fn test_reset_stats() {
        let queue = EventQueue::new();
        queue.push(Event::window_close());
        queue.process(|e| e.mark_handled());
        assert_eq!(queue.stats().events_handled, 1);

        queue.reset_stats();
        assert_eq!(queue.stats(), EventStats::default());
    }

    #[test]
    fn test_clear_and_remove() {
        let queue = EventQueue::new();
        let id = queue.add_type_listener(EventType::AppTick, |_: &mut Event| false);
        assert!(queue.remove_listener(id));
        assert!(!queue.remove_listener(id));

        queue.add_type_listener(EventType::AppTick, |_: &mut Event| false);
        queue.push(Event::app_tick());
        queue.clear();
        assert_eq!(queue.pending_len(), 0);
        assert_eq!(queue.listener_count(), 0);
    }
}
