//! Recording listener.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ares_events::{AssetId, Event, EventType, Listener};
use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct Shared {
    events: Mutex<Vec<Event>>,
    arrived: Condvar,
}

/// Records a copy of every event delivered to its listeners.
///
/// Clones share the same recording, so a test can keep one clone and hand
/// [`listener`](Self::listener) to the code under test.
#[derive(Clone, Default)]
pub struct EventRecorder {
    shared: Arc<Shared>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that records into this recorder and never handles events.
    pub fn listener(&self) -> impl Listener {
        let shared = Arc::clone(&self.shared);
        move |event: &mut Event| {
            shared.events.lock().push(event.clone());
            shared.arrived.notify_all();
            false
        }
    }

    /// Like [`listener`](Self::listener), but marks every event handled.
    pub fn handling_listener(&self) -> impl Listener {
        let record = self.listener();
        move |event: &mut Event| {
            record.notify(event);
            true
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.shared.events.lock().clone()
    }

    pub fn types(&self) -> Vec<EventType> {
        self.shared
            .events
            .lock()
            .iter()
            .map(Event::event_type)
            .collect()
    }

    /// Types of the asset events recorded for `id`, in arrival order.
    pub fn asset_types(&self, id: &str) -> Vec<EventType> {
        self.shared
            .events
            .lock()
            .iter()
            .filter(|e| e.asset_info().is_some_and(|info| info.id.as_str() == id))
            .map(Event::event_type)
            .collect()
    }

    /// Events of one type, in arrival order.
    pub fn of_type(&self, event_type: EventType) -> Vec<Event> {
        self.shared
            .events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.shared
            .events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.shared.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.shared.events.lock().clear();
    }

    /// Block until at least one event of `event_type` was recorded.
    pub fn wait_for(&self, event_type: EventType, timeout: Duration) -> bool {
        self.wait_for_count(event_type, 1, timeout)
    }

    /// Block until `count` events of `event_type` were recorded.
    pub fn wait_for_count(&self, event_type: EventType, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut events = self.shared.events.lock();
        loop {
            if events.iter().filter(|e| e.event_type() == event_type).count() >= count {
                return true;
            }
            if self.shared.arrived.wait_until(&mut events, deadline).timed_out() {
                return events.iter().filter(|e| e.event_type() == event_type).count() >= count;
            }
        }
    }

    /// Block until an event for asset `id` of `event_type` was recorded.
    pub fn wait_for_asset(&self, id: impl Into<AssetId>, event_type: EventType, timeout: Duration) -> bool {
        let id = id.into();
        let matches = |e: &Event| {
            e.event_type() == event_type && e.asset_info().is_some_and(|info| info.id == id)
        };

        let deadline = Instant::now() + timeout;
        let mut events = self.shared.events.lock();
        loop {
            if events.iter().any(matches) {
                return true;
            }
            if self.shared.arrived.wait_until(&mut events, deadline).timed_out() {
                return events.iter().any(matches);
            }
        }
    }
}

impl std::fmt::Debug for EventRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRecorder")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let recorder = EventRecorder::new();
        let listener = recorder.listener();

        let mut tick = Event::app_tick();
        let mut close = Event::window_close();
        assert!(!listener.notify(&mut tick));
        assert!(!listener.notify(&mut close));

        assert_eq!(recorder.types(), vec![EventType::AppTick, EventType::WindowClose]);
        assert_eq!(recorder.count(EventType::AppTick), 1);
    }

    #[test]
    fn test_wait_for_from_other_thread() {
        let recorder = EventRecorder::new();
        let listener = recorder.listener();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            listener.notify(&mut Event::app_render());
        });

        assert!(recorder.wait_for(EventType::AppRender, Duration::from_secs(5)));
        handle.join().unwrap();
        assert!(!recorder.wait_for(EventType::AppTick, Duration::from_millis(10)));
    }
}
