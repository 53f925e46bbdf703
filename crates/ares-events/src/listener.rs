//! Listener registration shared by the event queue and the asset manager.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::event::Event;

/// Receives events.
///
/// Return `true` to mark the event handled, which stops delivery to the
/// listeners registered after this one.
pub trait Listener: Send + Sync + 'static {
    fn notify(&self, event: &mut Event) -> bool;
}

impl<F> Listener for F
where
    F: Fn(&mut Event) -> bool + Send + Sync + 'static,
{
    fn notify(&self, event: &mut Event) -> bool {
        self(event)
    }
}

/// Stable identity of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

struct Entry<K> {
    id: ListenerId,
    key: K,
    listener: Arc<dyn Listener>,
}

/// Ordered set of listeners, each registered under a key `K`.
///
/// Notification snapshots the matching listeners and releases the lock before
/// calling any of them, so listeners may add or remove listeners (themselves
/// included) while being notified.
pub struct ListenerRegistry<K> {
    entries: RwLock<Vec<Entry<K>>>,
}

impl<K> ListenerRegistry<K> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, key: K, listener: impl Listener) -> ListenerId {
        self.add_shared(key, Arc::new(listener))
    }

    pub fn add_shared(&self, key: K, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId::next();
        self.entries.write().push(Entry { id, key, listener });
        id
    }

    /// Unregister a listener. Unknown ids are ignored.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => {
                tracing::debug!("Listener {} is not registered", id);
                false
            }
        }
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.read().iter().any(|entry| entry.id == id)
    }

    /// Deliver `event` to every listener whose key satisfies `matches`, in
    /// registration order, until the event is handled.
    ///
    /// Returns the number of listeners invoked. A panicking listener is logged
    /// and skipped.
    pub fn notify(&self, event: &mut Event, matches: impl Fn(&K) -> bool) -> usize {
        let snapshot: Vec<(ListenerId, Arc<dyn Listener>)> = self
            .entries
            .read()
            .iter()
            .filter(|entry| matches(&entry.key))
            .map(|entry| (entry.id, Arc::clone(&entry.listener)))
            .collect();

        let mut invoked = 0;
        for (id, listener) in snapshot {
            if event.is_handled() {
                break;
            }
            // Removed by an earlier listener in this pass.
            if !self.contains(id) {
                continue;
            }

            invoked += 1;
            match catch_unwind(AssertUnwindSafe(|| listener.notify(event))) {
                Ok(true) => event.mark_handled(),
                Ok(false) => {}
                Err(panic) => {
                    tracing::error!(
                        "Listener {} panicked on {}: {}",
                        id,
                        event.name(),
                        panic_message(&*panic)
                    );
                }
            }
        }
        invoked
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K> Default for ListenerRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for ListenerRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn order_log() -> Arc<Mutex<Vec<u32>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_notify_in_registration_order() {
        let registry = ListenerRegistry::new();
        let log = order_log();
        for n in 0..3 {
            let log = log.clone();
            registry.add((), move |_: &mut Event| {
                log.lock().push(n);
                false
            });
        }

        let mut event = Event::app_tick();
        assert_eq!(registry.notify(&mut event, |_| true), 3);
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_handled_stops_delivery() {
        let registry = ListenerRegistry::new();
        let log = order_log();
        let first = log.clone();
        registry.add((), move |_: &mut Event| {
            first.lock().push(1);
            true
        });
        let second = log.clone();
        registry.add((), move |_: &mut Event| {
            second.lock().push(2);
            false
        });

        let mut event = Event::app_tick();
        registry.notify(&mut event, |_| true);
        assert!(event.is_handled());
        assert_eq!(*log.lock(), vec![1]);
    }

    #[test]
    fn test_key_filter() {
        let registry = ListenerRegistry::new();
        let log = order_log();
        for key in [1u32, 2, 1] {
            let log = log.clone();
            registry.add(key, move |_: &mut Event| {
                log.lock().push(key);
                false
            });
        }

        let mut event = Event::app_tick();
        assert_eq!(registry.notify(&mut event, |key| *key == 1), 2);
        assert_eq!(*log.lock(), vec![1, 1]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry: ListenerRegistry<()> = ListenerRegistry::new();
        let id = registry.add((), |_: &mut Event| false);
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_during_notify() {
        let registry = Arc::new(ListenerRegistry::new());
        let log = order_log();
        let second_id = Arc::new(Mutex::new(None));

        let reg = registry.clone();
        let target = second_id.clone();
        registry.add((), move |_: &mut Event| {
            if let Some(id) = *target.lock() {
                reg.remove(id);
            }
            false
        });
        let second_log = log.clone();
        let id = registry.add((), move |_: &mut Event| {
            second_log.lock().push(2);
            false
        });
        *second_id.lock() = Some(id);

        let mut event = Event::app_tick();
        assert_eq!(registry.notify(&mut event, |_| true), 1);
        assert!(log.lock().is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let registry = ListenerRegistry::new();
        let log = order_log();
        registry.add((), |_: &mut Event| -> bool { panic!("listener failure") });
        let after = log.clone();
        registry.add((), move |_: &mut Event| {
            after.lock().push(7);
            false
        });

        let mut event = Event::app_tick();
        assert_eq!(registry.notify(&mut event, |_| true), 2);
        assert_eq!(*log.lock(), vec![7]);
        assert_eq!(registry.len(), 2);
    }
}
