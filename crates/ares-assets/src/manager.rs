//! The asset manager: staging, background loading and lifecycle events.

use std::any::TypeId;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ares_core::TaskPool;
use ares_core::alloc::HashMap;
use ares_core::profiling::profile_scope;
use ares_events::{
    AssetData, AssetFailedEvent, AssetId, AssetLoadedEvent, AssetLoadingEvent, AssetStagedEvent,
    AssetUnloadedEvent, AssetUnstagedEvent, AssetUpdateEvent, Event, EventDispatcher, EventQueue,
    Listener, ListenerId, ListenerRegistry, TypedEvent,
};
use parking_lot::{Condvar, Mutex, ReentrantMutex, RwLock};

use crate::Asset;
use crate::config::AssetManagerConfig;
use crate::error::{AssetError, AssetResult};
use crate::io::{BytesReader, FileReader, MemoryReader};
use crate::loader::{AssetLoader, LoaderRegistry};
use crate::record::{AssetEntry, AssetRecord};
use crate::source::AssetSource;
use crate::state::{AssetState, AssetStatus};

/// Which assets a listener hears about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetFilter {
    /// Every asset.
    Any,
    /// One asset.
    Id(AssetId),
}

impl AssetFilter {
    pub fn id(id: impl Into<AssetId>) -> Self {
        AssetFilter::Id(id.into())
    }

    pub fn matches(&self, id: &AssetId) -> bool {
        match self {
            AssetFilter::Any => true,
            AssetFilter::Id(wanted) => wanted == id,
        }
    }
}

impl From<AssetId> for AssetFilter {
    fn from(id: AssetId) -> Self {
        AssetFilter::Id(id)
    }
}

impl From<&str> for AssetFilter {
    fn from(id: &str) -> Self {
        AssetFilter::Id(id.into())
    }
}

/// One identifier's record.
///
/// `transition` is held for a whole transition, event emission included, so
/// that transitions and their events for one asset never interleave. It is
/// re-entrant so listeners may call back into the manager for the same asset.
/// `entry` is only ever held briefly and never across a listener call.
struct Slot {
    id: AssetId,
    transition: ReentrantMutex<()>,
    entry: Mutex<AssetEntry>,
}

impl Slot {
    fn new(id: AssetId, entry: AssetEntry) -> Self {
        Self {
            id,
            transition: ReentrantMutex::new(()),
            entry: Mutex::new(entry),
        }
    }
}

#[derive(Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

struct ManagerInner {
    records: RwLock<HashMap<AssetId, Arc<Slot>>>,
    loaders: RwLock<LoaderRegistry>,
    file_reader: FileReader,
    memory_reader: MemoryReader,
    listeners: ListenerRegistry<AssetFilter>,
    forward: RwLock<Option<EventQueue>>,
    in_flight: InFlight,
    shutting_down: AtomicBool,
}

/// Decrements the in-flight counter when a load task ends, even if the task
/// is dropped before it runs.
struct LoadGuard(Arc<ManagerInner>);

impl Drop for LoadGuard {
    fn drop(&mut self) {
        let mut count = self.0.in_flight.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.0.in_flight.idle.notify_all();
        }
    }
}

/// Owns every asset record and drives their lifecycle.
///
/// All methods take `&self`; clones share the same records. Loading runs on
/// a [`TaskPool`] and never blocks the caller. Every state change is reported
/// as an asset event to the registered listeners and, if set up with
/// [`forward_to`](Self::forward_to), to an application [`EventQueue`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ares_assets::{AssetManager, AssetSource, AssetState};
///
/// let assets = AssetManager::default();
/// assets.add_memory_asset("greeting.txt", b"hello".as_slice());
///
/// assets.stage::<String>("greeting", AssetSource::memory("greeting.txt")).unwrap();
/// assets.load("greeting").unwrap();
/// assert!(assets.wait_idle(Duration::from_secs(5)));
///
/// assert_eq!(assets.state("greeting"), AssetState::Loaded);
/// assert_eq!(assets.get_typed::<String>("greeting").unwrap().as_str(), "hello");
/// ```
#[derive(Clone)]
pub struct AssetManager {
    inner: Arc<ManagerInner>,
    pool: Arc<TaskPool>,
}

impl AssetManager {
    /// Create a manager that schedules loads on `pool`.
    pub fn new(config: AssetManagerConfig, pool: Arc<TaskPool>) -> Self {
        tracing::debug!(
            "AssetManager created (root: {}, {} load threads)",
            config.asset_root.display(),
            pool.thread_count()
        );

        Self {
            inner: Arc::new(ManagerInner {
                records: RwLock::new(HashMap::new()),
                loaders: RwLock::new(LoaderRegistry::with_defaults()),
                file_reader: FileReader::new(&config.asset_root),
                memory_reader: MemoryReader::new(),
                listeners: ListenerRegistry::new(),
                forward: RwLock::new(None),
                in_flight: InFlight::default(),
                shutting_down: AtomicBool::new(false),
            }),
            pool,
        }
    }

    /// Create a manager with its own task pool.
    pub fn with_config(config: AssetManagerConfig) -> Self {
        let pool = match config.worker_threads {
            Some(threads) => TaskPool::new(threads.max(1)),
            None => TaskPool::default_threads(),
        };
        Self::new(config, Arc::new(pool))
    }

    pub fn register_loader<L: AssetLoader>(&self, loader: L) {
        self.inner.loaders.write().register(loader);
    }

    /// Make `bytes` available to [`AssetSource::Memory`] sources under `key`.
    pub fn add_memory_asset(&self, key: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.inner.memory_reader.insert(key, bytes);
    }

    pub fn asset_root(&self) -> &Path {
        self.inner.file_reader.base_path()
    }

    /// Register `id` as an asset of type `T` read from `source`.
    ///
    /// Staging the same id again with the same source and type is a no-op,
    /// except that an `Unloaded` record moves back to `Staged`. A different
    /// source or type is a [`AssetError::Conflict`] for as long as the record
    /// exists.
    pub fn stage<T: Asset>(
        &self,
        id: impl Into<AssetId>,
        source: impl Into<AssetSource>,
    ) -> AssetResult<AssetRecord> {
        let id = id.into();
        let source = source.into();
        let type_id = TypeId::of::<T>();

        loop {
            self.ensure_running()?;

            let candidate = Arc::new(Slot::new(
                id.clone(),
                AssetEntry::new(source.clone(), type_id, T::type_name()),
            ));
            let guard = candidate.transition.lock();

            let existing = {
                let mut records = self.inner.records.write();
                match records.get(&id) {
                    Some(slot) => Some(Arc::clone(slot)),
                    None => {
                        records.insert(id.clone(), Arc::clone(&candidate));
                        None
                    }
                }
            };

            let Some(slot) = existing else {
                let (record, info) = {
                    let entry = candidate.entry.lock();
                    (entry.snapshot(&id), entry.event_info(&id))
                };
                tracing::debug!("Staged asset '{}' from {}", id, source);
                self.inner.emit(&id, AssetStagedEvent::new(info));
                drop(guard);
                return Ok(record);
            };
            drop(guard);

            let _transition = slot.transition.lock();
            let mut entry = slot.entry.lock();
            match entry.state() {
                // Unstaged between lookup and lock; start over.
                AssetState::Unstaged => continue,
                _ if !entry.same_descriptor(&source, type_id) => {
                    return Err(AssetError::Conflict {
                        id,
                        existing: entry.describe(),
                        requested: format!("{} as {}", source, T::type_name()),
                    });
                }
                AssetState::Unloaded => {
                    entry.status.transition(AssetStatus::Staged);
                    let record = entry.snapshot(&id);
                    let info = entry.event_info(&id);
                    drop(entry);

                    tracing::debug!("Re-staged asset '{}'", id);
                    self.inner.emit(&id, AssetStagedEvent::new(info));
                    return Ok(record);
                }
                _ => return Ok(entry.snapshot(&id)),
            }
        }
    }

    /// Start loading a `Staged` or `Failed` asset in the background.
    ///
    /// Emits `AssetLoading` before returning, then exactly one of
    /// `AssetLoaded` or `AssetFailed` from a pool thread. Calling this while
    /// the asset is `Loading` or `Loaded` does nothing and returns that state.
    pub fn load(&self, id: impl AsRef<str>) -> AssetResult<AssetState> {
        let id = id.as_ref();
        self.ensure_running()?;

        let slot = self.slot(id).ok_or_else(|| unknown(id))?;
        let _transition = slot.transition.lock();
        let mut entry = slot.entry.lock();

        match entry.state() {
            state @ (AssetState::Loading | AssetState::Loaded) => return Ok(state),
            AssetState::Staged | AssetState::Failed => {}
            AssetState::Unstaged => return Err(unknown(id)),
            state @ AssetState::Unloaded => {
                return Err(AssetError::InvalidTransition {
                    id: slot.id.clone(),
                    state,
                    operation: "load",
                });
            }
        }

        entry.status.transition(AssetStatus::Loading);
        let job = LoadJob {
            slot: Arc::clone(&slot),
            source: entry.source.clone(),
            type_id: entry.type_id,
            type_name: entry.type_name,
        };
        let info = entry.event_info(&slot.id);
        drop(entry);

        // Counted before any listener can observe `Loading`.
        *self.inner.in_flight.count.lock() += 1;
        let guard = LoadGuard(Arc::clone(&self.inner));

        tracing::debug!("Loading asset '{}' from {}", slot.id, job.source);
        self.inner.emit(&slot.id, AssetLoadingEvent::new(info));

        self.pool
            .spawn(async move {
                let inner = Arc::clone(&guard.0);
                let bytes = inner.read_bytes(&job.source).await;
                inner.finish_load(&job, bytes);
                drop(guard);
            })
            .detach();

        Ok(AssetState::Loading)
    }

    /// Release a `Loaded` or `Failed` asset's data.
    ///
    /// Unknown ids and already `Unloaded` records are left alone. Unloading a
    /// `Staged` or `Loading` asset is an [`AssetError::InvalidTransition`].
    pub fn unload(&self, id: impl AsRef<str>) -> AssetResult<AssetState> {
        let id = id.as_ref();
        let Some(slot) = self.slot(id) else {
            return Ok(AssetState::Unstaged);
        };
        let _transition = slot.transition.lock();
        let mut entry = slot.entry.lock();

        match entry.state() {
            state @ (AssetState::Unloaded | AssetState::Unstaged) => return Ok(state),
            AssetState::Loaded | AssetState::Failed => {}
            state @ (AssetState::Staged | AssetState::Loading) => {
                return Err(AssetError::InvalidTransition {
                    id: slot.id.clone(),
                    state,
                    operation: "unload",
                });
            }
        }

        entry.status.transition(AssetStatus::Unloaded);
        let info = entry.event_info(&slot.id);
        drop(entry);

        tracing::debug!("Unloaded asset '{}'", slot.id);
        self.inner.emit(&slot.id, AssetUnloadedEvent::new(info));
        Ok(AssetState::Unloaded)
    }

    /// Remove an `Unloaded` (or never loaded `Staged`) record entirely.
    ///
    /// Unknown ids are ignored.
    pub fn unstage(&self, id: impl AsRef<str>) -> AssetResult<()> {
        let id = id.as_ref();
        let Some(slot) = self.slot(id) else {
            return Ok(());
        };
        let _transition = slot.transition.lock();
        let mut entry = slot.entry.lock();

        match entry.state() {
            AssetState::Unstaged => return Ok(()),
            AssetState::Staged | AssetState::Unloaded => {}
            state => {
                return Err(AssetError::InvalidTransition {
                    id: slot.id.clone(),
                    state,
                    operation: "unstage",
                });
            }
        }

        entry.status.transition(AssetStatus::Unstaged);
        let info = entry.event_info(&slot.id);
        drop(entry);

        {
            let mut records = self.inner.records.write();
            if records.get(id).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
                records.remove(id);
            }
        }

        tracing::debug!("Unstaged asset '{}'", slot.id);
        self.inner.emit(&slot.id, AssetUnstagedEvent::new(info));
        Ok(())
    }

    /// Swap the data of a `Loaded` asset and bump its version.
    ///
    /// Emits `AssetUpdate` carrying the new data. Returns the new version.
    pub fn replace<T: Asset>(&self, id: impl AsRef<str>, asset: T) -> AssetResult<u32> {
        let id = id.as_ref();
        let slot = self.slot(id).ok_or_else(|| unknown(id))?;
        let _transition = slot.transition.lock();
        let mut entry = slot.entry.lock();

        let state = entry.state();
        if state != AssetState::Loaded {
            return Err(AssetError::InvalidTransition {
                id: slot.id.clone(),
                state,
                operation: "replace",
            });
        }
        if entry.type_id != TypeId::of::<T>() {
            return Err(AssetError::TypeMismatch {
                expected: entry.type_name,
                found: T::type_name(),
            });
        }

        entry
            .status
            .transition(AssetStatus::Loaded(AssetData::new(asset)));
        entry.version += 1;
        let version = entry.version;
        let info = entry.event_info(&slot.id);
        drop(entry);

        tracing::debug!("Replaced asset '{}' (version {})", slot.id, version);
        self.inner.emit(&slot.id, AssetUpdateEvent::new(info));
        Ok(version)
    }

    /// The loaded data, or `None` unless the asset is `Loaded`. Never blocks
    /// on a load.
    pub fn get(&self, id: impl AsRef<str>) -> Option<AssetData> {
        let slot = self.slot(id.as_ref())?;
        let entry = slot.entry.lock();
        entry.status.data().cloned()
    }

    /// Typed form of [`get`](Self::get). `None` on a type mismatch too.
    pub fn get_typed<T: Asset>(&self, id: impl AsRef<str>) -> Option<Arc<T>> {
        self.get(id)?.downcast::<T>()
    }

    /// Current state; `Unstaged` for unknown ids.
    pub fn state(&self, id: impl AsRef<str>) -> AssetState {
        self.slot(id.as_ref())
            .map(|slot| slot.entry.lock().state())
            .unwrap_or(AssetState::Unstaged)
    }

    pub fn record(&self, id: impl AsRef<str>) -> Option<AssetRecord> {
        let slot = self.slot(id.as_ref())?;
        let entry = slot.entry.lock();
        Some(entry.snapshot(&slot.id))
    }

    /// Snapshots of every record, sorted by id.
    pub fn records(&self) -> Vec<AssetRecord> {
        let slots: Vec<Arc<Slot>> = self.inner.records.read().values().cloned().collect();
        let mut records: Vec<AssetRecord> = slots
            .iter()
            .map(|slot| slot.entry.lock().snapshot(&slot.id))
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    pub fn contains(&self, id: impl AsRef<str>) -> bool {
        self.inner.records.read().contains_key(id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.read().is_empty()
    }

    /// Listen for lifecycle events of the assets `filter` selects.
    ///
    /// Listeners run on whichever thread performs the transition, which for
    /// `AssetLoaded` and `AssetFailed` is a pool thread.
    ///
    /// The asset's transition lock is held while its listeners run. A
    /// listener may inspect or transition the asset it is told about, but
    /// must not transition other assets inline: two pool threads doing that
    /// to each other's assets deadlock. Use [`forward_to`](Self::forward_to)
    /// and react from the main thread instead.
    pub fn add_listener(
        &self,
        filter: impl Into<AssetFilter>,
        listener: impl Listener,
    ) -> ListenerId {
        self.inner.listeners.add(filter.into(), listener)
    }

    /// Listen for one kind of asset event, e.g. [`AssetLoadedEvent`].
    pub fn add_typed_listener<E: TypedEvent>(
        &self,
        filter: impl Into<AssetFilter>,
        handler: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> ListenerId {
        self.add_listener(filter, move |event: &mut Event| {
            EventDispatcher::new(event).dispatch::<E>(&handler);
            event.is_handled()
        })
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Also push every asset event into `queue`, so they can be handled on
    /// the thread that processes it. Replaces any previous target.
    pub fn forward_to(&self, queue: EventQueue) {
        *self.inner.forward.write() = Some(queue);
    }

    pub fn stop_forwarding(&self) {
        *self.inner.forward.write() = None;
    }

    /// Number of loads that have not finished yet.
    pub fn loads_in_flight(&self) -> usize {
        *self.inner.in_flight.count.lock()
    }

    /// Block until no load is running, or `timeout` passes. Returns whether
    /// the manager went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        self.inner.wait_in_flight(deadline)
    }

    /// Refuse new stages and loads, wait for running loads, then drop every
    /// record and listener. No events are emitted for the dropped records.
    pub fn shutdown(&self) {
        if self.inner.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!("Shutting down AssetManager ({} records)", self.len());
        self.inner.wait_in_flight(None);
        self.inner.listeners.clear();
        self.inner.forward.write().take();
        self.inner.records.write().clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    fn ensure_running(&self) -> AssetResult<()> {
        if self.is_shut_down() {
            return Err(AssetError::ShuttingDown);
        }
        Ok(())
    }

    fn slot(&self, id: &str) -> Option<Arc<Slot>> {
        self.inner.records.read().get(id).cloned()
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::with_config(AssetManagerConfig::default())
    }
}

impl std::fmt::Debug for AssetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetManager")
            .field("records", &self.len())
            .field("listeners", &self.inner.listeners.len())
            .field("loads_in_flight", &self.loads_in_flight())
            .finish()
    }
}

fn unknown(id: &str) -> AssetError {
    AssetError::UnknownAsset {
        id: AssetId::new(id),
    }
}

struct LoadJob {
    slot: Arc<Slot>,
    source: AssetSource,
    type_id: TypeId,
    type_name: &'static str,
}

impl ManagerInner {
    async fn read_bytes(&self, source: &AssetSource) -> AssetResult<Vec<u8>> {
        match source {
            AssetSource::Disk { path } => self.file_reader.read_bytes(path).await,
            AssetSource::Memory { key } => self.memory_reader.read_bytes(Path::new(key)).await,
            AssetSource::Bytes { data, .. } => Ok(data.to_vec()),
        }
    }

    fn decode(&self, job: &LoadJob, bytes: &[u8]) -> AssetResult<AssetData> {
        profile_scope!("asset_decode");

        let loaders = self.loaders.read();
        let decoded = catch_unwind(AssertUnwindSafe(|| {
            loaders.load_erased(job.type_id, job.type_name, &job.source, bytes)
        }));
        decoded.unwrap_or_else(|_| {
            Err(AssetError::loader(
                job.source.display_path(),
                "loader panicked",
            ))
        })
    }

    /// Move a `Loading` record to `Loaded` or `Failed` and announce it.
    fn finish_load(&self, job: &LoadJob, bytes: AssetResult<Vec<u8>>) {
        let result = bytes.and_then(|bytes| self.decode(job, &bytes));

        let slot = &job.slot;
        let _transition = slot.transition.lock();
        let mut entry = slot.entry.lock();
        if entry.state() != AssetState::Loading {
            tracing::debug!(
                "Discarding load result for '{}' ({})",
                slot.id,
                entry.state()
            );
            return;
        }

        match result {
            Ok(data) => {
                entry.status.transition(AssetStatus::Loaded(data));
                entry.version += 1;
                let info = entry.event_info(&slot.id);
                drop(entry);

                tracing::debug!("Loaded asset '{}'", slot.id);
                self.emit(&slot.id, AssetLoadedEvent::new(info));
            }
            Err(err) => {
                tracing::warn!("Failed to load asset '{}': {}", slot.id, err);
                entry.status.transition(AssetStatus::Failed(Arc::new(err)));
                let info = entry.event_info(&slot.id);
                drop(entry);

                self.emit(&slot.id, AssetFailedEvent::new(info));
            }
        }
    }

    /// Deliver an asset event. Forwarding gets its own unhandled copy.
    fn emit(&self, id: &AssetId, payload: impl Into<Event>) {
        let mut event = payload.into();

        let forward = self.forward.read().clone();
        if let Some(queue) = forward {
            queue.push(event.clone());
        }

        let notified = self.listeners.notify(&mut event, |filter| filter.matches(id));
        tracing::trace!("{} delivered to {} listeners", event, notified);
    }

    fn wait_in_flight(&self, deadline: Option<Instant>) -> bool {
        let mut count = self.in_flight.count.lock();
        while *count > 0 {
            match deadline {
                Some(deadline) => {
                    if self.in_flight.idle.wait_until(&mut count, deadline).timed_out() {
                        return *count == 0;
                    }
                }
                None => self.in_flight.idle.wait(&mut count),
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(AssetManager: Send, Sync, Clone);

    fn manager() -> AssetManager {
        AssetManager::with_config(AssetManagerConfig::default().with_worker_threads(2))
    }

    #[test]
    fn test_filter_matches() {
        let id = AssetId::from("tex");
        assert!(AssetFilter::Any.matches(&id));
        assert!(AssetFilter::id("tex").matches(&id));
        assert!(!AssetFilter::from("other").matches(&id));
    }

    #[test]
    fn test_stage_creates_staged_record() {
        let assets = manager();
        let record = assets
            .stage::<String>("a", AssetSource::memory("a.txt"))
            .unwrap();
        assert_eq!(record.state, AssetState::Staged);
        assert_eq!(record.version, 0);
        assert!(assets.contains("a"));
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_unknown_ids() {
        let assets = manager();
        assert!(matches!(
            assets.load("ghost"),
            Err(AssetError::UnknownAsset { .. })
        ));
        assert_eq!(assets.unload("ghost").unwrap(), AssetState::Unstaged);
        assert!(assets.unstage("ghost").is_ok());
        assert_eq!(assets.state("ghost"), AssetState::Unstaged);
        assert!(assets.get("ghost").is_none());
    }

    #[test]
    fn test_unstage_staged_record() {
        let assets = manager();
        assets.stage::<String>("a", AssetSource::memory("a.txt")).unwrap();
        assets.unstage("a").unwrap();
        assert!(assets.is_empty());
    }

    #[test]
    fn test_loader_panic_becomes_failure() {
        struct Exploding;
        impl AssetLoader for Exploding {
            type Asset = u32;
            fn extensions(&self) -> &[&str] {
                &["boom"]
            }
            fn load(&self, _ctx: crate::LoadContext<'_>) -> AssetResult<u32> {
                panic!("decoder bug")
            }
        }
        impl Asset for u32 {}

        let assets = manager();
        assets.register_loader(Exploding);
        assets.add_memory_asset("x.boom", b"".as_slice());
        assets.stage::<u32>("x", AssetSource::memory("x.boom")).unwrap();
        assets.load("x").unwrap();

        assert!(assets.wait_idle(Duration::from_secs(5)));
        assert_eq!(assets.state("x"), AssetState::Failed);
        let record = assets.record("x").unwrap();
        assert!(record.error.unwrap().to_string().contains("loader panicked"));
    }

    #[test]
    fn test_load_is_in_flight_when_loading_is_announced() {
        let assets = manager();
        assets.add_memory_asset("a.txt", b"a".as_slice());
        assets.stage::<String>("a", AssetSource::memory("a.txt")).unwrap();

        let observed = Arc::new(Mutex::new(None));
        let sink = observed.clone();
        let handle = assets.clone();
        assets.add_typed_listener::<AssetLoadingEvent>(AssetFilter::Any, move |_| {
            *sink.lock() = Some(handle.loads_in_flight());
            false
        });

        assets.load("a").unwrap();
        assert!(assets.wait_idle(Duration::from_secs(5)));
        assert_eq!(*observed.lock(), Some(1));
        assets.shutdown();
    }

    #[test]
    fn test_loaded_listener_may_unload_its_own_asset() {
        let assets = manager();
        assets.add_memory_asset("a.txt", b"a".as_slice());
        assets.stage::<String>("a", AssetSource::memory("a.txt")).unwrap();

        let handle = assets.clone();
        assets.add_typed_listener::<AssetLoadedEvent>("a", move |e| {
            handle.unload(e.asset_id().as_str()).is_ok()
        });

        assets.load("a").unwrap();
        assert!(assets.wait_idle(Duration::from_secs(5)));
        assert_eq!(assets.state("a"), AssetState::Unloaded);
        assert!(assets.get("a").is_none());
        assets.shutdown();
    }

    #[test]
    fn test_shutdown_rejects_new_work() {
        let assets = manager();
        assets.stage::<String>("a", AssetSource::memory("a.txt")).unwrap();
        assets.shutdown();

        assert!(assets.is_empty());
        assert!(matches!(
            assets.stage::<String>("b", AssetSource::memory("b.txt")),
            Err(AssetError::ShuttingDown)
        ));
        assert!(matches!(assets.load("a"), Err(AssetError::ShuttingDown)));
    }
}
