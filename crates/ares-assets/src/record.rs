//! Asset records: the manager's bookkeeping for one identifier.

use std::any::TypeId;
use std::sync::Arc;

use ares_events::{AssetEventInfo, AssetId};

use crate::error::AssetError;
use crate::source::AssetSource;
use crate::state::{AssetState, AssetStatus};

/// Read-only snapshot of a record.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub id: AssetId,
    pub source: AssetSource,
    pub type_name: &'static str,
    pub state: AssetState,
    /// Bumped on every successful load and every replacement.
    pub version: u32,
    /// Present only while `state` is `Failed`.
    pub error: Option<Arc<AssetError>>,
}

impl AssetRecord {
    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }
}

/// Live record owned by the manager.
#[derive(Debug)]
pub(crate) struct AssetEntry {
    pub source: AssetSource,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub status: AssetStatus,
    pub version: u32,
}

impl AssetEntry {
    pub fn new(source: AssetSource, type_id: TypeId, type_name: &'static str) -> Self {
        Self {
            source,
            type_id,
            type_name,
            status: AssetStatus::Staged,
            version: 0,
        }
    }

    pub fn state(&self) -> AssetState {
        self.status.state()
    }

    /// Whether a stage request names the same asset as this record.
    pub fn same_descriptor(&self, source: &AssetSource, type_id: TypeId) -> bool {
        self.source == *source && self.type_id == type_id
    }

    pub fn describe(&self) -> String {
        format!("{} as {}", self.source.display_path(), self.type_name)
    }

    pub fn snapshot(&self, id: &AssetId) -> AssetRecord {
        AssetRecord {
            id: id.clone(),
            source: self.source.clone(),
            type_name: self.type_name,
            state: self.state(),
            version: self.version,
            error: self.status.error().cloned(),
        }
    }

    /// Event details describing the record as it is now.
    pub fn event_info(&self, id: &AssetId) -> AssetEventInfo {
        let mut info = AssetEventInfo::new(id.clone(), self.state().name())
            .with_source(self.source.display_path())
            .with_type_name(self.type_name)
            .with_version(self.version);
        match &self.status {
            AssetStatus::Loaded(data) => info = info.with_data(data.clone()),
            AssetStatus::Failed(err) => info = info.with_message(err.to_string()),
            _ => {}
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ares_events::AssetData;

    fn entry() -> AssetEntry {
        AssetEntry::new(AssetSource::memory("a.txt"), TypeId::of::<String>(), "String")
    }

    #[test]
    fn test_event_info_carries_data_only_when_loaded() {
        let id = AssetId::from("a");
        let mut entry = entry();
        assert!(entry.event_info(&id).data.is_none());

        entry.status.transition(AssetStatus::Loading);
        entry.status.transition(AssetStatus::Loaded(AssetData::new(String::from("hi"))));
        entry.version = 1;

        let info = entry.event_info(&id);
        assert_eq!(info.state, "Loaded");
        assert_eq!(info.version, 1);
        assert_eq!(info.source, "memory://a.txt");
        assert_eq!(info.asset::<String>().as_deref().map(String::as_str), Some("hi"));
    }

    #[test]
    fn test_failed_info_has_message() {
        let id = AssetId::from("a");
        let mut entry = entry();
        entry.status.transition(AssetStatus::Loading);
        entry
            .status
            .transition(AssetStatus::Failed(Arc::new(AssetError::loader("a.txt", "bad header"))));

        let info = entry.event_info(&id);
        assert!(info.message.contains("bad header"));
        assert!(entry.snapshot(&id).error.is_some());
    }

    #[test]
    fn test_descriptor_comparison() {
        let entry = entry();
        assert!(entry.same_descriptor(&AssetSource::memory("a.txt"), TypeId::of::<String>()));
        assert!(!entry.same_descriptor(&AssetSource::memory("b.txt"), TypeId::of::<String>()));
        assert!(!entry.same_descriptor(&AssetSource::memory("a.txt"), TypeId::of::<Vec<u8>>()));
    }
}
