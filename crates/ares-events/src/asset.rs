//! Asset identifiers and payloads carried by asset lifecycle events.
//!
//! These live in the event crate so that asset events can be described
//! without the event system depending on the asset manager.

use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Unique key of an asset inside an asset manager.
///
/// Cloning is a reference-count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Arc<str>);

impl AssetId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({:?})", &*self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&AssetId> for AssetId {
    fn from(id: &AssetId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for AssetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A reference-counted, type-erased view of a loaded asset.
///
/// Holders never own the asset exclusively; the asset manager drops its own
/// reference when the asset is unloaded.
#[derive(Clone)]
pub struct AssetData {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl AssetData {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Build from an already type-erased box, keeping the given type name.
    pub fn from_boxed(value: Box<dyn Any + Send + Sync>, type_name: &'static str) -> Self {
        Self {
            value: Arc::from(value),
            type_name,
        }
    }

    /// Get a typed reference-counted view, or `None` on a type mismatch.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.value).type_id() == std::any::TypeId::of::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether two views point at the same allocation.
    pub fn ptr_eq(&self, other: &AssetData) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// Number of live views, including the manager's own.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.value)
    }
}

impl fmt::Debug for AssetData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetData")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Details shared by every asset lifecycle event.
#[derive(Debug, Clone)]
pub struct AssetEventInfo {
    pub id: AssetId,
    /// Human readable form of the asset's source descriptor.
    pub source: String,
    pub type_name: &'static str,
    /// Name of the state the asset entered.
    pub state: &'static str,
    pub version: u32,
    /// Free-form message; the error text for failures.
    pub message: String,
    /// The loaded asset, present on `AssetLoaded` and `AssetUpdate` only.
    pub data: Option<AssetData>,
}

impl AssetEventInfo {
    pub fn new(id: impl Into<AssetId>, state: &'static str) -> Self {
        Self {
            id: id.into(),
            source: String::new(),
            type_name: "",
            state,
            version: 0,
            message: String::new(),
            data: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_type_name(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_data(mut self, data: AssetData) -> Self {
        self.data = Some(data);
        self
    }

    /// Typed access to the loaded asset carried by this event.
    pub fn asset<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.data.as_ref().and_then(AssetData::downcast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_borrow() {
        let mut map = std::collections::HashMap::new();
        map.insert(AssetId::from("tex"), 1);
        assert_eq!(map.get("tex"), Some(&1));
        assert_eq!(AssetId::from("tex").to_string(), "tex");
    }

    #[test]
    fn test_asset_data_downcast() {
        let data = AssetData::new(String::from("hello"));
        assert!(data.is::<String>());
        assert_eq!(data.downcast::<String>().as_deref().map(String::as_str), Some("hello"));
        assert!(data.downcast::<u32>().is_none());
        assert!(data.type_name().ends_with("String"));
    }

    #[test]
    fn test_asset_data_shares_allocation() {
        let data = AssetData::new(5u32);
        let view = data.clone();
        assert!(data.ptr_eq(&view));
        assert_eq!(data.strong_count(), 2);
    }

    #[test]
    fn test_info_typed_asset() {
        let info = AssetEventInfo::new("tex", "Loaded").with_data(AssetData::new(3u8));
        assert_eq!(info.asset::<u8>().map(|v| *v), Some(3));
        assert!(info.asset::<u16>().is_none());
    }
}
