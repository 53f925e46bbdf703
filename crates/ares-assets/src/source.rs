//! Asset sources - where assets come from.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The source of an asset - where to load it from.
///
/// Two stage requests name the same asset only if their sources compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetSource {
    /// A file on disk, relative to the asset root unless absolute.
    Disk { path: PathBuf },

    /// A named entry added with `AssetManager::add_memory_asset`.
    Memory { key: String },

    /// Raw bytes handed over directly.
    Bytes {
        /// Identifier for this data; its extension selects the loader.
        id: String,
        data: Arc<[u8]>,
    },
}

impl AssetSource {
    pub fn disk(path: impl AsRef<Path>) -> Self {
        AssetSource::Disk {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn memory(key: impl Into<String>) -> Self {
        AssetSource::Memory { key: key.into() }
    }

    pub fn bytes(id: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        AssetSource::Bytes {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Get the original path if this is a disk source.
    pub fn path(&self) -> Option<&Path> {
        match self {
            AssetSource::Disk { path } => Some(path),
            _ => None,
        }
    }

    /// The extension used for loader selection, without the dot.
    pub fn extension(&self) -> Option<&str> {
        match self {
            AssetSource::Disk { path } => path.extension().and_then(|e| e.to_str()),
            AssetSource::Memory { key } => extension_of(key),
            AssetSource::Bytes { id, .. } => extension_of(id).filter(|e| !e.contains(':')),
        }
    }

    /// Get a string representation of this source for logging/debugging.
    pub fn display_path(&self) -> String {
        match self {
            AssetSource::Disk { path } => path.display().to_string(),
            AssetSource::Memory { key } => format!("memory://{}", key),
            AssetSource::Bytes { id, .. } => format!("bytes://{}", id),
        }
    }

    pub fn is_disk(&self) -> bool {
        matches!(self, AssetSource::Disk { .. })
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, AssetSource::Memory { .. })
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, AssetSource::Bytes { .. })
    }
}

fn extension_of(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty() && !ext.contains('/')).then_some(ext)
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_path())
    }
}

impl From<&str> for AssetSource {
    fn from(path: &str) -> Self {
        AssetSource::disk(path)
    }
}

impl From<String> for AssetSource {
    fn from(path: String) -> Self {
        AssetSource::disk(path)
    }
}

impl From<&Path> for AssetSource {
    fn from(path: &Path) -> Self {
        AssetSource::disk(path)
    }
}

impl From<PathBuf> for AssetSource {
    fn from(path: PathBuf) -> Self {
        AssetSource::Disk { path }
    }
}
