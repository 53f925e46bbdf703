//! Byte readers backing asset sources.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use ares_core::alloc::HashMap;
use parking_lot::RwLock;

use crate::error::AssetError;

/// Result type for async I/O operations.
pub type IoResult<T> = Result<T, AssetError>;

/// Future type for async byte loading.
pub type BytesFuture = Pin<Box<dyn Future<Output = IoResult<Vec<u8>>> + Send + 'static>>;

/// Trait for loading bytes from various sources.
pub trait BytesReader: Send + Sync {
    /// Read all bytes from a path.
    fn read_bytes(&self, path: &Path) -> BytesFuture;
}

/// Blocking file reader wrapped in ready futures.
///
/// Runs on task pool threads, so blocking here never stalls the caller of
/// `load`.
#[derive(Debug, Clone)]
pub struct FileReader {
    base_path: PathBuf,
}

impl FileReader {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn read_bytes_sync(&self, path: &Path) -> IoResult<Vec<u8>> {
        let full_path = self.resolve_path(path);
        std::fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound {
                    path: full_path.display().to_string(),
                }
            } else {
                AssetError::IoError {
                    path: full_path.clone(),
                    source: e,
                }
            }
        })
    }
}

impl BytesReader for FileReader {
    fn read_bytes(&self, path: &Path) -> BytesFuture {
        let result = self.read_bytes_sync(path);
        Box::pin(async move { result })
    }
}

/// In-memory bytes keyed by name, for embedded assets and tests.
///
/// Shared through `&self` so entries can be added while loads are running.
#[derive(Default)]
pub struct MemoryReader {
    files: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bytes for `key`.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.files.write().insert(key.into(), bytes.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl BytesReader for MemoryReader {
    fn read_bytes(&self, path: &Path) -> BytesFuture {
        let key = path.to_string_lossy().to_string();
        let result = self
            .files
            .read()
            .get(&key)
            .map(|bytes| bytes.to_vec())
            .ok_or(AssetError::NotFound { path: key });

        Box::pin(async move { result })
    }
}

impl std::fmt::Debug for MemoryReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryReader")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reader() {
        let reader = MemoryReader::new();
        reader.insert("a.txt", b"hello".as_slice());
        assert!(reader.contains("a.txt"));

        let bytes = pollster::block_on(reader.read_bytes(Path::new("a.txt"))).unwrap();
        assert_eq!(bytes, b"hello");

        let missing = pollster::block_on(reader.read_bytes(Path::new("b.txt")));
        assert!(matches!(missing, Err(AssetError::NotFound { .. })));
    }

    #[test]
    fn test_file_reader_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), [1u8, 2, 3]).unwrap();

        let reader = FileReader::new(dir.path());
        assert_eq!(reader.base_path(), dir.path());
        assert_eq!(reader.read_bytes_sync(Path::new("data.bin")).unwrap(), vec![1, 2, 3]);

        let err = reader.read_bytes_sync(Path::new("nope.bin")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }
}
