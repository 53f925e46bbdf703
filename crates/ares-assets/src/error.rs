//! Error types for the asset system.

use std::fmt;
use std::path::PathBuf;

use ares_events::AssetId;

use crate::state::AssetState;

/// Errors that can occur during asset operations.
#[derive(Debug)]
pub enum AssetError {
    /// The source bytes of an asset do not exist.
    NotFound {
        /// The path or key that was looked up.
        path: String,
    },

    /// Failed to read asset data from the source.
    IoError {
        /// The path that failed to load.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// No loader registered for this asset type.
    NoLoader {
        /// Human-readable type name.
        type_name: &'static str,
    },

    /// No loader found for the given file extension.
    NoLoaderForExtension {
        /// The file extension.
        extension: String,
    },

    /// The loader failed to parse/decode the asset.
    LoaderError {
        /// The source being loaded.
        path: String,
        /// Description of the error.
        message: String,
    },

    /// Type mismatch when accessing or replacing an asset.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// No record with this identifier is staged.
    UnknownAsset { id: AssetId },

    /// The identifier is already staged with a different source or type.
    Conflict {
        id: AssetId,
        existing: String,
        requested: String,
    },

    /// The operation is not allowed in the record's current state.
    InvalidTransition {
        id: AssetId,
        state: AssetState,
        operation: &'static str,
    },

    /// The asset manager has been shut down.
    ShuttingDown,

    /// Generic error with a message.
    Other {
        /// Error message.
        message: String,
    },
}

impl AssetError {
    /// Shorthand for loaders reporting a decode failure.
    pub fn loader(path: impl Into<String>, message: impl Into<String>) -> Self {
        AssetError::LoaderError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound { path } => {
                write!(f, "Asset not found: {}", path)
            }
            AssetError::IoError { path, source } => {
                write!(f, "IO error loading '{}': {}", path.display(), source)
            }
            AssetError::NoLoader { type_name } => {
                write!(f, "No loader registered for asset type: {}", type_name)
            }
            AssetError::NoLoaderForExtension { extension } => {
                write!(f, "No loader registered for extension: .{}", extension)
            }
            AssetError::LoaderError { path, message } => {
                write!(f, "Failed to load '{}': {}", path, message)
            }
            AssetError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            AssetError::UnknownAsset { id } => {
                write!(f, "Unknown asset: {}", id)
            }
            AssetError::Conflict {
                id,
                existing,
                requested,
            } => {
                write!(
                    f,
                    "Asset '{}' is already staged as {} (requested {})",
                    id, existing, requested
                )
            }
            AssetError::InvalidTransition {
                id,
                state,
                operation,
            } => {
                write!(f, "Cannot {} asset '{}' while {}", operation, id, state)
            }
            AssetError::ShuttingDown => {
                write!(f, "Asset manager is shutting down")
            }
            AssetError::Other { message } => {
                write!(f, "Asset error: {}", message)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

/// Result type alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = AssetError::InvalidTransition {
            id: AssetId::from("tex"),
            state: AssetState::Loading,
            operation: "unload",
        };
        assert_eq!(err.to_string(), "Cannot unload asset 'tex' while Loading");

        let err = AssetError::Conflict {
            id: AssetId::from("tex"),
            existing: "memory://a.png".into(),
            requested: "memory://b.png".into(),
        };
        assert!(err.to_string().contains("memory://a.png"));
    }

    #[test]
    fn test_io_source() {
        let err: AssetError = std::io::Error::other("disk on fire").into();
        assert!(err.source().is_some());
        assert!(AssetError::ShuttingDown.source().is_none());
    }
}
