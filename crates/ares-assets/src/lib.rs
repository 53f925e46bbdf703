//! Ares Assets
//!
//! Staged, asynchronously loaded assets whose lifecycle is reported through
//! `ares-events`.
//!
//! An asset is first *staged* under an id with an [`AssetSource`], then
//! *loaded* on a background [`TaskPool`](ares_core::TaskPool). Each step
//! emits an asset event (`AssetStaged`, `AssetLoading`, `AssetLoaded` or
//! `AssetFailed`, `AssetUnloaded`, `AssetUnstaged`, `AssetUpdate`) to the
//! manager's listeners.

pub mod config;
pub mod error;
pub mod io;
pub mod loader;
pub mod manager;
pub mod record;
pub mod source;
pub mod state;

pub use config::AssetManagerConfig;
pub use error::{AssetError, AssetResult};
pub use io::{BytesReader, FileReader, MemoryReader};
pub use loader::{AssetLoader, BytesLoader, ErasedAssetLoader, LoadContext, LoaderRegistry, TextLoader};
pub use manager::{AssetFilter, AssetManager};
pub use record::AssetRecord;
pub use source::AssetSource;
pub use state::AssetState;

/// A type that can be stored in the asset manager.
pub trait Asset: Send + Sync + 'static {
    /// Name used in events, records and errors.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl Asset for String {
    fn type_name() -> &'static str {
        "String"
    }
}

impl Asset for Vec<u8> {
    fn type_name() -> &'static str {
        "Vec<u8>"
    }
}

pub mod prelude {
    pub use crate::{
        Asset, AssetError, AssetFilter, AssetLoader, AssetManager, AssetResult, AssetSource,
        AssetState, LoadContext,
    };
}
