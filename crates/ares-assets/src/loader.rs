//! Asset loader traits and infrastructure.

use std::any::{Any, TypeId};
use std::sync::Arc;

use ares_core::alloc::HashMap;
use ares_events::AssetData;

use crate::Asset;
use crate::error::{AssetError, AssetResult};
use crate::source::AssetSource;

/// Context provided to asset loaders during loading.
pub struct LoadContext<'a> {
    /// The source of the asset being loaded.
    pub source: &'a AssetSource,
    /// The raw bytes of the asset.
    pub bytes: &'a [u8],
    /// File extension (without the dot), if available.
    pub extension: Option<&'a str>,
}

impl<'a> LoadContext<'a> {
    pub fn new(source: &'a AssetSource, bytes: &'a [u8], extension: Option<&'a str>) -> Self {
        Self {
            source,
            bytes,
            extension,
        }
    }

    /// Shorthand for a [`AssetError::LoaderError`] about this source.
    pub fn error(&self, message: impl Into<String>) -> AssetError {
        AssetError::loader(self.source.display_path(), message)
    }
}

/// Default priority for loaders.
pub const DEFAULT_LOADER_PRIORITY: i32 = 0;

/// Decodes bytes into one asset type.
///
/// Loaders run on task pool threads; a slow loader delays only its own asset.
///
/// # Example
///
/// ```
/// use ares_assets::{Asset, AssetLoader, AssetResult, LoadContext};
///
/// struct Shader(String);
/// impl Asset for Shader {}
///
/// struct ShaderLoader;
///
/// impl AssetLoader for ShaderLoader {
///     type Asset = Shader;
///
///     fn extensions(&self) -> &[&str] {
///         &["wgsl"]
///     }
///
///     fn load(&self, ctx: LoadContext<'_>) -> AssetResult<Shader> {
///         let text = std::str::from_utf8(ctx.bytes).map_err(|e| ctx.error(e.to_string()))?;
///         Ok(Shader(text.to_owned()))
///     }
/// }
/// ```
pub trait AssetLoader: Send + Sync + 'static {
    /// The asset type this loader produces.
    type Asset: Asset;

    /// The file extensions this loader handles (without dots).
    fn extensions(&self) -> &[&str];

    fn load(&self, ctx: LoadContext<'_>) -> AssetResult<Self::Asset>;

    /// Higher priority loaders win when several handle the same type and
    /// extension.
    fn priority(&self) -> i32 {
        DEFAULT_LOADER_PRIORITY
    }
}

/// Type-erased asset loader for dynamic dispatch.
pub trait ErasedAssetLoader: Send + Sync {
    fn asset_type_id(&self) -> TypeId;

    fn asset_type_name(&self) -> &'static str;

    fn extensions(&self) -> &[&str];

    fn priority(&self) -> i32;

    fn load_erased(&self, ctx: LoadContext<'_>) -> AssetResult<Box<dyn Any + Send + Sync>>;
}

impl<L: AssetLoader> ErasedAssetLoader for L {
    fn asset_type_id(&self) -> TypeId {
        TypeId::of::<L::Asset>()
    }

    fn asset_type_name(&self) -> &'static str {
        <L::Asset as Asset>::type_name()
    }

    fn extensions(&self) -> &[&str] {
        AssetLoader::extensions(self)
    }

    fn priority(&self) -> i32 {
        AssetLoader::priority(self)
    }

    fn load_erased(&self, ctx: LoadContext<'_>) -> AssetResult<Box<dyn Any + Send + Sync>> {
        let asset = self.load(ctx)?;
        Ok(Box::new(asset))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LoaderKey {
    type_id: TypeId,
    extension: String,
}

#[derive(Clone)]
struct LoaderEntry {
    loader: Arc<dyn ErasedAssetLoader>,
    priority: i32,
}

fn insert_by_priority(entries: &mut Vec<LoaderEntry>, entry: LoaderEntry) {
    // Stable: equal priorities keep registration order.
    let index = entries.partition_point(|e| e.priority >= entry.priority);
    entries.insert(index, entry);
}

/// Registry of asset loaders, indexed by asset type and extension.
///
/// A source with an extension uses the highest priority loader for
/// `(type, extension)`. A source without one falls back to the highest
/// priority loader for the type.
#[derive(Default)]
pub struct LoaderRegistry {
    by_type_and_ext: HashMap<LoaderKey, Vec<LoaderEntry>>,
    by_type: HashMap<TypeId, Vec<LoaderEntry>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with [`TextLoader`] and [`BytesLoader`] installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TextLoader);
        registry.register(BytesLoader);
        registry
    }

    pub fn register<L: AssetLoader>(&mut self, loader: L) {
        self.register_erased(Arc::new(loader));
    }

    fn register_erased(&mut self, loader: Arc<dyn ErasedAssetLoader>) {
        let type_id = loader.asset_type_id();
        let entry = LoaderEntry {
            loader: loader.clone(),
            priority: loader.priority(),
        };

        for ext in loader.extensions() {
            let key = LoaderKey {
                type_id,
                extension: ext.to_lowercase(),
            };
            insert_by_priority(self.by_type_and_ext.entry(key).or_default(), entry.clone());
        }
        insert_by_priority(self.by_type.entry(type_id).or_default(), entry);

        tracing::debug!(
            "Registered loader for {} ({})",
            loader.asset_type_name(),
            loader.extensions().join(", ")
        );
    }

    /// Pick the loader for an asset of `type_id` read from a source with
    /// `extension`.
    pub fn find(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        extension: Option<&str>,
    ) -> AssetResult<&Arc<dyn ErasedAssetLoader>> {
        if let Some(ext) = extension {
            let key = LoaderKey {
                type_id,
                extension: ext.to_lowercase(),
            };
            if let Some(entry) = self.by_type_and_ext.get(&key).and_then(|e| e.first()) {
                return Ok(&entry.loader);
            }
        }

        let best = self.by_type.get(&type_id).and_then(|e| e.first());
        match (best, extension) {
            (None, _) => Err(AssetError::NoLoader { type_name }),
            (Some(entry), None) => Ok(&entry.loader),
            (Some(_), Some(ext)) => Err(AssetError::NoLoaderForExtension {
                extension: ext.to_string(),
            }),
        }
    }

    pub fn has_loader_for<T: Asset>(&self, extension: &str) -> bool {
        let key = LoaderKey {
            type_id: TypeId::of::<T>(),
            extension: extension.to_lowercase(),
        };
        self.by_type_and_ext.contains_key(&key)
    }

    pub fn has_loader_for_type<T: Asset>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Decode `bytes` into an asset of the given type, type-erased.
    pub fn load_erased(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        source: &AssetSource,
        bytes: &[u8],
    ) -> AssetResult<AssetData> {
        let extension = source.extension();
        let loader = self.find(type_id, type_name, extension)?;
        let boxed = loader.load_erased(LoadContext::new(source, bytes, extension))?;
        Ok(AssetData::from_boxed(boxed, type_name))
    }

    pub fn load_typed<T: Asset>(&self, source: &AssetSource, bytes: &[u8]) -> AssetResult<T> {
        let extension = source.extension();
        let loader = self.find(TypeId::of::<T>(), T::type_name(), extension)?;
        let boxed = loader.load_erased(LoadContext::new(source, bytes, extension))?;

        boxed
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| AssetError::TypeMismatch {
                expected: T::type_name(),
                found: loader.asset_type_name(),
            })
    }

    /// List all registered extensions for a type.
    pub fn extensions_for_type<T: Asset>(&self) -> Vec<&str> {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|entries| {
                entries
                    .iter()
                    .flat_map(|e| e.loader.extensions().iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of registered loaders.
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

/// Loads UTF-8 text.
pub struct TextLoader;

impl AssetLoader for TextLoader {
    type Asset = String;

    fn extensions(&self) -> &[&str] {
        &["txt", "text", "md", "markdown"]
    }

    fn load(&self, ctx: LoadContext<'_>) -> AssetResult<Self::Asset> {
        String::from_utf8(ctx.bytes.to_vec()).map_err(|e| ctx.error(format!("Invalid UTF-8: {}", e)))
    }
}

/// Loads raw bytes.
pub struct BytesLoader;

impl AssetLoader for BytesLoader {
    type Asset = Vec<u8>;

    fn extensions(&self) -> &[&str] {
        &["bin", "bytes", "dat"]
    }

    fn load(&self, ctx: LoadContext<'_>) -> AssetResult<Self::Asset> {
        Ok(ctx.bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestData {
        value: i32,
    }

    impl Asset for TestData {
        fn type_name() -> &'static str {
            "TestData"
        }
    }

    struct FixedLoader {
        value: i32,
        priority: i32,
    }

    impl AssetLoader for FixedLoader {
        type Asset = TestData;

        fn extensions(&self) -> &[&str] {
            &["dat"]
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn load(&self, _ctx: LoadContext<'_>) -> AssetResult<Self::Asset> {
            Ok(TestData { value: self.value })
        }
    }

    #[test]
    fn test_text_loader() {
        let source = AssetSource::memory("test.txt");
        let ctx = LoadContext::new(&source, b"Hello, World!", Some("txt"));
        assert_eq!(TextLoader.load(ctx).unwrap(), "Hello, World!");

        let ctx = LoadContext::new(&source, &[0xff, 0xfe], Some("txt"));
        assert!(matches!(TextLoader.load(ctx), Err(AssetError::LoaderError { .. })));
    }

    #[test]
    fn test_registry_by_type_and_extension() {
        let registry = LoaderRegistry::with_defaults();

        assert!(registry.has_loader_for::<String>("txt"));
        assert!(registry.has_loader_for::<String>("TXT"));
        assert!(registry.has_loader_for::<Vec<u8>>("bin"));
        assert!(!registry.has_loader_for::<String>("bin"));
        assert!(registry.has_loader_for_type::<Vec<u8>>());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_priority_wins_in_either_order() {
        for flip in [false, true] {
            let mut registry = LoaderRegistry::new();
            let low = FixedLoader { value: 1, priority: -10 };
            let high = FixedLoader { value: 100, priority: 10 };
            if flip {
                registry.register(high);
                registry.register(low);
            } else {
                registry.register(low);
                registry.register(high);
            }

            let source = AssetSource::memory("test.dat");
            let result: TestData = registry.load_typed(&source, b"").unwrap();
            assert_eq!(result.value, 100);
        }
    }

    #[test]
    fn test_extensionless_source_uses_type_fallback() {
        let registry = LoaderRegistry::with_defaults();
        let source = AssetSource::bytes("blob", vec![7u8]);
        let data = registry
            .load_erased(TypeId::of::<Vec<u8>>(), "Vec<u8>", &source, &[7])
            .unwrap();
        assert_eq!(data.downcast::<Vec<u8>>().as_deref(), Some(&vec![7u8]));
    }

    #[test]
    fn test_missing_loaders() {
        let registry = LoaderRegistry::with_defaults();

        let source = AssetSource::memory("test.txt");
        let result: AssetResult<TestData> = registry.load_typed(&source, b"data");
        assert!(matches!(result, Err(AssetError::NoLoader { type_name: "TestData" })));

        let source = AssetSource::memory("test.png");
        let result: AssetResult<String> = registry.load_typed(&source, b"data");
        assert!(matches!(result, Err(AssetError::NoLoaderForExtension { .. })));
    }
}
