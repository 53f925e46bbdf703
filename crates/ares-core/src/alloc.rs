//! Hash collections used throughout Ares.
//!
//! Registries keyed by event type, listener id or asset id use AHash,
//! which is considerably faster than SipHash for short keys.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert("texture", 1u32);
        assert_eq!(map.get("texture"), Some(&1));
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        set.insert(42);
        assert!(set.contains(&42));
    }
}
