//! Bounded caches for the on-demand views
//!
//! Each entry remembers the generation of the request that produced it,
//! so a late response can tell whether the cache holds something newer.
//! Clearing sets a floor: responses to requests started before the clear
//! are not stored.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Debug)]
struct Cached<V> {
    generation: u64,
    value: Arc<V>,
}

/// LRU map of view results tagged with their request generation
#[derive(Debug)]
pub struct ViewCache<K: Hash + Eq, V> {
    entries: LruCache<K, Cached<V>>,
    floor: u64,
}

impl<K: Hash + Eq, V> ViewCache<K, V> {
    /// A capacity of 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            floor: 0,
        }
    }

    /// Store `value` unless the request predates the last clear or an
    /// equal or newer value is already cached
    pub fn insert(&mut self, key: K, generation: u64, value: Arc<V>) {
        if generation < self.floor {
            return;
        }
        if let Some(existing) = self.entries.peek(&key) {
            if existing.generation >= generation {
                return;
            }
        }
        self.entries.put(key, Cached { generation, value });
    }

    /// Cached value produced by a request newer than `generation`
    pub fn newer_than(&mut self, key: &K, generation: u64) -> Option<Arc<V>> {
        self.entries
            .get(key)
            .filter(|cached| cached.generation > generation)
            .map(|cached| Arc::clone(&cached.value))
    }

    /// Drop everything and refuse responses to requests older than
    /// `generation`
    pub fn clear_before(&mut self, generation: u64) {
        self.entries.clear();
        self.floor = self.floor.max(generation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_bounds_entries() {
        let mut cache = ViewCache::new(3);
        for (i, key) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
            cache.insert(key, i as u64 + 1, Arc::new(i));
        }

        assert_eq!(cache.len(), 3);
        assert!(cache.newer_than(&"a", 0).is_none());
        assert_eq!(cache.newer_than(&"e", 0).as_deref(), Some(&4));
    }

    #[test]
    fn test_newer_than_compares_generations() {
        let mut cache = ViewCache::new(4);
        cache.insert("FR", 5, Arc::new("v5"));

        assert_eq!(cache.newer_than(&"FR", 4).as_deref(), Some(&"v5"));
        assert!(cache.newer_than(&"FR", 5).is_none());
        assert!(cache.newer_than(&"FR", 7).is_none());
    }

    #[test]
    fn test_older_insert_does_not_replace() {
        let mut cache = ViewCache::new(4);
        cache.insert("FR", 5, Arc::new("v5"));
        cache.insert("FR", 3, Arc::new("v3"));

        assert_eq!(cache.newer_than(&"FR", 0).as_deref(), Some(&"v5"));
    }

    #[test]
    fn test_clear_sets_floor() {
        let mut cache = ViewCache::new(4);
        cache.insert("FR", 2, Arc::new("old"));
        cache.clear_before(10);
        assert!(cache.is_empty());

        cache.insert("FR", 9, Arc::new("late"));
        assert!(cache.is_empty());

        cache.insert("FR", 11, Arc::new("fresh"));
        assert_eq!(cache.newer_than(&"FR", 0).as_deref(), Some(&"fresh"));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let cache: ViewCache<&str, u8> = ViewCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }
}
