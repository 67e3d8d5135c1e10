use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::graph::PathMap;
use crate::records::PersonId;

/// Thread-safe LRU cache of per-source path maps
///
/// Holds the BFS result for recently queried (or precomputed) sources so
/// repeated relationship lookups skip the search. Purely an optimization:
/// a miss always falls back to an on-demand search.
pub struct PathCache {
    cache: Mutex<LruCache<PersonId, Arc<PathMap>>>,
}

impl PathCache {
    /// Create a new path cache holding at most `capacity` source maps
    ///
    /// A capacity of 0 is bumped to 1 (LRU cache requires non-zero capacity).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<PersonId, Arc<PathMap>>> {
        // The cache holds no invariants a panicking reader could break.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the cached path map for a source, marking it recently used
    pub fn get(&self, source: &PersonId) -> Option<Arc<PathMap>> {
        self.lock().get(source).cloned()
    }

    /// Whether a source has a cached map, without touching recency
    pub fn contains(&self, source: &PersonId) -> bool {
        self.lock().contains(source)
    }

    /// Store a path map for a source
    pub fn put(&self, source: PersonId, paths: Arc<PathMap>) {
        self.lock().put(source, paths);
    }

    /// Get the current number of cached sources
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of cached sources
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl fmt::Debug for PathCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
