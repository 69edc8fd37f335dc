//! LRU cache of ranked query results
//!
//! Interactive typing revisits the same queries constantly (backspace, retyping a
//! character), so the engine remembers the full ranked list for recent queries.
//!
//! # Cache Invalidation Strategy
//!
//! - **Key**: `(generation, Query)`; a rebuild bumps the tree generation, so entries for
//!   an older tree can never be returned for a newer one
//! - **Eviction**: LRU when capacity is reached
//! - **Capacity 0** disables caching entirely
//!
//! The `lru::LruCache` is wrapped in a `parking_lot::RwLock`; lookups take the write
//! lock because they update recency.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::RwLock;

use crate::query::Query;
use crate::ranker::Hit;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    generation: u64,
    query: Query,
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub current_size: usize,
    pub max_capacity: usize,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
pub struct QueryCache {
    cache: Option<RwLock<LruCache<CacheKey, Arc<Vec<Hit>>>>>,
    stats: RwLock<CacheStats>,
}

impl QueryCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|cap| RwLock::new(LruCache::new(cap))),
            stats: RwLock::new(CacheStats {
                max_capacity: capacity,
                ..Default::default()
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn get(&self, generation: u64, query: &Query) -> Option<Arc<Vec<Hit>>> {
        let cache = self.cache.as_ref()?;
        let key = CacheKey {
            generation,
            query: query.clone(),
        };

        let found = cache.write().get(&key).cloned();
        let mut stats = self.stats.write();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    pub fn insert(&self, generation: u64, query: Query, hits: Arc<Vec<Hit>>) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        let mut cache = cache.write();
        let mut stats = self.stats.write();
        // `push` also returns the old value when the key was already present
        if let Some((evicted, _)) = cache.push(CacheKey { generation, query: query.clone() }, hits) {
            if evicted.generation != generation || evicted.query != query {
                stats.evictions += 1;
            }
        }
        stats.current_size = cache.len();
    }

    pub fn clear(&self) {
        if let Some(cache) = self.cache.as_ref() {
            cache.write().clear();
        }
        self.stats.write().current_size = 0;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse;
    use crate::tree::EntityKind;

    fn hits(paths: &[&str]) -> Arc<Vec<Hit>> {
        Arc::new(
            paths
                .iter()
                .map(|p| Hit {
                    name: p.rsplit('.').next().unwrap_or(p).to_string(),
                    full_path: p.to_string(),
                    kind: EntityKind::Unknown,
                    metadata: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = QueryCache::with_capacity(4);
        let query = parse("os.pa");

        assert!(cache.get(0, &query).is_none());
        cache.insert(0, query.clone(), hits(&["os.path"]));
        let cached = cache.get(0, &query).expect("cached");
        assert_eq!(cached[0].full_path, "os.path");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.current_size, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_generation_isolates_entries() {
        let cache = QueryCache::with_capacity(4);
        let query = parse("o");
        cache.insert(1, query.clone(), hits(&["os"]));
        assert!(cache.get(2, &query).is_none());
        assert!(cache.get(1, &query).is_some());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = QueryCache::with_capacity(2);
        cache.insert(0, parse("a"), hits(&["a"]));
        cache.insert(0, parse("b"), hits(&["b"]));
        // Touch "a" so "b" is least recently used
        assert!(cache.get(0, &parse("a")).is_some());
        cache.insert(0, parse("c"), hits(&["c"]));

        assert!(cache.get(0, &parse("b")).is_none());
        assert!(cache.get(0, &parse("a")).is_some());
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = QueryCache::with_capacity(0);
        assert!(!cache.is_enabled());
        cache.insert(0, parse("a"), hits(&["a"]));
        assert!(cache.get(0, &parse("a")).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 0, "disabled cache records nothing");
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::default();
        cache.insert(0, parse("a"), hits(&["a"]));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().current_size, 0);
    }
}
