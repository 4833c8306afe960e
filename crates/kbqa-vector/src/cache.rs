use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// LRU map from normalized query to result, tagged with the index generation the
/// result was computed against. Entries from an older generation are misses.
pub struct QueryCache<V> {
    inner: Option<Mutex<LruCache<String, (u64, V)>>>,
}

impl<V: Clone> QueryCache<V> {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self { inner: NonZeroUsize::new(capacity).map(|c| Mutex::new(LruCache::new(c))) }
    }

    pub fn get(&self, key: &str, generation: u64) -> Option<V> {
        let mut cache = self.inner.as_ref()?.lock();
        let hit = cache.get(key).map(|(g, v)| (*g == generation).then(|| v.clone()));
        match hit {
            Some(Some(v)) => Some(v),
            Some(None) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, generation: u64, value: V) {
        if let Some(cache) = &self.inner {
            cache.lock().put(key.into(), (generation, value));
        }
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |c| c.lock().len())
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn capacity(&self) -> usize {
        self.inner.as_ref().map_or(0, |c| c.lock().cap().get())
    }

    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            cache.lock().clear();
        }
    }
}
