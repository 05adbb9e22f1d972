use std::hash::Hash;

use dashmap::DashMap;

/// Process-lifetime memo for fetched metadata (video details and the like).
///
/// Passed around explicitly rather than living in a global. Last write wins
/// and nothing is evicted; [`MemoCache::clear`] exists for tests and logout.
#[derive(Debug)]
pub struct MemoCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V>,
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let hit = self.entries.get(key).map(|entry| entry.value().clone());
        tracing::trace!(hit = hit.is_some(), "memo cache lookup");
        hit
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Returns the cached value, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.entries.entry(key).or_insert_with(compute).value().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn last_write_wins() {
        let cache = MemoCache::new();
        cache.insert("https://youtu.be/a".to_string(), "first".to_string());
        cache.insert("https://youtu.be/a".to_string(), "second".to_string());
        assert_eq!(cache.get(&"https://youtu.be/a".to_string()), Some("second".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn computes_once_and_clears() {
        let cache: Arc<MemoCache<String, u32>> = Arc::new(MemoCache::new());
        let mut calls = 0;
        let first = cache.get_or_insert_with("k".into(), || {
            calls += 1;
            7
        });
        let second = cache.get_or_insert_with("k".into(), || {
            calls += 1;
            8
        });
        assert_eq!((first, second, calls), (7, 7, 1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
