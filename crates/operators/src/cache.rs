//! Get-or-create cache for heavyweight, reusable operator resources.
//!
//! Entries are keyed by a canonical configuration value, created at most once
//! per key on first use, and live for the rest of the process. The cache is
//! shared by all concurrent workflow runs.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

pub struct ResourceCache<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K, V> ResourceCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the resource for `key`, building it with `init` if this is the
    /// first request for that configuration.
    ///
    /// The lock is held while `init` runs, so two callers racing on the same
    /// key never both construct it. A failed `init` caches nothing.
    pub fn get_or_try_init<E>(
        &self,
        key: &K,
        init: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(key) {
            return Ok(Arc::clone(existing));
        }
        debug!(?key, "initialising cached resource");
        let created = Arc::new(init(key)?);
        entries.insert(key.clone(), Arc::clone(&created));
        Ok(created)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for ResourceCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn builds_once_per_key() {
        let cache: ResourceCache<&str, usize> = ResourceCache::new();
        let builds = AtomicUsize::new(0);
        let build = |_: &&str| -> Result<usize, ()> { Ok(builds.fetch_add(1, Ordering::SeqCst)) };

        let a1 = cache.get_or_try_init(&"a", build).unwrap();
        let a2 = cache.get_or_try_init(&"a", build).unwrap();
        let b = cache.get_or_try_init(&"b", build).unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert_eq!(*b, 1);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_init_is_not_cached() {
        let cache: ResourceCache<u8, u8> = ResourceCache::new();
        assert!(cache.get_or_try_init(&1, |_| Err::<u8, _>("boom")).is_err());
        assert!(cache.is_empty());
        assert_eq!(*cache.get_or_try_init(&1, |_| Ok::<_, ()>(9)).unwrap(), 9);
    }

    #[test]
    fn concurrent_callers_share_one_instance() {
        let cache: Arc<ResourceCache<u32, u32>> = Arc::new(ResourceCache::new());
        let builds = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let builds = Arc::clone(&builds);
                thread::spawn(move || {
                    cache
                        .get_or_try_init(&7, |k| {
                            builds.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(*k * 2)
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(*handle.join().unwrap(), 14);
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }
}
