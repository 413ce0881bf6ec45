//! Copy-on-write registry storage.
//!
//! Readers clone the current `Arc` and work on an immutable map; writers take a
//! single mutex, copy the published map, apply their change, and swap the new
//! map in. A reader never sees a half-built map.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub(crate) struct Snapshot<K, V> {
    current: RwLock<Arc<HashMap<K, V>>>,
    writer: Mutex<()>,
}

impl<K, V> Snapshot<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new(initial: HashMap<K, V>) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            writer: Mutex::new(()),
        }
    }

    /// The currently published map.
    pub(crate) fn load(&self) -> Arc<HashMap<K, V>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.load().get(key).cloned()
    }

    /// Apply `f` to a private copy of the map and publish it.
    ///
    /// Writers are serialized; `f` runs while holding the writer lock but not
    /// the read lock, so lookups keep being served from the old snapshot.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = HashMap::clone(&self.load());
        let out = f(&mut next);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        out
    }

    /// Return the cached value for `key`, building and publishing it on a miss.
    ///
    /// `build` runs outside the writer lock; if another thread published the
    /// key first, its value wins and is returned.
    pub(crate) fn get_or_insert_with(&self, key: K, build: impl FnOnce() -> V) -> V {
        if let Some(v) = self.get(&key) {
            return v;
        }
        let built = build();
        self.update(|map| map.entry(key).or_insert(built).clone())
    }
}
