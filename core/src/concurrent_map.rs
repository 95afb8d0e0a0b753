//! Sharded map used to accumulate per-document values from many threads.
//!
//! Each shard is an independently locked `BTreeMap`; a key always lives in
//! shard `id mod shard_count`, so writers touching different shards never
//! contend.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::document::DocumentId;

pub struct ConcurrentMap<V> {
    shards: Vec<Mutex<BTreeMap<DocumentId, V>>>,
}

impl<V> ConcurrentMap<V> {
    /// Create a map with `shard_count` shards (at least one).
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    fn shard(&self, id: DocumentId) -> &Mutex<BTreeMap<DocumentId, V>> {
        let index = (id as i64).rem_euclid(self.shards.len() as i64) as usize;
        &self.shards[index]
    }

    /// Run `f` on the value for `id` while holding only that key's shard,
    /// inserting `V::default()` first if the key is absent.
    fn update<F>(&self, id: DocumentId, f: F)
    where
        V: Default,
        F: FnOnce(&mut V),
    {
        let mut shard = self.shard(id).lock();
        f(shard.entry(id).or_default());
    }

    /// Add `delta` to the value for `id`, starting from `V::default()`.
    pub fn add(&self, id: DocumentId, delta: V)
    where
        V: Default + AddAssign,
    {
        self.update(id, |value| *value += delta);
    }

    /// Remove `id` if present. Returns the removed value.
    pub fn remove(&self, id: DocumentId) -> Option<V> {
        self.shard(id).lock().remove(&id)
    }

    /// Merge all shards into one map.
    ///
    /// Shards are locked one at a time, so the result is only a consistent
    /// snapshot once every writer has finished.
    pub fn build_ordinary_map(&self) -> BTreeMap<DocumentId, V>
    where
        V: Clone,
    {
        let mut merged = BTreeMap::new();
        for shard in &self.shards {
            merged.extend(shard.lock().iter().map(|(id, value)| (*id, value.clone())));
        }
        merged
    }

    /// Consume the map and merge all shards into one map.
    pub fn into_ordinary_map(self) -> BTreeMap<DocumentId, V> {
        let mut merged = BTreeMap::new();
        for shard in self.shards {
            merged.extend(shard.into_inner());
        }
        merged
    }
}
