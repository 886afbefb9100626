//! Per-server, read-mostly caches for the reserved-word table and the
//! introspected schema (concurrency model §5): readers clone a short-lived
//! `Arc` under a read lock; a DDL execution or first-time load swaps the
//! whole `Arc` under a write lock, so readers never observe a partial
//! snapshot.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use sqlprep_schema::{Schema, ServerKey};

struct Slot<T>(RwLock<Arc<T>>);

impl<T> Slot<T> {
    fn new(value: Arc<T>) -> Slot<T> {
        Slot(RwLock::new(value))
    }

    fn get(&self) -> Arc<T> {
        self.0.read().expect("schema cache lock poisoned").clone()
    }

    fn install(&self, value: Arc<T>) {
        *self.0.write().expect("schema cache lock poisoned") = value;
    }
}

/// `DashMap<ServerKey, Arc<Schema>>`, guarded per-key so concurrent reads
/// for the same server never block reads for a different one.
#[derive(Default)]
pub struct SchemaCache {
    slots: DashMap<ServerKey, Slot<Schema>>,
}

impl SchemaCache {
    pub fn new() -> SchemaCache {
        SchemaCache { slots: DashMap::new() }
    }

    pub fn get(&self, key: &ServerKey) -> Option<Arc<Schema>> {
        self.slots.get(key).map(|slot| slot.get())
    }

    /// Atomically replaces `key`'s snapshot, installing it fresh if this
    /// is the first load for that server.
    pub fn install(&self, key: ServerKey, schema: Arc<Schema>) {
        match self.slots.get(&key) {
            Some(slot) => slot.install(schema),
            None => {
                self.slots.insert(key, Slot::new(schema));
            }
        }
    }

    /// Invalidates `key`'s cached snapshot; the next query for that
    /// server observes a miss and must re-introspect.
    pub fn invalidate(&self, key: &ServerKey) {
        self.slots.remove(key);
    }
}

/// Same shape as [`SchemaCache`] for the reserved-word table, keyed by
/// server rather than process-wide, since different engines/versions can
/// disagree on which identifiers are reserved.
#[derive(Default)]
pub struct ReservedWordCache {
    slots: DashMap<ServerKey, Slot<HashSet<String>>>,
}

impl ReservedWordCache {
    pub fn new() -> ReservedWordCache {
        ReservedWordCache { slots: DashMap::new() }
    }

    pub fn get(&self, key: &ServerKey) -> Option<Arc<HashSet<String>>> {
        self.slots.get(key).map(|slot| slot.get())
    }

    pub fn install(&self, key: ServerKey, words: Arc<HashSet<String>>) {
        match self.slots.get(&key) {
            Some(slot) => slot.install(words),
            None => {
                self.slots.insert(key, Slot::new(words));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprep_quote::Engine;

    #[test]
    fn install_then_invalidate_clears_the_snapshot() {
        let cache = SchemaCache::new();
        let key: ServerKey = ("db.internal".to_string(), 3306);
        assert!(cache.get(&key).is_none());
        cache.install(key.clone(), Arc::new(Schema::new(Engine::MySql)));
        assert!(cache.get(&key).is_some());
        cache.invalidate(&key);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn second_install_replaces_rather_than_duplicates() {
        let cache = SchemaCache::new();
        let key: ServerKey = ("db.internal".to_string(), 3306);
        cache.install(key.clone(), Arc::new(Schema::new(Engine::MySql)));
        let mut updated = Schema::new(Engine::MySql);
        updated.charset = Some("utf8mb4".to_string());
        cache.install(key.clone(), Arc::new(updated));
        assert_eq!(cache.get(&key).unwrap().charset.as_deref(), Some("utf8mb4"));
    }
}
