//! the key-value store contract the rest of the server depends on, plus an
//! in-process reference implementation behind a lock.
//!
//! A real deployment would swap in a networked backend; the trait boundary
//! is where that implementation plugs in without touching call sites.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::GameError;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, GameError>;
    async fn set(&self, key: &str, value: Bytes) -> Result<(), GameError>;
    async fn hget(&self, key: &str, field: &str) -> Result<Option<Bytes>, GameError>;
    async fn hset(&self, key: &str, field: &str, value: Bytes) -> Result<(), GameError>;
    async fn hdel(&self, key: &str, field: &str) -> Result<(), GameError>;
    async fn incr(&self, key: &str) -> Result<i64, GameError>;
    async fn lpush(&self, key: &str, value: Bytes) -> Result<(), GameError>;
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Bytes>, GameError>;
}

#[derive(Default)]
struct Tables {
    strings: HashMap<String, Bytes>,
    hashes: HashMap<String, HashMap<String, Bytes>>,
    counters: HashMap<String, i64>,
    lists: HashMap<String, Vec<Bytes>>,
}

/// reference `Store`: a single lock guarding an in-process map, adequate for
/// a single-process server and for tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> GameError {
    GameError::StoreFailure("lock poisoned".into())
}

/// resolve a negative or out-of-range list index the way a real list store
/// would (negative counts from the end, clamped to bounds).
fn resolve_range(len: usize, start: isize, stop: isize) -> (usize, usize) {
    let norm = |i: isize| -> isize {
        if i < 0 {
            (len as isize + i).max(0)
        } else {
            i
        }
    };
    let start = norm(start).min(len as isize) as usize;
    let stop = norm(stop).min(len as isize - 1).max(-1);
    if stop < 0 || start as isize > stop {
        (0, 0)
    } else {
        (start, stop as usize + 1)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, GameError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.strings.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), GameError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.strings.insert(key.to_string(), value);
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<Bytes>, GameError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.hashes.get(key).and_then(|h| h.get(field)).cloned())
    }

    async fn hset(&self, key: &str, field: &str, value: Bytes) -> Result<(), GameError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<(), GameError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        if let Some(hash) = tables.hashes.get_mut(key) {
            hash.remove(field);
        }
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, GameError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let counter = tables.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn lpush(&self, key: &str, value: Bytes) -> Result<(), GameError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.lists.entry(key.to_string()).or_default().insert(0, value);
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Bytes>, GameError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let list = match tables.lists.get(key) {
            Some(list) => list,
            None => return Ok(Vec::new()),
        };
        let (lo, hi) = resolve_range(list.len(), start, stop);
        Ok(list[lo..hi].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = InMemoryStore::new();
        store.set("k", Bytes::from_static(b"v")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));
    }

    #[tokio::test]
    async fn incr_starts_at_one_and_is_monotone() {
        let store = InMemoryStore::new();
        assert_eq!(store.incr("ctr").await.unwrap(), 1);
        assert_eq!(store.incr("ctr").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn lpush_is_newest_first() {
        let store = InMemoryStore::new();
        store.lpush("l", Bytes::from_static(b"a")).await.unwrap();
        store.lpush("l", Bytes::from_static(b"b")).await.unwrap();
        let all = store.lrange("l", 0, -1).await.unwrap();
        assert_eq!(all, vec![Bytes::from_static(b"b"), Bytes::from_static(b"a")]);
    }

    #[tokio::test]
    async fn hash_fields_are_independent() {
        let store = InMemoryStore::new();
        store.hset("h", "id", Bytes::from_static(b"1")).await.unwrap();
        store.hset("h", "name", Bytes::from_static(b"alice")).await.unwrap();
        assert_eq!(store.hget("h", "id").await.unwrap(), Some(Bytes::from_static(b"1")));
        store.hdel("h", "id").await.unwrap();
        assert_eq!(store.hget("h", "id").await.unwrap(), None);
        assert_eq!(store.hget("h", "name").await.unwrap(), Some(Bytes::from_static(b"alice")));
    }
}
