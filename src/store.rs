//! Boundary contracts for the services that surround the pipeline.
//!
//! The application embedding this crate persists thumbnails into a blob
//! store and keeps per-document records in a string key-value store. Those
//! systems are not this crate's concern; only their narrow interfaces are.
//! The in-memory implementations exist for tests and for embedders that
//! have nothing durable to plug in yet.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// A blob-oriented file store. A missing path is `None`, never an error.
pub trait BlobStore: Send + Sync {
    fn read(&self, path: &str) -> Option<Vec<u8>>;
    fn write(&self, path: &str, bytes: &[u8]);
}

/// One record returned by [`KeyValueStore::list`]. `value` is `None` when
/// the listing was requested without values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: Option<String>,
}

/// A string key-value store. Values are opaque strings; callers parse them
/// into structured records themselves.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);

    /// List entries matching `pattern`: a trailing `*` matches by prefix,
    /// anything else matches exactly.
    fn list(&self, pattern: &str, include_values: bool) -> Vec<KvEntry>;
}

fn recover<'a, T>(lock: &'a Mutex<T>) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory [`BlobStore`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        recover(&self.entries).get(path).cloned()
    }

    fn write(&self, path: &str, bytes: &[u8]) {
        recover(&self.entries).insert(path.to_string(), bytes.to_vec());
    }
}

/// In-memory [`KeyValueStore`]. Backed by a `BTreeMap` so listings come out
/// in a stable order.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        recover(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        recover(&self.entries).insert(key.to_string(), value.to_string());
    }

    fn list(&self, pattern: &str, include_values: bool) -> Vec<KvEntry> {
        let entries = recover(&self.entries);
        let matches: Vec<(&String, &String)> = match pattern.strip_suffix('*') {
            Some(prefix) => entries
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .collect(),
            None => entries.iter().filter(|(k, _)| k.as_str() == pattern).collect(),
        };

        matches
            .into_iter()
            .map(|(k, v)| KvEntry {
                key: k.clone(),
                value: include_values.then(|| v.clone()),
            })
            .collect()
    }
}
