//! In-memory collection implementation.
//!
//! Enforces the same natural-key uniqueness as the database backend, which
//! makes it suitable for unit tests and local runs without PostgreSQL.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::{Collection, Document, StoreError, StoreResult};

struct Stored<D> {
    id: u64,
    doc: D,
}

struct MemoryData<D> {
    documents: HashMap<String, Stored<D>>,
    next_id: u64,
    failing_keys: HashSet<String>,
    inserts: usize,
    replaces: usize,
}

/// In-memory collection keyed by [`Document::natural_key`].
pub struct MemoryCollection<D> {
    data: RwLock<MemoryData<D>>,
}

impl<D: Document> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> MemoryCollection<D> {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(MemoryData {
                documents: HashMap::new(),
                next_id: 1,
                failing_keys: HashSet::new(),
                inserts: 0,
                replaces: 0,
            }),
        }
    }

    /// Make every operation on `key` fail with a backend error.
    pub fn fail_on_key(&self, key: impl Into<String>) {
        self.write().failing_keys.insert(key.into());
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored document for `key`.
    pub fn get(&self, key: &str) -> Option<D> {
        self.read().documents.get(key).map(|s| s.doc.clone())
    }

    /// Surrogate id assigned on first insert.
    pub fn id_of(&self, key: &str) -> Option<u64> {
        self.read().documents.get(key).map(|s| s.id)
    }

    /// Successful insert and replace calls so far.
    pub fn operation_counts(&self) -> (usize, usize) {
        let data = self.read();
        (data.inserts, data.replaces)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryData<D>> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryData<D>> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_failure(data: &MemoryData<D>, key: &str) -> StoreResult<()> {
        if data.failing_keys.contains(key) {
            return Err(StoreError::Backend(format!(
                "{}: simulated failure for '{}'",
                D::COLLECTION,
                key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<D: Document> Collection<D> for MemoryCollection<D> {
    async fn insert_one(&self, doc: &D) -> StoreResult<()> {
        let key = doc.natural_key();
        let mut data = self.write();
        Self::check_failure(&data, key)?;

        if data.documents.contains_key(key) {
            return Err(StoreError::DuplicateKey {
                collection: D::COLLECTION,
                key: key.to_string(),
            });
        }

        let id = data.next_id;
        data.next_id += 1;
        data.documents.insert(key.to_string(), Stored { id, doc: doc.clone() });
        data.inserts += 1;
        Ok(())
    }

    async fn find_one_and_replace(&self, key: &str, doc: &D) -> StoreResult<()> {
        let mut data = self.write();
        Self::check_failure(&data, key)?;

        match data.documents.get_mut(key) {
            Some(stored) => stored.doc = doc.clone(),
            None => {
                return Err(StoreError::NotFound {
                    collection: D::COLLECTION,
                    key: key.to_string(),
                })
            }
        }
        data.replaces += 1;
        Ok(())
    }

    async fn find_one(&self, key: &str) -> StoreResult<Option<D>> {
        let data = self.read();
        Self::check_failure(&data, key)?;
        Ok(data.documents.get(key).map(|s| s.doc.clone()))
    }
}
