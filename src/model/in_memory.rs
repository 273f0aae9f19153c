//! InMemoryDocumentStore - HashMap-backed document store for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Document, DocumentStore, Reference, StoreError, Versioned};

/// Internal stored representation of a document.
struct StoredDocument {
    bytes: Vec<u8>,
    version: u64,
    references: Vec<Reference>,
}

/// In-memory document store backed by a HashMap.
///
/// Storage key is `"COLLECTION:id"`. Clone-friendly via Arc. Reference
/// checks and the write they guard happen under one write lock.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<HashMap<String, StoredDocument>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn make_key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, StoredDocument>>, StoreError> {
        self.storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, StoredDocument>>, StoreError> {
        self.storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn check_references<D: Document>(
        storage: &HashMap<String, StoredDocument>,
        doc: &D,
        references: &[Reference],
    ) -> Result<(), StoreError> {
        match references.iter().find(|r| !storage.contains_key(&r.key())) {
            Some(missing) => Err(StoreError::DanglingReference {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
                reference: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Keys of every stored document that references `target`.
    fn referrers(storage: &HashMap<String, StoredDocument>, target: &Reference) -> Vec<Reference> {
        let mut by: Vec<Reference> = storage
            .iter()
            .filter(|(_, stored)| stored.references.contains(target))
            .filter_map(|(key, _)| {
                key.split_once(':')
                    .map(|(collection, id)| Reference::new(collection, id))
            })
            .collect();
        by.sort_by(|a, b| a.key().cmp(&b.key()));
        by
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get<D: Document>(&self, id: &str) -> Result<Option<Versioned<D>>, StoreError> {
        let key = Self::make_key(D::COLLECTION, id);
        let storage = self.read()?;

        match storage.get(&key) {
            Some(stored) => {
                let data: D = serde_json::from_slice(&stored.bytes)?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn find<D: Document>(
        &self,
        predicate: &dyn Fn(&D) -> bool,
    ) -> Result<Vec<Versioned<D>>, StoreError> {
        let storage = self.read()?;

        let prefix = format!("{}:", D::COLLECTION);
        let mut results = Vec::new();

        for (key, stored) in storage.iter() {
            if key.starts_with(&prefix) {
                let data: D = serde_json::from_slice(&stored.bytes)?;
                if predicate(&data) {
                    results.push(Versioned {
                        data,
                        version: stored.version,
                    });
                }
            }
        }

        Ok(results)
    }

    fn insert<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError> {
        let key = Self::make_key(D::COLLECTION, doc.id());
        let bytes = serde_json::to_vec(doc)?;
        let references = doc.references();

        let mut storage = self.write()?;

        if let Some(existing) = storage.get(&key) {
            return Err(StoreError::ConcurrencyConflict {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
                expected: 0,
                actual: existing.version,
            });
        }

        Self::check_references(&storage, doc, &references)?;

        storage.insert(
            key,
            StoredDocument {
                bytes,
                version: 1,
                references,
            },
        );

        Ok(Versioned {
            data: doc.clone(),
            version: 1,
        })
    }

    fn update<D: Document>(
        &self,
        doc: &D,
        expected_version: u64,
    ) -> Result<Versioned<D>, StoreError> {
        let key = Self::make_key(D::COLLECTION, doc.id());
        let bytes = serde_json::to_vec(doc)?;
        let references = doc.references();

        let mut storage = self.write()?;

        let actual_version = storage
            .get(&key)
            .map(|s| s.version)
            .ok_or_else(|| StoreError::NotFound {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
            })?;

        if actual_version != expected_version {
            return Err(StoreError::ConcurrencyConflict {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
                expected: expected_version,
                actual: actual_version,
            });
        }

        Self::check_references(&storage, doc, &references)?;

        let new_version = actual_version + 1;
        storage.insert(
            key,
            StoredDocument {
                bytes,
                version: new_version,
                references,
            },
        );

        Ok(Versioned {
            data: doc.clone(),
            version: new_version,
        })
    }

    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        let key = Self::make_key(D::COLLECTION, id);
        let mut storage = self.write()?;

        Ok(storage.remove(&key).is_some())
    }

    fn delete_unreferenced<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        let target = Reference::new(D::COLLECTION, id);
        let mut storage = self.write()?;

        if !storage.contains_key(&target.key()) {
            return Ok(false);
        }

        let by = Self::referrers(&storage, &target);
        if !by.is_empty() {
            return Err(StoreError::Referenced {
                collection: D::COLLECTION.to_string(),
                id: id.to_string(),
                by,
            });
        }

        Ok(storage.remove(&target.key()).is_some())
    }
}
