//! Collection - Typed accessor for document CRUD operations.

use std::marker::PhantomData;

use super::{Document, DocumentStore, StoreError, Versioned};

/// Typed wrapper for accessing documents of a specific collection.
pub struct Collection<'a, S, D> {
    store: &'a S,
    _marker: PhantomData<D>,
}

impl<'a, S: DocumentStore, D: Document> Collection<'a, S, D> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Get a document by ID.
    pub fn get(&self, id: &str) -> Result<Option<Versioned<D>>, StoreError> {
        self.store.get(id)
    }

    /// All documents in the collection.
    pub fn all(&self) -> Result<Vec<Versioned<D>>, StoreError> {
        self.store.find(&|_: &D| true)
    }

    /// Find documents matching a predicate.
    pub fn find(&self, predicate: &dyn Fn(&D) -> bool) -> Result<Vec<Versioned<D>>, StoreError> {
        self.store.find(predicate)
    }

    /// Count documents matching a predicate.
    pub fn count(&self, predicate: &dyn Fn(&D) -> bool) -> Result<usize, StoreError> {
        self.store.count(predicate)
    }

    /// Insert a new document.
    pub fn insert(&self, doc: &D) -> Result<Versioned<D>, StoreError> {
        self.store.insert(doc)
    }

    /// Replace an existing document with optimistic concurrency.
    pub fn update(&self, doc: &D, expected_version: u64) -> Result<Versioned<D>, StoreError> {
        self.store.update(doc, expected_version)
    }

    /// Delete a document by ID. Returns true if it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete::<D>(id)
    }

    /// Delete a document only if nothing references it.
    pub fn delete_unreferenced(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete_unreferenced::<D>(id)
    }
}

/// Extension trait for typed collection access on any DocumentStore.
pub trait CollectionsExt: DocumentStore + Sized {
    /// Get a typed collection accessor.
    fn collection<D: Document>(&self) -> Collection<'_, Self, D> {
        Collection::new(self)
    }
}

impl<S: DocumentStore> CollectionsExt for S {}
