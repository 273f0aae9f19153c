//! DocumentStore - Abstract collection storage for documents.

use super::{Document, StoreError, Versioned};

/// Abstract collection storage for documents.
///
/// Backends enforce references: `insert`/`update` refuse documents whose
/// references do not resolve, and `delete_unreferenced` refuses to remove a
/// document that something still points at. Both checks happen atomically
/// with the write.
pub trait DocumentStore: Send + Sync {
    /// Get a document by ID. Returns None if not found.
    fn get<D: Document>(&self, id: &str) -> Result<Option<Versioned<D>>, StoreError>;

    /// Find documents matching a predicate.
    fn find<D: Document>(
        &self,
        predicate: &dyn Fn(&D) -> bool,
    ) -> Result<Vec<Versioned<D>>, StoreError>;

    /// Count documents matching a predicate.
    fn count<D: Document>(&self, predicate: &dyn Fn(&D) -> bool) -> Result<usize, StoreError> {
        Ok(self.find(predicate)?.len())
    }

    /// Insert a new document. Fails if it already exists or a reference dangles.
    fn insert<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError>;

    /// Replace an existing document with optimistic concurrency control.
    fn update<D: Document>(&self, doc: &D, expected_version: u64)
        -> Result<Versioned<D>, StoreError>;

    /// Delete a document by ID regardless of incoming references.
    /// Returns true if it existed.
    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError>;

    /// Delete a document only if no stored document references it.
    ///
    /// Returns `Ok(false)` if the document did not exist and
    /// `StoreError::Referenced` if something still points at it.
    fn delete_unreferenced<D: Document>(&self, id: &str) -> Result<bool, StoreError>;
}
