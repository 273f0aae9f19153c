//! Document store adapter - collection-oriented CRUD over typed documents.
//!
//! Documents are the persisted shape of catalog entities. Each document type
//! names its collection and declares which other documents it references, so
//! a store can refuse writes that would dangle and deletes that would orphan.
//!
//! ## Example
//!
//! ```ignore
//! use shop_catalog::{CollectionsExt, Document, InMemoryDocumentStore};
//!
//! #[derive(Serialize, Deserialize, Clone, Document)]
//! #[document(collection = "colors")]
//! struct Color {
//!     pub id: String,
//!     pub title: String,
//! }
//!
//! let store = InMemoryDocumentStore::new();
//! store.collection::<Color>().insert(&color)?;
//! let loaded = store.collection::<Color>().get("c-1")?;
//! ```

mod collection;
mod in_memory;
mod store;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Trait for types that can be stored as documents.
///
/// Usually implemented with `#[derive(Document)]`.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this document type (e.g. "items", "colors").
    const COLLECTION: &'static str;

    /// Returns the unique identifier for this document.
    fn id(&self) -> &str;

    /// Documents in other collections this one points at.
    fn references(&self) -> Vec<Reference>;
}

/// A pointer from one document to another, by collection and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub collection: String,
    pub id: String,
}

impl Reference {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Storage key shared by every backend: `"collection:id"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.collection, self.id)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.collection, self.id)
    }
}

/// Field types that can hold a reference (used by the derive macro).
pub trait ReferenceField {
    fn push_references(&self, collection: &str, out: &mut Vec<Reference>);
}

impl ReferenceField for String {
    fn push_references(&self, collection: &str, out: &mut Vec<Reference>) {
        out.push(Reference::new(collection, self.as_str()));
    }
}

impl ReferenceField for Option<String> {
    fn push_references(&self, collection: &str, out: &mut Vec<Reference>) {
        if let Some(id) = self {
            out.push(Reference::new(collection, id.as_str()));
        }
    }
}

/// A versioned wrapper around document data for optimistic concurrency control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency conflict.
    ConcurrencyConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// The document points at another document that does not exist.
    DanglingReference {
        collection: String,
        id: String,
        reference: Reference,
    },
    /// The document cannot be deleted while other documents point at it.
    Referenced {
        collection: String,
        id: String,
        by: Vec<Reference>,
    },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
    /// Document not found.
    NotFound { collection: String, id: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ConcurrencyConflict {
                collection,
                id,
                expected,
                actual,
            } => write!(
                f,
                "concurrency conflict on {}:{} (expected version {}, actual {})",
                collection, id, expected, actual
            ),
            StoreError::DanglingReference {
                collection,
                id,
                reference,
            } => write!(
                f,
                "{}:{} references missing document {}",
                collection, id, reference
            ),
            StoreError::Referenced { collection, id, by } => write!(
                f,
                "{}:{} is still referenced by {} document(s)",
                collection,
                id,
                by.len()
            ),
            StoreError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            StoreError::Storage(msg) => write!(f, "document storage error: {}", msg),
            StoreError::NotFound { collection, id } => {
                write!(f, "document not found: {}:{}", collection, id)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

pub use collection::{Collection, CollectionsExt};
pub use in_memory::InMemoryDocumentStore;
pub use store::DocumentStore;
