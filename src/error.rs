use std::error::Error;
use std::fmt;

use crate::images::FileError;
use crate::integrity::{Dependent, EntityRef};
use crate::model::StoreError;
use crate::validation::ValidationErrors;

/// Error type for catalog operations.
#[derive(Debug)]
pub enum CatalogError {
    /// Input failed field constraints. Nothing was written.
    Validation(ValidationErrors),
    /// The referenced entity does not exist.
    NotFound { collection: &'static str, id: String },
    /// Delete refused because other entities still reference the target.
    DeleteBlocked {
        entity: EntityRef,
        dependents: Vec<Dependent>,
    },
    /// Document store failure.
    Store(StoreError),
    /// Image file operation failure.
    File(FileError),
}

impl CatalogError {
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::Validation(_) => 422,
            CatalogError::NotFound { .. } => 404,
            CatalogError::DeleteBlocked { .. } => 409,
            CatalogError::Store(StoreError::ConcurrencyConflict { .. }) => 409,
            CatalogError::Store(StoreError::Referenced { .. }) => 409,
            CatalogError::Store(StoreError::NotFound { .. }) => 404,
            CatalogError::Store(_) => 500,
            CatalogError::File(_) => 500,
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Validation(errors) => write!(f, "{}", errors),
            CatalogError::NotFound { collection, id } => {
                write!(f, "not found: {}:{}", collection, id)
            }
            CatalogError::DeleteBlocked { entity, dependents } => write!(
                f,
                "cannot delete {}: {} dependent(s) still reference it",
                entity,
                dependents.len()
            ),
            CatalogError::Store(e) => write!(f, "store error: {}", e),
            CatalogError::File(e) => write!(f, "file error: {}", e),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Validation(e) => Some(e),
            CatalogError::Store(e) => Some(e),
            CatalogError::File(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(err: ValidationErrors) -> Self {
        CatalogError::Validation(err)
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::Store(err)
    }
}

impl From<FileError> for CatalogError {
    fn from(err: FileError) -> Self {
        CatalogError::File(err)
    }
}
