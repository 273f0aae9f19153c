//! shop_catalog - a catalog of categories, items, colors and item instances.
//!
//! The interesting part is the lifecycle: a Category cannot be deleted while
//! Items reference it, an Item cannot be deleted while ItemInstances
//! reference it, a Color cannot be deleted while ItemInstances use it, and
//! an Item's uploaded image file follows the Item document through create,
//! replace and delete.

// Lets `#[derive(Document)]` expand to `shop_catalog::...` inside this crate too.
extern crate self as shop_catalog;

pub mod catalog;
pub mod entities;
mod error;
pub mod events;
pub mod forms;
pub mod images;
pub mod integrity;
pub mod model;
pub mod seed;
pub mod validation;

#[cfg(feature = "http")]
pub mod config;
#[cfg(feature = "http")]
pub mod http;

pub use catalog::Catalog;
pub use entities::{Category, Color, InstanceStatus, Item, ItemInstance};
pub use error::CatalogError;
pub use forms::{CategoryForm, ColorForm, InstanceForm, ItemForm};
pub use images::{FileError, FileStorage, ImageManager, LocalFileStorage, Upload};
pub use integrity::{can_delete, DeleteCheck, Dependent, EntityKind, EntityRef};
pub use model::{
    Collection, CollectionsExt, Document, DocumentStore, InMemoryDocumentStore, Reference,
    ReferenceField, StoreError, Versioned,
};
pub use validation::{FieldViolation, ValidationErrors};

// Derive macro for `Document` (lives in the macro namespace, next to the trait).
pub use shop_catalog_macros::Document;
