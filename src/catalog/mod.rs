//! Catalog service - every create/read/update/delete the catalog supports.
//!
//! `Catalog<S, F>` owns an explicitly constructed document store and file
//! storage. Each operation is a plain sequence of store calls returning a
//! `Result`; deletes always pass through the integrity rules first, and item
//! writes wrap the document write in the two-phase image executor.
//!
//! ## Example
//!
//! ```ignore
//! use shop_catalog::{Catalog, CategoryForm, InMemoryDocumentStore, LocalFileStorage};
//!
//! let catalog = Catalog::new(InMemoryDocumentStore::new(), LocalFileStorage::new(), "public/images");
//! let toys = catalog.create_category(CategoryForm {
//!     title: "Toys".into(),
//!     description: "Knitted toys".into(),
//! })?;
//! catalog.delete_category(&toys.id)?;
//! ```

mod categories;
mod colors;
mod instances;
mod items;
mod views;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::entities::{Category, Color, InstanceStatus, Item, ItemInstance};
use crate::error::CatalogError;
use crate::events::Action;
use crate::images::{FileStorage, ImageManager, Upload};
use crate::integrity::{can_delete, EntityKind, EntityRef};
use crate::model::{CollectionsExt, Document, DocumentStore, StoreError, Versioned};
use crate::validation::ValidationErrors;

#[cfg(feature = "emitter")]
use crate::events::CatalogEvents;

pub use views::{
    CategoryDetail, ColorDetail, DeletePreview, InstanceFormOptions, InstanceView, ItemDetail,
    ItemFormOptions, ItemSummary, ItemWrite, Summary,
};

/// The catalog: entity operations over a document store and image storage.
pub struct Catalog<S, F> {
    store: S,
    files: F,
    images: ImageManager,
    #[cfg(feature = "emitter")]
    events: CatalogEvents,
}

impl<S: DocumentStore, F: FileStorage> Catalog<S, F> {
    /// Create a catalog. Uploaded images are stored under `image_dir`.
    pub fn new(store: S, files: F, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            files,
            images: ImageManager::new(image_dir),
            #[cfg(feature = "emitter")]
            events: CatalogEvents::new(),
        }
    }

    /// Get a reference to the document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the file storage.
    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn images(&self) -> &ImageManager {
        &self.images
    }

    /// Lifecycle notifications; register listeners with `events().on(...)`.
    #[cfg(feature = "emitter")]
    pub fn events(&self) -> &CatalogEvents {
        &self.events
    }

    /// Home page counters.
    pub fn summary(&self) -> Result<Summary, CatalogError> {
        let instances = self.store.collection::<ItemInstance>();
        Ok(Summary {
            item_count: self.store.collection::<Item>().count(&|_| true)?,
            item_instance_count: instances.count(&|_| true)?,
            item_instance_available_count: instances
                .count(&|instance| instance.status == InstanceStatus::Available)?,
            category_count: self.store.collection::<Category>().count(&|_| true)?,
            color_count: self.store.collection::<Color>().count(&|_| true)?,
        })
    }

    // ------------------------------------------------------------------
    // shared helpers
    // ------------------------------------------------------------------

    fn notify<T: Serialize>(&self, kind: EntityKind, action: Action, payload: &T) {
        #[cfg(feature = "emitter")]
        self.events.emit(kind, action, payload);
        #[cfg(not(feature = "emitter"))]
        let _ = (kind, action, payload);
    }

    /// Load a document or fail with `NotFound`.
    fn require<D: Document>(&self, id: &str) -> Result<Versioned<D>, CatalogError> {
        self.store
            .collection::<D>()
            .get(id)?
            .ok_or_else(|| CatalogError::not_found(D::COLLECTION, id))
    }

    /// All documents of a collection, unwrapped.
    fn all<D: Document>(&self) -> Result<Vec<D>, CatalogError> {
        Ok(self
            .store
            .collection::<D>()
            .all()?
            .into_iter()
            .map(|v| v.data)
            .collect())
    }

    fn by_id<D: Document>(&self) -> Result<HashMap<String, D>, CatalogError> {
        Ok(self
            .all::<D>()?
            .into_iter()
            .map(|doc| (doc.id().to_string(), doc))
            .collect())
    }

    /// Record a violation on `field` unless `id` resolves to a `D`.
    fn check_reference<D: Document>(
        &self,
        errors: &mut ValidationErrors,
        field: &str,
        id: &str,
    ) -> Result<(), CatalogError> {
        if self.store.collection::<D>().get(id)?.is_none() {
            errors.push(field, format!("{} does not exist", field));
        }
        Ok(())
    }

    /// Resolve item and color for each instance.
    fn instance_views(&self, instances: Vec<ItemInstance>) -> Result<Vec<InstanceView>, CatalogError> {
        let items = self.by_id::<Item>()?;
        let colors = self.by_id::<Color>()?;
        Ok(instances
            .into_iter()
            .map(|instance| InstanceView {
                item: items.get(&instance.item).cloned(),
                color: colors.get(&instance.color).cloned(),
                instance,
            })
            .collect())
    }

    /// Build the delete confirmation for `D`.
    fn delete_preview<D: Document>(&self, kind: EntityKind, id: &str) -> Result<DeletePreview<D>, CatalogError> {
        let entity = self.require::<D>(id)?.data;
        let check = can_delete(&self.store, &EntityRef::new(kind, id))?;
        Ok(DeletePreview {
            allowed: check.allowed(),
            entity,
            blocking_dependents: check.blocking_dependents,
        })
    }

    /// Remove the document behind `target` if nothing references it.
    ///
    /// The store re-checks references atomically with the delete; a
    /// dependent created since `can_delete` ran surfaces as `DeleteBlocked`.
    /// If the dependent is already gone again, the delete is retried once.
    fn delete_document<D: Document>(&self, target: &EntityRef) -> Result<(), CatalogError> {
        let mut retried = false;
        loop {
            match self.store.collection::<D>().delete_unreferenced(&target.id) {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    return Err(CatalogError::not_found(D::COLLECTION, target.id.clone()))
                }
                Err(err @ StoreError::Referenced { .. }) => {
                    tracing::warn!(entity = %target, "dependent appeared after the delete check");
                    can_delete(&self.store, target)?.into_result()?;
                    if retried {
                        return Err(err.into());
                    }
                    retried = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Guarded delete for documents without files attached.
    fn delete_guarded<D: Document>(&self, kind: EntityKind, id: &str) -> Result<D, CatalogError> {
        let target = EntityRef::new(kind, id);
        let doc = self.require::<D>(id)?.data;
        can_delete(&self.store, &target)?.into_result()?;
        self.delete_document::<D>(&target)?;
        tracing::info!(entity = %target, "deleted");
        self.notify(kind, Action::Deleted, &doc);
        Ok(doc)
    }

    /// Remove an upload that will not be stored.
    fn discard_upload(&self, upload: &Upload) {
        if !self.files.exists(&upload.temporary_path) {
            return;
        }
        if let Err(err) = self.files.remove(&upload.temporary_path) {
            tracing::warn!(error = %err, "could not discard rejected upload");
        }
    }
}

/// Map a store write failure, turning dangling references into field errors.
fn write_error(err: StoreError) -> CatalogError {
    match err {
        StoreError::DanglingReference { reference, .. } => {
            let field = reference_field(&reference.collection);
            ValidationErrors::single(field, format!("{} does not exist", field)).into()
        }
        other => other.into(),
    }
}

fn reference_field(collection: &str) -> &str {
    if collection == Category::COLLECTION {
        "category"
    } else if collection == Item::COLLECTION {
        "item"
    } else if collection == Color::COLLECTION {
        "color"
    } else {
        collection
    }
}

fn sort_by_title<T>(docs: &mut [T], title: impl Fn(&T) -> &str) {
    docs.sort_by(|a, b| title(a).cmp(title(b)));
}
