use crate::entities::{new_id, Category, Item};
use crate::error::CatalogError;
use crate::events::Action;
use crate::forms::ItemForm;
use crate::images::{prepare, FileStorage, Upload};
use crate::integrity::{can_delete, instances_where, EntityKind, EntityRef};
use crate::model::{CollectionsExt, DocumentStore};
use crate::validation::ValidationErrors;

use super::{
    sort_by_title, write_error, Catalog, DeletePreview, ItemDetail, ItemFormOptions, ItemSummary,
    ItemWrite,
};

impl<S: DocumentStore, F: FileStorage> Catalog<S, F> {
    /// All items, ordered by title, with their category resolved.
    pub fn list_items(&self) -> Result<Vec<ItemSummary>, CatalogError> {
        let categories = self.by_id::<Category>()?;
        let mut items = self.all::<Item>()?;
        sort_by_title(&mut items, |i| &i.title);
        Ok(items
            .into_iter()
            .map(|item| ItemSummary {
                category: categories.get(&item.category).cloned(),
                item,
            })
            .collect())
    }

    pub fn item(&self, id: &str) -> Result<Item, CatalogError> {
        Ok(self.require::<Item>(id)?.data)
    }

    /// An item, its category, and its instances with their colors.
    pub fn item_detail(&self, id: &str) -> Result<ItemDetail, CatalogError> {
        let item = self.item(id)?;
        let category = self.store.collection::<Category>().get(&item.category)?.map(|v| v.data);
        let instances = self.instance_views(instances_where(&self.store, &|instance| {
            instance.item == id
        })?)?;
        let colors = instances
            .iter()
            .filter_map(|view| view.color.as_ref().map(|color| color.title.clone()))
            .collect();
        Ok(ItemDetail {
            item,
            category,
            instances,
            colors,
        })
    }

    /// Choices for the item form.
    pub fn item_form_options(&self) -> Result<ItemFormOptions, CatalogError> {
        Ok(ItemFormOptions {
            categories: self.list_categories()?,
        })
    }

    /// Create an item, storing `upload` as its image when present.
    ///
    /// A rejected submission removes the uploaded temp file.
    pub fn create_item(&self, form: ItemForm, upload: Option<Upload>) -> Result<ItemWrite, CatalogError> {
        let result = self.create_item_inner(form, upload.as_ref());
        if result.is_err() {
            if let Some(upload) = &upload {
                self.discard_upload(upload);
            }
        }
        result
    }

    fn create_item_inner(&self, form: ItemForm, upload: Option<&Upload>) -> Result<ItemWrite, CatalogError> {
        self.validate_item_form(&form)?;

        let plan = self.images.plan_attach(upload);
        let item = form.into_item(new_id(), plan.image.apply(None))?;

        let prepared = prepare(&self.files, &plan)?;
        match self.store.collection::<Item>().insert(&item) {
            Ok(saved) => {
                let image = prepared.commit();
                tracing::info!(id = %saved.data.id, title = %saved.data.title, image = ?saved.data.image, "item created");
                self.notify(EntityKind::Item, Action::Created, &saved.data);
                Ok(ItemWrite {
                    item: saved.data,
                    image,
                })
            }
            Err(err) => {
                prepared.rollback();
                Err(write_error(err))
            }
        }
    }

    /// Replace an item's fields and apply the image change.
    ///
    /// A new `upload` replaces the current image; otherwise `delete_image`
    /// clears it; with neither the image is kept.
    pub fn update_item(
        &self,
        id: &str,
        form: ItemForm,
        upload: Option<Upload>,
        delete_image: bool,
    ) -> Result<ItemWrite, CatalogError> {
        let result = self.update_item_inner(id, form, upload.as_ref(), delete_image);
        if result.is_err() {
            if let Some(upload) = &upload {
                self.discard_upload(upload);
            }
        }
        result
    }

    fn update_item_inner(
        &self,
        id: &str,
        form: ItemForm,
        upload: Option<&Upload>,
        delete_image: bool,
    ) -> Result<ItemWrite, CatalogError> {
        let current = self.require::<Item>(id)?;
        self.validate_item_form(&form)?;

        let plan = self
            .images
            .plan_replace(current.data.image.as_deref(), upload, delete_image);
        let item = form.into_item(id.to_string(), plan.image.apply(current.data.image.clone()))?;

        let prepared = prepare(&self.files, &plan)?;
        match self.store.collection::<Item>().update(&item, current.version) {
            Ok(saved) => {
                let image = prepared.commit();
                tracing::info!(id = %id, version = saved.version, image = ?saved.data.image, "item updated");
                self.notify(EntityKind::Item, Action::Updated, &saved.data);
                Ok(ItemWrite {
                    item: saved.data,
                    image,
                })
            }
            Err(err) => {
                prepared.rollback();
                Err(write_error(err))
            }
        }
    }

    /// The item and the instances that would block its deletion.
    pub fn item_delete_preview(&self, id: &str) -> Result<DeletePreview<Item>, CatalogError> {
        self.delete_preview::<Item>(EntityKind::Item, id)
    }

    /// Delete an item that has no instances, together with its image file.
    pub fn delete_item(&self, id: &str) -> Result<ItemWrite, CatalogError> {
        let target = EntityRef::new(EntityKind::Item, id);
        let item = self.item(id)?;
        can_delete(&self.store, &target)?.into_result()?;

        let plan = self.images.plan_remove(item.image.as_deref());
        let prepared = prepare(&self.files, &plan)?;
        if let Err(err) = self.delete_document::<Item>(&target) {
            prepared.rollback();
            return Err(err);
        }
        let image = prepared.commit();

        tracing::info!(entity = %target, removed = image.removed.len(), "deleted");
        self.notify(EntityKind::Item, Action::Deleted, &item);
        Ok(ItemWrite { item, image })
    }

    /// Field rules plus the category reference.
    fn validate_item_form(&self, form: &ItemForm) -> Result<(), CatalogError> {
        let mut errors = match form.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        let category = form.category.trim();
        if !category.is_empty() {
            self.check_reference::<Category>(&mut errors, "category", category)?;
        }
        errors.into_result().map_err(CatalogError::from)
    }
}
