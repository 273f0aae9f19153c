use crate::entities::{new_id, Color, Item, ItemInstance};
use crate::error::CatalogError;
use crate::events::Action;
use crate::forms::InstanceForm;
use crate::images::FileStorage;
use crate::integrity::{instances_where, EntityKind};
use crate::model::{CollectionsExt, DocumentStore};
use crate::validation::ValidationErrors;

use super::{sort_by_title, write_error, Catalog, InstanceFormOptions, InstanceView};

impl<S: DocumentStore, F: FileStorage> Catalog<S, F> {
    /// All instances with item and color resolved.
    pub fn list_instances(&self) -> Result<Vec<InstanceView>, CatalogError> {
        let instances = instances_where(&self.store, &|_| true)?;
        self.instance_views(instances)
    }

    pub fn instance(&self, id: &str) -> Result<ItemInstance, CatalogError> {
        Ok(self.require::<ItemInstance>(id)?.data)
    }

    pub fn instance_detail(&self, id: &str) -> Result<InstanceView, CatalogError> {
        let instance = self.instance(id)?;
        let item = self.store.collection::<Item>().get(&instance.item)?.map(|v| v.data);
        let color = self.store.collection::<Color>().get(&instance.color)?.map(|v| v.data);
        Ok(InstanceView {
            instance,
            item,
            color,
        })
    }

    /// Choices for the instance form, both ordered by title.
    pub fn instance_form_options(&self) -> Result<InstanceFormOptions, CatalogError> {
        let mut items = self.all::<Item>()?;
        sort_by_title(&mut items, |i| &i.title);
        Ok(InstanceFormOptions {
            items,
            colors: self.list_colors()?,
        })
    }

    pub fn create_instance(&self, form: InstanceForm) -> Result<ItemInstance, CatalogError> {
        self.validate_instance_form(&form)?;
        let instance = form.into_instance(new_id())?;
        let saved = self
            .store
            .collection::<ItemInstance>()
            .insert(&instance)
            .map_err(write_error)?;
        tracing::info!(id = %saved.data.id, item = %saved.data.item, status = %saved.data.status, "instance created");
        self.notify(EntityKind::ItemInstance, Action::Created, &saved.data);
        Ok(saved.data)
    }

    pub fn update_instance(&self, id: &str, form: InstanceForm) -> Result<ItemInstance, CatalogError> {
        let current = self.require::<ItemInstance>(id)?;
        self.validate_instance_form(&form)?;
        let instance = form.into_instance(id.to_string())?;
        let saved = self
            .store
            .collection::<ItemInstance>()
            .update(&instance, current.version)
            .map_err(write_error)?;
        tracing::info!(id = %id, version = saved.version, status = %saved.data.status, "instance updated");
        self.notify(EntityKind::ItemInstance, Action::Updated, &saved.data);
        Ok(saved.data)
    }

    /// Instances have no dependents; this only fails when the id is unknown.
    pub fn delete_instance(&self, id: &str) -> Result<ItemInstance, CatalogError> {
        self.delete_guarded::<ItemInstance>(EntityKind::ItemInstance, id)
    }

    /// Field rules plus the item and color references.
    fn validate_instance_form(&self, form: &InstanceForm) -> Result<(), CatalogError> {
        let mut errors = match form.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        let item = form.item.trim();
        if !item.is_empty() {
            self.check_reference::<Item>(&mut errors, "item", item)?;
        }
        let color = form.color.trim();
        if !color.is_empty() {
            self.check_reference::<Color>(&mut errors, "color", color)?;
        }
        errors.into_result().map_err(CatalogError::from)
    }
}
