use crate::entities::{new_id, Category, Item};
use crate::error::CatalogError;
use crate::events::Action;
use crate::forms::CategoryForm;
use crate::images::FileStorage;
use crate::integrity::{items_in_category, EntityKind};
use crate::model::{CollectionsExt, DocumentStore};

use super::{sort_by_title, write_error, Catalog, CategoryDetail, DeletePreview};

impl<S: DocumentStore, F: FileStorage> Catalog<S, F> {
    /// All categories, ordered by title.
    pub fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let mut categories = self.all::<Category>()?;
        sort_by_title(&mut categories, |c| &c.title);
        Ok(categories)
    }

    pub fn category(&self, id: &str) -> Result<Category, CatalogError> {
        Ok(self.require::<Category>(id)?.data)
    }

    /// A category and the items filed under it.
    pub fn category_detail(&self, id: &str) -> Result<CategoryDetail, CatalogError> {
        let category = self.category(id)?;
        let items: Vec<Item> = items_in_category(&self.store, id)?;
        Ok(CategoryDetail { category, items })
    }

    pub fn create_category(&self, form: CategoryForm) -> Result<Category, CatalogError> {
        let category = form.into_category(new_id())?;
        let saved = self
            .store
            .collection::<Category>()
            .insert(&category)
            .map_err(write_error)?;
        tracing::info!(id = %saved.data.id, title = %saved.data.title, "category created");
        self.notify(EntityKind::Category, Action::Created, &saved.data);
        Ok(saved.data)
    }

    pub fn update_category(&self, id: &str, form: CategoryForm) -> Result<Category, CatalogError> {
        let current = self.require::<Category>(id)?;
        let category = form.into_category(id.to_string())?;
        let saved = self
            .store
            .collection::<Category>()
            .update(&category, current.version)
            .map_err(write_error)?;
        tracing::info!(id = %id, version = saved.version, "category updated");
        self.notify(EntityKind::Category, Action::Updated, &saved.data);
        Ok(saved.data)
    }

    /// The category and the items that would block its deletion.
    pub fn category_delete_preview(&self, id: &str) -> Result<DeletePreview<Category>, CatalogError> {
        self.delete_preview::<Category>(EntityKind::Category, id)
    }

    /// Delete a category that no item references.
    pub fn delete_category(&self, id: &str) -> Result<Category, CatalogError> {
        self.delete_guarded::<Category>(EntityKind::Category, id)
    }
}
