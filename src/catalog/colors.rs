use crate::entities::{new_id, Color};
use crate::error::CatalogError;
use crate::events::Action;
use crate::forms::ColorForm;
use crate::images::FileStorage;
use crate::integrity::{instances_where, EntityKind};
use crate::model::{CollectionsExt, DocumentStore};

use super::{sort_by_title, write_error, Catalog, ColorDetail, DeletePreview};

impl<S: DocumentStore, F: FileStorage> Catalog<S, F> {
    /// All colors, ordered by title.
    pub fn list_colors(&self) -> Result<Vec<Color>, CatalogError> {
        let mut colors = self.all::<Color>()?;
        sort_by_title(&mut colors, |c| &c.title);
        Ok(colors)
    }

    pub fn color(&self, id: &str) -> Result<Color, CatalogError> {
        Ok(self.require::<Color>(id)?.data)
    }

    /// A color and the instances made in it.
    pub fn color_detail(&self, id: &str) -> Result<ColorDetail, CatalogError> {
        let color = self.color(id)?;
        let instances = instances_where(&self.store, &|instance| instance.color == id)?;
        Ok(ColorDetail {
            color,
            instances: self.instance_views(instances)?,
        })
    }

    pub fn create_color(&self, form: ColorForm) -> Result<Color, CatalogError> {
        let color = form.into_color(new_id())?;
        let saved = self
            .store
            .collection::<Color>()
            .insert(&color)
            .map_err(write_error)?;
        tracing::info!(id = %saved.data.id, title = %saved.data.title, "color created");
        self.notify(EntityKind::Color, Action::Created, &saved.data);
        Ok(saved.data)
    }

    pub fn update_color(&self, id: &str, form: ColorForm) -> Result<Color, CatalogError> {
        let current = self.require::<Color>(id)?;
        let color = form.into_color(id.to_string())?;
        let saved = self
            .store
            .collection::<Color>()
            .update(&color, current.version)
            .map_err(write_error)?;
        tracing::info!(id = %id, version = saved.version, "color updated");
        self.notify(EntityKind::Color, Action::Updated, &saved.data);
        Ok(saved.data)
    }

    /// The color and the instances that would block its deletion.
    pub fn color_delete_preview(&self, id: &str) -> Result<DeletePreview<Color>, CatalogError> {
        self.delete_preview::<Color>(EntityKind::Color, id)
    }

    /// Delete a color that no instance uses.
    pub fn delete_color(&self, id: &str) -> Result<Color, CatalogError> {
        self.delete_guarded::<Color>(EntityKind::Color, id)
    }
}
