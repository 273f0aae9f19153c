//! Sample data for a fresh catalog.

use crate::catalog::Catalog;
use crate::entities::{Category, Color, Item, ItemInstance};
use crate::error::CatalogError;
use crate::forms::{CategoryForm, ColorForm, InstanceForm, ItemForm};
use crate::images::FileStorage;
use crate::model::DocumentStore;

/// Everything [`populate`] created.
#[derive(Debug, Clone, Default)]
pub struct Seeded {
    pub categories: Vec<Category>,
    pub colors: Vec<Color>,
    pub items: Vec<Item>,
    pub instances: Vec<ItemInstance>,
}

/// Fill the catalog with two categories, three colors, two items and three instances.
///
/// Goes through the regular create operations, so every rule applies.
pub fn populate<S: DocumentStore, F: FileStorage>(
    catalog: &Catalog<S, F>,
) -> Result<Seeded, CatalogError> {
    let mut seeded = Seeded::default();

    for (title, description) in [
        ("Knitted toys", "Toys knitted by hand"),
        ("Sewn toys", "Toys sewn by hand"),
    ] {
        seeded.categories.push(catalog.create_category(CategoryForm {
            title: title.into(),
            description: description.into(),
        })?);
    }

    for title in ["Green", "Pink", "Purple"] {
        seeded
            .colors
            .push(catalog.create_color(ColorForm { title: title.into() })?);
    }

    for (title, description, price, category) in [
        ("Le Frog", "The coolest frog, always moving forward!", "300", 0),
        ("Rustle", "A cool little dinosaur!", "200", 1),
    ] {
        let write = catalog.create_item(
            ItemForm {
                title: title.into(),
                description: description.into(),
                price: price.into(),
                category: seeded.categories[category].id.clone(),
            },
            None,
        )?;
        seeded.items.push(write.item);
    }

    for (item, status, color) in [
        (0, "Available", 0),
        (1, "Not available", 1),
        (1, "Available", 2),
    ] {
        seeded.instances.push(catalog.create_instance(InstanceForm {
            item: seeded.items[item].id.clone(),
            color: seeded.colors[color].id.clone(),
            status: status.into(),
        })?);
    }

    tracing::info!(
        categories = seeded.categories.len(),
        colors = seeded.colors.len(),
        items = seeded.items.len(),
        instances = seeded.instances.len(),
        "catalog seeded"
    );
    Ok(seeded)
}
