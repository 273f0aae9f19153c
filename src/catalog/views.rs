//! Read-side shapes returned by catalog queries.

use serde::Serialize;

use crate::entities::{Category, Color, Item, ItemInstance};
use crate::images::ImageOutcome;
use crate::integrity::Dependent;

/// Home page counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub item_count: usize,
    pub item_instance_count: usize,
    pub item_instance_available_count: usize,
    pub category_count: usize,
    pub color_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub items: Vec<Item>,
}

/// An item together with its resolved category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub item: Item,
    pub category: Option<Category>,
}

/// An instance with its item and color resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceView {
    pub instance: ItemInstance,
    pub item: Option<Item>,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    pub item: Item,
    pub category: Option<Category>,
    pub instances: Vec<InstanceView>,
    /// Color titles of the instances, in instance order.
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorDetail {
    pub color: Color,
    pub instances: Vec<InstanceView>,
}

/// What the delete confirmation shows: the target and whatever blocks it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletePreview<T> {
    pub entity: T,
    pub blocking_dependents: Vec<Dependent>,
    pub allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFormOptions {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceFormOptions {
    pub items: Vec<Item>,
    pub colors: Vec<Color>,
}

/// Result of an item write: the stored document and what happened to image files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemWrite {
    pub item: Item,
    pub image: ImageOutcome,
}
