//! Integrity rules - decides whether an entity may be deleted.
//!
//! A Category is blocked by the Items in it, an Item by its instances, and a
//! Color by the instances painted in it. The check is a pure query: it never
//! deletes anything, and nothing cascades.

use std::fmt;

use serde::Serialize;

use crate::entities::{Category, Color, Item, ItemInstance};
use crate::error::CatalogError;
use crate::model::{CollectionsExt, Document, DocumentStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Category,
    Color,
    Item,
    ItemInstance,
}

impl EntityKind {
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Category => Category::COLLECTION,
            EntityKind::Color => Color::COLLECTION,
            EntityKind::Item => Item::COLLECTION,
            EntityKind::ItemInstance => ItemInstance::COLLECTION,
        }
    }

    /// Lowercase name used in routes and event names.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Color => "color",
            EntityKind::Item => "item",
            EntityKind::ItemInstance => "iteminstance",
        }
    }
}

/// An entity identified by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.name(), self.id)
    }
}

/// An entity whose reference field points at the delete target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Dependent {
    Item(Item),
    ItemInstance(ItemInstance),
}

impl Dependent {
    pub fn id(&self) -> &str {
        match self {
            Dependent::Item(item) => &item.id,
            Dependent::ItemInstance(instance) => &instance.id,
        }
    }

    /// Human-facing label: the item title, or the instance id.
    pub fn label(&self) -> &str {
        match self {
            Dependent::Item(item) => &item.title,
            Dependent::ItemInstance(instance) => &instance.id,
        }
    }
}

/// Result of [`can_delete`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteCheck {
    pub target: EntityRef,
    pub blocking_dependents: Vec<Dependent>,
}

impl DeleteCheck {
    pub fn allowed(&self) -> bool {
        self.blocking_dependents.is_empty()
    }

    /// `Ok(())` when allowed, otherwise `CatalogError::DeleteBlocked`.
    pub fn into_result(self) -> Result<(), CatalogError> {
        if self.allowed() {
            Ok(())
        } else {
            Err(CatalogError::DeleteBlocked {
                entity: self.target,
                dependents: self.blocking_dependents,
            })
        }
    }
}

fn require<S: DocumentStore, D: Document>(store: &S, id: &str) -> Result<(), CatalogError> {
    match store.collection::<D>().get(id)? {
        Some(_) => Ok(()),
        None => Err(CatalogError::not_found(D::COLLECTION, id)),
    }
}

/// Items in a category, ordered by title.
pub fn items_in_category<S: DocumentStore>(
    store: &S,
    category_id: &str,
) -> Result<Vec<Item>, CatalogError> {
    let mut items: Vec<Item> = store
        .collection::<Item>()
        .find(&|item| item.category == category_id)?
        .into_iter()
        .map(|v| v.data)
        .collect();
    items.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
    Ok(items)
}

/// Instances matching `predicate`, ordered by id.
pub fn instances_where<S: DocumentStore>(
    store: &S,
    predicate: &dyn Fn(&ItemInstance) -> bool,
) -> Result<Vec<ItemInstance>, CatalogError> {
    let mut instances: Vec<ItemInstance> = store
        .collection::<ItemInstance>()
        .find(predicate)?
        .into_iter()
        .map(|v| v.data)
        .collect();
    instances.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(instances)
}

/// Decide whether `target` may be deleted.
///
/// Returns `CatalogError::NotFound` when the target itself does not exist,
/// so a missing entity is never confused with a blocked one.
pub fn can_delete<S: DocumentStore>(
    store: &S,
    target: &EntityRef,
) -> Result<DeleteCheck, CatalogError> {
    let id = target.id.as_str();
    let blocking_dependents = match target.kind {
        EntityKind::Category => {
            require::<S, Category>(store, id)?;
            items_in_category(store, id)?
                .into_iter()
                .map(Dependent::Item)
                .collect()
        }
        EntityKind::Item => {
            require::<S, Item>(store, id)?;
            instances_where(store, &|instance| instance.item == id)?
                .into_iter()
                .map(Dependent::ItemInstance)
                .collect()
        }
        EntityKind::Color => {
            require::<S, Color>(store, id)?;
            instances_where(store, &|instance| instance.color == id)?
                .into_iter()
                .map(Dependent::ItemInstance)
                .collect()
        }
        EntityKind::ItemInstance => {
            require::<S, ItemInstance>(store, id)?;
            Vec::new()
        }
    };

    Ok(DeleteCheck {
        target: target.clone(),
        blocking_dependents,
    })
}
