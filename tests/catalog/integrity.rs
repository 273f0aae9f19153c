//! Delete guards.

use shop_catalog::{
    can_delete, CatalogError, CollectionsExt, Dependent, EntityKind, EntityRef, Item, StoreError,
};

use crate::support::Fixture;

#[test]
fn color_in_use_cannot_be_deleted() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let red = fx.color("Red");
    let bear = fx.item("Bear", &toys);
    let frog = fx.item("Frog", &toys);
    fx.instance(&bear, &red, "Available");
    fx.instance(&frog, &red, "Not available");

    let preview = fx.catalog.color_delete_preview(&red.id).unwrap();
    assert!(!preview.allowed);
    assert_eq!(preview.blocking_dependents.len(), 2);
    assert!(preview
        .blocking_dependents
        .iter()
        .all(|d| matches!(d, Dependent::ItemInstance(_))));

    assert!(matches!(
        fx.catalog.delete_color(&red.id),
        Err(CatalogError::DeleteBlocked { .. })
    ));
    assert!(fx.catalog.color(&red.id).is_ok());
}

#[test]
fn previews_list_blocking_dependents() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let bear = fx.item("Bear", &toys);

    let preview = fx.catalog.category_delete_preview(&toys.id).unwrap();
    assert!(!preview.allowed);
    assert_eq!(preview.entity, toys);
    assert_eq!(preview.blocking_dependents, vec![Dependent::Item(bear.clone())]);

    let preview = fx.catalog.item_delete_preview(&bear.id).unwrap();
    assert!(preview.allowed);
    assert!(preview.blocking_dependents.is_empty());
}

#[test]
fn missing_target_is_not_found_rather_than_blocked() {
    let fx = Fixture::new();
    let err = can_delete(
        fx.catalog.store(),
        &EntityRef::new(EntityKind::Category, "nope"),
    )
    .unwrap_err();
    assert_eq!(err.status_code(), 404);

    assert!(matches!(
        fx.catalog.delete_item("nope"),
        Err(CatalogError::NotFound { .. })
    ));
}

#[test]
fn instances_never_block() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let red = fx.color("Red");
    let bear = fx.item("Bear", &toys);
    let instance = fx.instance(&bear, &red, "Available");

    let check = can_delete(
        fx.catalog.store(),
        &EntityRef::new(EntityKind::ItemInstance, &instance.id),
    )
    .unwrap();
    assert!(check.allowed());
}

#[test]
fn blocked_delete_leaves_documents_alone() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let bear = fx.item("Bear", &toys);

    let err = fx.catalog.delete_category(&toys.id).unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert_eq!(fx.catalog.category(&toys.id).unwrap(), toys);
    assert_eq!(fx.catalog.item(&bear.id).unwrap(), bear);
}

#[test]
fn store_refuses_to_drop_referenced_documents() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    fx.item("Bear", &toys);

    let err = fx
        .catalog
        .store()
        .collection::<shop_catalog::Category>()
        .delete_unreferenced(&toys.id)
        .unwrap_err();
    match err {
        StoreError::Referenced { by, .. } => assert_eq!(by.len(), 1),
        other => panic!("expected Referenced, got {:?}", other),
    }
}

#[test]
fn stale_version_is_a_conflict() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let bear = fx.item("Bear", &toys);

    let items = fx.catalog.store().collection::<Item>();
    let current = items.get(&bear.id).unwrap().unwrap();
    items.update(&current.data, current.version).unwrap();

    let err = items.update(&current.data, current.version).unwrap_err();
    assert!(matches!(err, StoreError::ConcurrencyConflict { .. }));
    assert_eq!(CatalogError::from(err).status_code(), 409);
}
