//! Store failures and races between the delete check and the delete.

use shop_catalog::{CatalogError, Category, CollectionsExt, Dependent, Item};

use crate::support::{item_form, Fixture};

fn late_item(category: &str) -> Item {
    Item {
        id: "late".into(),
        title: "Late".into(),
        description: "Arrived after the check".into(),
        price: 10.0,
        category: category.into(),
        image: None,
    }
}

#[test]
fn dependent_created_during_delete_blocks_it() {
    let fx = Fixture::flaky();
    let toys = fx.category("Toys");

    let category = toys.id.clone();
    fx.store().before_next_delete(move |store| {
        store.collection::<Item>().insert(&late_item(&category)).unwrap();
    });

    match fx.catalog.delete_category(&toys.id) {
        Err(CatalogError::DeleteBlocked { dependents, .. }) => {
            assert_eq!(dependents.len(), 1);
            assert!(matches!(&dependents[0], Dependent::Item(item) if item.title == "Late"));
        }
        other => panic!("expected DeleteBlocked, got {:?}", other),
    }
    assert_eq!(fx.catalog.category(&toys.id).unwrap(), toys);
}

#[test]
fn delete_is_retried_when_the_late_dependent_is_gone() {
    let fx = Fixture::flaky();
    let toys = fx.category("Toys");

    let category = toys.id.clone();
    fx.store().before_next_delete(move |store| {
        store.collection::<Item>().insert(&late_item(&category)).unwrap();
    });
    fx.store().after_next_delete(|store| {
        store.collection::<Item>().delete("late").unwrap();
    });

    let deleted = fx.catalog.delete_category(&toys.id).unwrap();
    assert_eq!(deleted, toys);
    assert!(fx
        .store()
        .inner
        .collection::<Category>()
        .get(&toys.id)
        .unwrap()
        .is_none());
}

#[test]
fn failed_insert_discards_the_upload() {
    let fx = Fixture::flaky();
    let toys = fx.category("Toys");
    fx.store().fail_writes_to("items");

    let upload = fx.upload("tmp", "bear.png");
    let err = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(upload))
        .unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert!(fx.files().is_empty());
    assert_eq!(fx.catalog.summary().unwrap().item_count, 0);
}

#[test]
fn failed_update_restores_the_old_image() {
    let fx = Fixture::flaky();
    let toys = fx.category("Toys");
    let first = fx.upload("first", "bear.png");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(first))
        .unwrap()
        .item;

    fx.store().fail_writes_to("items");
    let second = fx.upload("second", "bear.jpg");
    let err = fx
        .catalog
        .update_item(&bear.id, item_form("Bear", &toys.id), Some(second), false)
        .unwrap_err();

    assert!(matches!(err, CatalogError::Store(_)));
    // The old image is back in place and the new upload is gone.
    assert_eq!(fx.files(), ["first.png"]);
    assert_eq!(
        fx.catalog.item(&bear.id).unwrap().image.as_deref(),
        Some("first.png")
    );
}

#[test]
fn failed_delete_keeps_the_image() {
    let fx = Fixture::flaky();
    let toys = fx.category("Toys");
    let upload = fx.upload("pic", "bear.png");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(upload))
        .unwrap()
        .item;

    fx.store().fail_writes_to("items");
    assert!(fx.catalog.delete_item(&bear.id).is_err());

    assert_eq!(fx.files(), ["pic.png"]);
    assert_eq!(fx.catalog.item(&bear.id).unwrap(), bear);
}
