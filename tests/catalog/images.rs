//! Image files follow their item through create, replace and delete.

use shop_catalog::CatalogError;

use crate::support::{item_form, Fixture};

#[test]
fn create_with_upload_stores_the_file_under_its_extension() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let upload = fx.upload("a1b2c3", "bear.png");

    let write = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(upload))
        .unwrap();

    assert_eq!(write.item.image.as_deref(), Some("a1b2c3.png"));
    assert_eq!(fx.files(), ["a1b2c3.png"]);
}

#[test]
fn create_without_upload_has_no_image() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let bear = fx.item("Bear", &toys);
    assert_eq!(bear.image, None);
    assert!(fx.files().is_empty());
}

#[test]
fn new_upload_replaces_the_old_file() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let first = fx.upload("first", "bear.png");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(first))
        .unwrap()
        .item;

    let second = fx.upload("second", "bear.jpg");
    let write = fx
        .catalog
        .update_item(&bear.id, item_form("Bear", &toys.id), Some(second), false)
        .unwrap();

    assert_eq!(write.item.image.as_deref(), Some("second.jpg"));
    assert_eq!(write.image.removed, vec![fx.path("first.png")]);
    assert!(write.image.leftovers.is_empty());
    assert_eq!(fx.files(), ["second.jpg"]);
}

#[test]
fn delete_flag_clears_the_image() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let upload = fx.upload("pic", "bear.gif");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(upload))
        .unwrap()
        .item;

    let write = fx
        .catalog
        .update_item(&bear.id, item_form("Bear", &toys.id), None, true)
        .unwrap();

    assert_eq!(write.item.image, None);
    assert!(fx.files().is_empty());
    assert_eq!(fx.catalog.item(&bear.id).unwrap().image, None);
}

#[test]
fn update_without_changes_keeps_the_image() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let upload = fx.upload("pic", "bear.gif");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(upload))
        .unwrap()
        .item;

    let write = fx
        .catalog
        .update_item(&bear.id, item_form("Teddy", &toys.id), None, false)
        .unwrap();

    assert_eq!(write.item.image.as_deref(), Some("pic.gif"));
    assert_eq!(fx.files(), ["pic.gif"]);
}

#[test]
fn deleting_an_item_removes_its_image() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let upload = fx.upload("pic", "bear.png");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(upload))
        .unwrap()
        .item;

    let write = fx.catalog.delete_item(&bear.id).unwrap();
    assert_eq!(write.image.removed, vec![fx.path("pic.png")]);
    assert!(fx.files().is_empty());
}

#[test]
fn blocked_item_delete_keeps_its_image() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let red = fx.color("Red");
    let upload = fx.upload("pic", "bear.png");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(upload))
        .unwrap()
        .item;
    fx.instance(&bear, &red, "Available");

    assert!(matches!(
        fx.catalog.delete_item(&bear.id),
        Err(CatalogError::DeleteBlocked { .. })
    ));
    assert_eq!(fx.files(), ["pic.png"]);
}

#[test]
fn rejected_form_discards_the_upload() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let upload = fx.upload("tmp", "bear.png");

    let mut form = item_form("Bear", &toys.id);
    form.price = "cheap".into();
    assert!(matches!(
        fx.catalog.create_item(form, Some(upload)),
        Err(CatalogError::Validation(_))
    ));
    assert!(fx.files().is_empty());
    assert_eq!(fx.catalog.summary().unwrap().item_count, 0);
}

#[test]
fn failed_update_keeps_the_old_image() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let first = fx.upload("first", "bear.png");
    let bear = fx
        .catalog
        .create_item(item_form("Bear", &toys.id), Some(first))
        .unwrap()
        .item;

    let second = fx.upload("second", "bear.png");
    let err = fx
        .catalog
        .update_item(&bear.id, item_form("", &toys.id), Some(second), false)
        .unwrap_err();
    assert_eq!(err.status_code(), 422);
    assert_eq!(fx.files(), ["first.png"]);
    assert_eq!(
        fx.catalog.item(&bear.id).unwrap().image.as_deref(),
        Some("first.png")
    );
    assert!(fx.image_dir().join("first.png").exists());
}
