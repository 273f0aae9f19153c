//! Form validation at the service boundary.

use shop_catalog::{CatalogError, CategoryForm, InstanceForm};

use crate::support::{item_form, Fixture};

fn violations(err: CatalogError) -> Vec<String> {
    match err {
        CatalogError::Validation(errors) => {
            errors.violations.into_iter().map(|v| v.field).collect()
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[test]
fn unknown_status_is_rejected_and_nothing_is_stored() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let red = fx.color("Red");
    let bear = fx.item("Bear", &toys);

    let err = fx
        .catalog
        .create_instance(InstanceForm {
            item: bear.id.clone(),
            color: red.id.clone(),
            status: "Sold".into(),
        })
        .unwrap_err();
    assert_eq!(violations(err), ["status"]);
    assert_eq!(fx.catalog.summary().unwrap().item_instance_count, 0);
}

#[test]
fn all_violations_are_reported() {
    let fx = Fixture::new();
    let mut form = item_form("", "");
    form.description = "short".into();
    form.price = "".into();

    let fields = violations(fx.catalog.create_item(form, None).unwrap_err());
    assert!(fields.contains(&"title".to_string()));
    assert!(fields.contains(&"category".to_string()));
    assert!(fields.contains(&"description".to_string()));
    assert!(fields.contains(&"price".to_string()));
}

#[test]
fn whitespace_only_is_empty() {
    let fx = Fixture::new();
    let err = fx
        .catalog
        .create_category(CategoryForm {
            title: "   ".into(),
            description: "Toys".into(),
        })
        .unwrap_err();
    assert_eq!(violations(err), ["title"]);
}

#[test]
fn dangling_references_are_field_errors() {
    let fx = Fixture::new();
    let err = fx
        .catalog
        .create_item(item_form("Bear", "no-such-category"), None)
        .unwrap_err();
    assert_eq!(violations(err), ["category"]);

    let err = fx
        .catalog
        .create_instance(InstanceForm {
            item: "ghost".into(),
            color: "ghost".into(),
            status: "Available".into(),
        })
        .unwrap_err();
    assert_eq!(violations(err), ["item", "color"]);
}

#[test]
fn values_are_trimmed() {
    let fx = Fixture::new();
    let category = fx
        .catalog
        .create_category(CategoryForm {
            title: "  Toys ".into(),
            description: " Soft ".into(),
        })
        .unwrap();
    assert_eq!(category.title, "Toys");
    assert_eq!(category.description, "Soft");
}
