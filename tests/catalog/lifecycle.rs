//! End-to-end catalog scenarios.

use shop_catalog::{seed, CatalogError, CategoryForm, InstanceForm, InstanceStatus};

use crate::support::{item_form, Fixture};

#[test]
fn toys_and_bear_through_their_lifecycle() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let brown = fx.color("Brown");
    let bear = fx.item("Bear", &toys);
    let instance = fx.instance(&bear, &brown, "Available");

    // Blocked while an item references the category.
    match fx.catalog.delete_category(&toys.id) {
        Err(CatalogError::DeleteBlocked { dependents, .. }) => {
            assert_eq!(dependents.len(), 1);
            assert_eq!(dependents[0].id(), bear.id);
        }
        other => panic!("expected DeleteBlocked, got {:?}", other),
    }

    // Blocked while an instance references the item.
    assert!(matches!(
        fx.catalog.delete_item(&bear.id),
        Err(CatalogError::DeleteBlocked { .. })
    ));

    // Unwind from the bottom up.
    fx.catalog.delete_instance(&instance.id).unwrap();
    fx.catalog.delete_item(&bear.id).unwrap();
    fx.catalog.delete_category(&toys.id).unwrap();
    fx.catalog.delete_color(&brown.id).unwrap();

    let summary = fx.catalog.summary().unwrap();
    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.category_count, 0);
    assert_eq!(summary.color_count, 0);
    assert_eq!(summary.item_instance_count, 0);
}

#[test]
fn summary_counts_available_instances() {
    let fx = Fixture::new();
    seed::populate(&fx.catalog).unwrap();

    let summary = fx.catalog.summary().unwrap();
    assert_eq!(summary.category_count, 2);
    assert_eq!(summary.color_count, 3);
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.item_instance_count, 3);
    assert_eq!(summary.item_instance_available_count, 2);
}

#[test]
fn lists_are_sorted_by_title() {
    let fx = Fixture::new();
    let zebra = fx.category("Zebras");
    fx.category("Ants");
    fx.item("Yak", &zebra);
    fx.item("Bee", &zebra);

    let titles: Vec<_> = fx
        .catalog
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, ["Ants", "Zebras"]);

    let items = fx.catalog.list_items().unwrap();
    assert_eq!(items[0].item.title, "Bee");
    assert_eq!(items[1].item.title, "Yak");
    assert_eq!(items[0].category.as_ref().unwrap().id, zebra.id);
}

#[test]
fn details_resolve_references() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let red = fx.color("Red");
    let bear = fx.item("Bear", &toys);
    let instance = fx.instance(&bear, &red, "Not available");

    let category = fx.catalog.category_detail(&toys.id).unwrap();
    assert_eq!(category.items, vec![bear.clone()]);

    let item = fx.catalog.item_detail(&bear.id).unwrap();
    assert_eq!(item.category, Some(toys.clone()));
    assert_eq!(item.instances.len(), 1);
    assert_eq!(item.colors, ["Red"]);

    let color = fx.catalog.color_detail(&red.id).unwrap();
    assert_eq!(color.instances[0].instance.id, instance.id);

    let view = fx.catalog.instance_detail(&instance.id).unwrap();
    assert_eq!(view.instance.status, InstanceStatus::NotAvailable);
    assert_eq!(view.item, Some(bear));
    assert_eq!(view.color, Some(red));
}

#[test]
fn update_replaces_fields_and_keeps_id() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    let games = fx.category("Games");
    let red = fx.color("Red");
    let bear = fx.item("Bear", &toys);
    let instance = fx.instance(&bear, &red, "Available");

    let renamed = fx
        .catalog
        .update_category(
            &toys.id,
            CategoryForm {
                title: "Soft toys".into(),
                description: "Plush".into(),
            },
        )
        .unwrap();
    assert_eq!(renamed.id, toys.id);
    assert_eq!(fx.catalog.category(&toys.id).unwrap().title, "Soft toys");

    let moved = fx
        .catalog
        .update_item(&bear.id, item_form("Big bear", &games.id), None, false)
        .unwrap();
    assert_eq!(moved.item.category, games.id);

    let sold = fx
        .catalog
        .update_instance(
            &instance.id,
            InstanceForm {
                item: bear.id.clone(),
                color: red.id.clone(),
                status: "Not available".into(),
            },
        )
        .unwrap();
    assert_eq!(sold.status, InstanceStatus::NotAvailable);
    assert_eq!(fx.catalog.summary().unwrap().item_instance_available_count, 0);
}

#[test]
fn form_options_list_choices() {
    let fx = Fixture::new();
    let toys = fx.category("Toys");
    fx.color("Red");
    fx.item("Bear", &toys);

    assert_eq!(fx.catalog.item_form_options().unwrap().categories, vec![toys]);
    let options = fx.catalog.instance_form_options().unwrap();
    assert_eq!(options.items.len(), 1);
    assert_eq!(options.colors.len(), 1);
}

#[test]
fn unknown_ids_are_not_found() {
    let fx = Fixture::new();
    assert!(matches!(
        fx.catalog.category("missing"),
        Err(CatalogError::NotFound { .. })
    ));
    assert!(matches!(
        fx.catalog.update_color("missing", shop_catalog::ColorForm { title: "Red".into() }),
        Err(CatalogError::NotFound { .. })
    ));
    assert!(matches!(
        fx.catalog.delete_instance("missing"),
        Err(CatalogError::NotFound { .. })
    ));
}
