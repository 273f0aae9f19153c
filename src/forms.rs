//! Raw form submissions and their rule tables.
//!
//! Forms hold untrusted strings exactly as submitted. `into_*` trims,
//! validates against the form's rule table, and builds the entity.

use serde::{Deserialize, Serialize};

use crate::entities::{Category, Color, InstanceStatus, Item, ItemInstance};
use crate::validation::{validate, Check, Rule, ValidationErrors};

const STATUS_VALUES: &[&str] = &["Available", "Not available"];

pub const CATEGORY_RULES: &[Rule] = &[
    Rule {
        field: "title",
        checks: &[Check::NonEmpty],
        message: "Enter the category title",
    },
    Rule {
        field: "description",
        checks: &[Check::NonEmpty],
        message: "Enter the category description",
    },
];

pub const COLOR_RULES: &[Rule] = &[Rule {
    field: "title",
    checks: &[Check::NonEmpty],
    message: "Enter the color title",
}];

pub const ITEM_RULES: &[Rule] = &[
    Rule {
        field: "title",
        checks: &[Check::NonEmpty],
        message: "Enter the item title",
    },
    Rule {
        field: "category",
        checks: &[Check::NonEmpty],
        message: "Choose a category",
    },
    Rule {
        field: "description",
        checks: &[Check::MinLength(7)],
        message: "Enter the item description (at least 7 characters)",
    },
    Rule {
        field: "price",
        checks: &[Check::NonEmpty, Check::Numeric],
        message: "Enter the item price",
    },
];

pub const INSTANCE_RULES: &[Rule] = &[
    Rule {
        field: "item",
        checks: &[Check::NonEmpty],
        message: "Choose an item",
    },
    Rule {
        field: "color",
        checks: &[Check::NonEmpty],
        message: "Choose a color",
    },
    Rule {
        field: "status",
        checks: &[Check::OneOf(STATUS_VALUES)],
        message: "Choose a status (Available or Not available)",
    },
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub title: String,
    pub description: String,
}

impl CategoryForm {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate(CATEGORY_RULES, |field| self.value(field))
    }

    pub fn into_category(self, id: String) -> Result<Category, ValidationErrors> {
        self.validate()?;
        Ok(Category {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorForm {
    pub title: String,
}

impl ColorForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate(COLOR_RULES, |field| match field {
            "title" => Some(self.title.as_str()),
            _ => None,
        })
    }

    pub fn into_color(self, id: String) -> Result<Color, ValidationErrors> {
        self.validate()?;
        Ok(Color {
            id,
            title: self.title.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
}

impl ItemForm {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            "price" => Some(&self.price),
            "category" => Some(&self.category),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate(ITEM_RULES, |field| self.value(field))
    }

    /// Build the item document. `image` is decided by the image lifecycle, not the form.
    pub fn into_item(self, id: String, image: Option<String>) -> Result<Item, ValidationErrors> {
        self.validate()?;
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| ValidationErrors::single("price", "Enter the item price"))?;
        Ok(Item {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            category: self.category.trim().to_string(),
            image,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceForm {
    pub item: String,
    pub color: String,
    pub status: String,
}

impl InstanceForm {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "item" => Some(&self.item),
            "color" => Some(&self.color),
            "status" => Some(&self.status),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate(INSTANCE_RULES, |field| self.value(field))
    }

    pub fn into_instance(self, id: String) -> Result<ItemInstance, ValidationErrors> {
        self.validate()?;
        let status: InstanceStatus = self.status.trim().parse().map_err(|_| {
            ValidationErrors::single("status", "Choose a status (Available or Not available)")
        })?;
        Ok(ItemInstance {
            id,
            item: self.item.trim().to_string(),
            color: self.color.trim().to_string(),
            status,
        })
    }
}
