//! Catalog entities as stored documents.
//!
//! Reference fields carry `#[document(references = ...)]` so the store can
//! refuse dangling writes and orphaning deletes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Document;

/// Generate a fresh document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "categories")]
pub struct Category {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl Category {
    pub fn url(&self) -> String {
        format!("/catalog/category/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "colors")]
pub struct Color {
    pub id: String,
    pub title: String,
}

impl Color {
    pub fn url(&self) -> String {
        format!("/catalog/color/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "items")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[document(references = "categories")]
    pub category: String,
    /// Stored filename of the uploaded image, relative to the image directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Item {
    pub fn url(&self) -> String {
        format!("/catalog/item/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "item_instances")]
pub struct ItemInstance {
    pub id: String,
    #[document(references = "items")]
    pub item: String,
    #[document(references = "colors")]
    pub color: String,
    pub status: InstanceStatus,
}

impl ItemInstance {
    pub fn url(&self) -> String {
        format!("/catalog/iteminstance/{}", self.id)
    }
}

/// Availability flag of an item instance. A fixed two-state value, not a lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceStatus {
    Available,
    #[serde(rename = "Not available")]
    NotAvailable,
}

impl InstanceStatus {
    pub const ALL: [InstanceStatus; 2] = [InstanceStatus::Available, InstanceStatus::NotAvailable];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Available => "Available",
            InstanceStatus::NotAvailable => "Not available",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the two status values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown instance status: {:?}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for InstanceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
