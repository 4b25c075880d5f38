//! Collaborator payloads: catalog items and address snapshots

use serde::{Deserialize, Serialize};

/// Current name / image / price of a dish or combo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CatalogItem {
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
}

/// Shippable address as resolved from the address book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub consignee: String,
    pub phone: String,
    /// Province + city + district + detail, already joined
    pub full_address: String,
}
