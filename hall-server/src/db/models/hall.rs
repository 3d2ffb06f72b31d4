//! Hall Model

use super::serde_helpers;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Hall ID type
pub type HallId = RecordId;

/// Menu item offered by a hall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    /// Per-guest price of one serving
    pub price: f64,
    pub category: Option<String>,
}

/// Hall model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hall {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<HallId>,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    /// Owning manager
    #[serde(with = "serde_helpers::record_id")]
    pub manager: RecordId,
    pub capacity: i64,
    /// Per-seat price
    pub price: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub image: String,
    /// Manager-controlled manual blocks (YYYY-MM-DD), independent of bookings
    #[serde(default)]
    pub booked_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Hall {
    /// Look up a menu item by exact name
    pub fn menu_item(&self, name: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.name == name)
    }

    pub fn is_date_blocked(&self, date: NaiveDate) -> bool {
        self.booked_dates.contains(&date)
    }
}

/// Create hall payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallCreate {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub capacity: i64,
    pub price: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    /// Admin may create on behalf of a manager; defaults to the caller
    pub manager: Option<String>,
}

/// Update hall payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_dates: Option<Vec<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<Vec<MenuItem>>,
}
