//! Custom-food menu matching and price arithmetic
//!
//! Requested items are matched against the hall's menu by exact name; the
//! menu's price is authoritative and unmatched names are silently dropped.
//! Quantity is servings **per guest**: the custom seat price is the per-seat
//! hall price plus the per-guest food additions, and the booking total moves
//! by that per-seat delta times the guest count.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::models::{FoodItem, Hall};
use crate::utils::money::{to_decimal, to_f64};

/// One requested custom-food line (client side; prices are ignored)
#[derive(Debug, Clone, Deserialize)]
pub struct FoodItemRequest {
    pub name: String,
    /// Servings per guest
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Match requested items against the hall menu.
///
/// Unmatched names are dropped without error; matched items take the menu
/// price. Non-positive quantities are clamped to 1.
pub fn match_menu_items(hall: &Hall, requested: &[FoodItemRequest]) -> Vec<FoodItem> {
    requested
        .iter()
        .filter_map(|req| {
            hall.menu_item(&req.name).map(|menu_item| FoodItem {
                name: menu_item.name.clone(),
                price: menu_item.price,
                quantity: req.quantity.max(1),
            })
        })
        .collect()
}

/// Per-guest food addition: Σ(menu price × servings per guest)
pub fn food_per_guest(items: &[FoodItem]) -> f64 {
    let sum = items.iter().fold(Decimal::ZERO, |acc, item| {
        acc + to_decimal(item.price) * Decimal::from(item.quantity)
    });
    to_f64(sum)
}

/// Custom seat price: hall per-seat price + per-guest food additions
pub fn custom_seat_price(hall_price: f64, items: &[FoodItem]) -> f64 {
    to_f64(to_decimal(hall_price) + to_decimal(food_per_guest(items)))
}

/// Booking-total delta when a food list is approved:
/// (custom seat price − hall price) × guest count
pub fn approval_delta(hall_price: f64, items: &[FoodItem], guests: i64) -> f64 {
    let per_seat = to_decimal(custom_seat_price(hall_price, items)) - to_decimal(hall_price);
    to_f64(per_seat * Decimal::from(guests))
}
