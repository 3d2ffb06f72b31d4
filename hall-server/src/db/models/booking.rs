//! Booking Model
//!
//! A booking walks the payment state machine:
//! `awaiting_payment → payment_submitted → approved | payment_rejected`,
//! `payment_rejected → payment_submitted` (resubmit), `approved → completed`.
//! `rejected` and `payment_rejected` are void states: they release the
//! booked date for other customers.

use super::serde_helpers;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Booking ID type
pub type BookingId = RecordId;

/// Booking status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    AwaitingPayment,
    PaymentSubmitted,
    PaymentRejected,
    Approved,
    Rejected,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::AwaitingPayment => "awaiting_payment",
            BookingStatus::PaymentSubmitted => "payment_submitted",
            BookingStatus::PaymentRejected => "payment_rejected",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "awaiting_payment" => Some(BookingStatus::AwaitingPayment),
            "payment_submitted" => Some(BookingStatus::PaymentSubmitted),
            "payment_rejected" => Some(BookingStatus::PaymentRejected),
            "approved" => Some(BookingStatus::Approved),
            "rejected" => Some(BookingStatus::Rejected),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Void statuses do not hold the booked date
    pub fn is_void(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::PaymentRejected)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::AwaitingPayment
    }
}

/// Custom-food negotiation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CustomFoodStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl Default for CustomFoodStatus {
    fn default() -> Self {
        Self::None
    }
}

/// One accepted custom-food line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub name: String,
    /// Menu price of one serving
    pub price: f64,
    /// Servings **per guest** (the per-head multiplier, not an order total)
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Booking model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<BookingId>,
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub hall: RecordId,
    /// Whole-day granularity
    pub event_date: NaiveDate,
    pub guests_count: i64,
    pub total_amount: f64,
    /// 10% deposit, derived from total_amount
    pub prebooking_amount: f64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub payment_proof: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub payment_verified: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub prebooking_paid: bool,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub verified_by: Option<RecordId>,
    pub verification_date: Option<i64>,
    pub payment_rejection_reason: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub commission_paid: bool,
    /// 5% platform fee, set at the completed transition
    pub commission_amount: Option<f64>,
    #[serde(default)]
    pub custom_food: Vec<FoodItem>,
    /// hall.price + per-guest food additions, set when custom food is present
    pub custom_seat_price: Option<f64>,
    #[serde(default)]
    pub custom_food_status: CustomFoodStatus,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

fn default_payment_method() -> String {
    "cash".to_string()
}

impl Booking {
    pub fn new(
        customer: RecordId,
        hall: RecordId,
        event_date: NaiveDate,
        guests_count: i64,
        total_amount: f64,
        prebooking_amount: f64,
    ) -> Self {
        Self {
            id: None,
            customer,
            hall,
            event_date,
            guests_count,
            total_amount,
            prebooking_amount,
            status: BookingStatus::AwaitingPayment,
            payment_method: default_payment_method(),
            transaction_id: None,
            payment_proof: None,
            payment_verified: false,
            prebooking_paid: false,
            verified_by: None,
            verification_date: None,
            payment_rejection_reason: None,
            commission_paid: false,
            commission_amount: None,
            custom_food: Vec::new(),
            custom_seat_price: None,
            custom_food_status: CustomFoodStatus::None,
            created_at: None,
            updated_at: None,
        }
    }
}
