//! Commission Payment Model
//!
//! The 5% platform fee owed by a manager once a booking completes. Each
//! record carries a 2-day due window; a `pending` record past its due date
//! is picked up by the overdue sweep.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Commission payment ID type
pub type CommissionId = RecordId;

/// Commission settlement status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Verified,
    Rejected,
}

impl Default for CommissionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Commission payment matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionPayment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CommissionId>,
    /// Originating booking (unique — one commission per booking)
    #[serde(with = "serde_helpers::record_id")]
    pub booking: RecordId,
    /// Manager who owes the fee
    #[serde(with = "serde_helpers::record_id")]
    pub manager: RecordId,
    pub amount: f64,
    pub payment_proof: Option<String>,
    #[serde(default)]
    pub status: CommissionStatus,
    /// Unix millis; creation instant + 2 days
    pub due_date: i64,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub verified_by: Option<RecordId>,
    pub rejection_reason: Option<String>,
    pub created_at: Option<i64>,
}

impl CommissionPayment {
    pub fn new(booking: RecordId, manager: RecordId, amount: f64, due_date: i64) -> Self {
        Self {
            id: None,
            booking,
            manager,
            amount,
            payment_proof: None,
            status: CommissionStatus::Pending,
            due_date,
            verified_by: None,
            rejection_reason: None,
            created_at: None,
        }
    }

    pub fn is_overdue(&self, now_millis: i64) -> bool {
        self.status == CommissionStatus::Pending && self.due_date < now_millis
    }
}
