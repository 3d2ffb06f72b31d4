//! Booking Repository
//!
//! Owns the `booking` table and the `date_claim` liveness records that
//! serialize bookings per (hall, event date).
//!
//! # Date claims
//!
//! A live booking holds a `date_claim` record whose id is derived from the
//! hall key and the event date (`date_claim:⟨hallkey_yyyymmdd⟩`). Creating
//! the claim and the booking in one transaction makes the availability
//! check-and-insert atomic: a second booking for the same pair hits the
//! existing claim id and the whole transaction aborts. Void transitions
//! delete the claim; transitions back to a live status must re-create it.

use super::{
    BaseRepository, RepoError, RepoResult, TXN_RETRIES, is_record_exists, is_txn_conflict,
};
use crate::db::models::{Booking, BookingStatus};
use crate::utils::time::{date_key, format_date};
use chrono::NaiveDate;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

/// Claim record id key for a (hall, event date) pair
pub fn claim_key(hall: &RecordId, event_date: NaiveDate) -> String {
    format!("{}_{}", hall.key(), date_key(event_date))
}

#[derive(Clone)]
pub struct BookingRepository {
    base: BaseRepository,
}

impl BookingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find booking by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let booking: Option<Booking> = self.base.db().select(thing).await?;
        Ok(booking)
    }

    /// All bookings, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query("SELECT * FROM booking ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// A customer's bookings, newest first
    pub async fn find_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query("SELECT * FROM booking WHERE customer = $customer ORDER BY created_at DESC")
            .bind(("customer", customer.clone()))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// Bookings against any of the given halls, newest first
    pub async fn find_by_halls(&self, halls: Vec<RecordId>) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query("SELECT * FROM booking WHERE hall INSIDE $halls ORDER BY created_at DESC")
            .bind(("halls", halls))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// Completed bookings with no commission record — the reconciliation set
    pub async fn find_completed_without_commission(&self) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM booking
                WHERE status = 'completed'
                AND id NOTINSIDE (SELECT VALUE booking FROM commission_payment)"#,
            )
            .await?
            .take(0)?;
        Ok(bookings)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a booking and its date claim in one transaction.
    ///
    /// An existing claim for the (hall, event date) pair aborts the
    /// transaction and surfaces as `RepoError::Duplicate`. Optimistic commit
    /// conflicts are retried a bounded number of times.
    pub async fn create_with_claim(&self, booking: Booking) -> RepoResult<Booking> {
        let key = claim_key(&booking.hall, booking.event_date);
        let booking_key = Uuid::new_v4().simple().to_string();

        let mut data = serde_json::to_value(&booking)
            .map_err(|e| RepoError::Database(format!("Failed to serialize booking: {}", e)))?;
        if let Some(obj) = data.as_object_mut() {
            obj.remove("id");
            // customer 和 hall 走原生 RecordId 绑定；JSON 形式是字符串，
            // 存进去后与查询里绑定的 record id 永远不相等
            obj.remove("customer");
            obj.remove("hall");
        }

        let mut attempt = 0;
        loop {
            let outcome = self
                .try_create_with_claim(&booking, &key, &booking_key, data.clone())
                .await;
            match outcome {
                Err(ref e) if is_txn_conflict(e) && attempt < TXN_RETRIES => {
                    attempt += 1;
                    continue;
                }
                Err(e) if is_record_exists(&e) => {
                    return Err(RepoError::Duplicate(
                        "Hall is already booked for this date".to_string(),
                    ));
                }
                other => return other,
            }
        }
    }

    async fn try_create_with_claim(
        &self,
        booking: &Booking,
        key: &str,
        booking_key: &str,
        data: serde_json::Value,
    ) -> RepoResult<Booking> {
        let result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                CREATE type::thing('date_claim', $claim_key) SET
                    hall = $hall,
                    event_date = $event_date,
                    booking = type::thing('booking', $booking_key)
                RETURN NONE;
                CREATE type::thing('booking', $booking_key) CONTENT $data RETURN NONE;
                UPDATE type::thing('booking', $booking_key) SET
                    customer = $customer,
                    hall = $hall
                RETURN AFTER;
                COMMIT TRANSACTION;"#,
            )
            .bind(("claim_key", key.to_string()))
            .bind(("hall", booking.hall.clone()))
            .bind(("customer", booking.customer.clone()))
            .bind(("event_date", format_date(booking.event_date)))
            .bind(("booking_key", booking_key.to_string()))
            .bind(("data", data))
            .await?;

        let mut checked = result.check().map_err(RepoError::from)?;
        let created: Vec<Booking> = checked.take(2)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create booking".to_string()))
    }

    // =========================================================================
    // Payment transitions (guarded compare-and-set updates)
    // =========================================================================

    /// awaiting_payment → payment_submitted. Returns None when the booking is
    /// not in `awaiting_payment` (lost a race or wrong state).
    pub async fn submit_payment(
        &self,
        id: &RecordId,
        transaction_id: String,
        proof: String,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    transaction_id = $transaction_id,
                    payment_proof = $proof,
                    payment_rejection_reason = NONE,
                    status = 'payment_submitted',
                    updated_at = $now
                WHERE status = 'awaiting_payment'
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("transaction_id", transaction_id))
            .bind(("proof", proof))
            .bind(("now", now))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// payment_rejected → payment_submitted. Re-acquires the date claim in
    /// the same transaction; another live booking on the date surfaces as
    /// `RepoError::Duplicate`.
    pub async fn resubmit_payment(
        &self,
        booking: &Booking,
        id: &RecordId,
        transaction_id: String,
        proof: String,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let key = claim_key(&booking.hall, booking.event_date);

        let mut attempt = 0;
        loop {
            let outcome = self
                .try_resubmit(booking, id, &key, transaction_id.clone(), proof.clone(), now)
                .await;
            match outcome {
                Err(ref e) if is_txn_conflict(e) && attempt < TXN_RETRIES => {
                    attempt += 1;
                    continue;
                }
                Err(e) if is_record_exists(&e) => {
                    return Err(RepoError::Duplicate(
                        "Hall is already booked for this date".to_string(),
                    ));
                }
                other => return other,
            }
        }
    }

    async fn try_resubmit(
        &self,
        booking: &Booking,
        id: &RecordId,
        key: &str,
        transaction_id: String,
        proof: String,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                CREATE type::thing('date_claim', $claim_key) SET
                    hall = $hall,
                    event_date = $event_date,
                    booking = $thing
                RETURN NONE;
                UPDATE $thing SET
                    transaction_id = $transaction_id,
                    payment_proof = $proof,
                    payment_rejection_reason = NONE,
                    status = 'payment_submitted',
                    updated_at = $now
                WHERE status = 'payment_rejected'
                RETURN AFTER;
                COMMIT TRANSACTION;"#,
            )
            .bind(("claim_key", key.to_string()))
            .bind(("hall", booking.hall.clone()))
            .bind(("event_date", format_date(booking.event_date)))
            .bind(("thing", id.clone()))
            .bind(("transaction_id", transaction_id))
            .bind(("proof", proof))
            .bind(("now", now))
            .await?;

        let mut checked = result.check().map_err(RepoError::from)?;
        let updated: Vec<Booking> = checked.take(1)?;
        Ok(updated.into_iter().next())
    }

    /// payment_submitted → approved
    pub async fn verify_payment(
        &self,
        id: &RecordId,
        verifier: &RecordId,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    payment_verified = true,
                    prebooking_paid = true,
                    verified_by = $verifier,
                    verification_date = $now,
                    status = 'approved',
                    updated_at = $now
                WHERE status = 'payment_submitted'
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("verifier", verifier.clone()))
            .bind(("now", now))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// payment_submitted → payment_rejected. Releases the date claim in the
    /// same transaction; transaction id and proof are retained for reference.
    pub async fn reject_payment(
        &self,
        booking: &Booking,
        id: &RecordId,
        reason: String,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let key = claim_key(&booking.hall, booking.event_date);
        let result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE $thing SET
                    payment_verified = false,
                    payment_rejection_reason = $reason,
                    status = 'payment_rejected',
                    updated_at = $now
                WHERE status = 'payment_submitted'
                RETURN AFTER;
                DELETE type::thing('date_claim', $claim_key)
                    WHERE booking = $thing
                    AND booking.status INSIDE ['rejected', 'payment_rejected'];
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", id.clone()))
            .bind(("reason", reason))
            .bind(("now", now))
            .bind(("claim_key", key))
            .await?;

        let mut checked = result.check().map_err(RepoError::from)?;
        let updated: Vec<Booking> = checked.take(0)?;
        Ok(updated.into_iter().next())
    }

    // =========================================================================
    // Generic status transitions
    // =========================================================================

    /// Plain status update (liveness unchanged)
    pub async fn set_status(
        &self,
        id: &RecordId,
        status: BookingStatus,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status, updated_at = $now RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("status", status))
            .bind(("now", now))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Transition into a void status, releasing the date claim atomically
    pub async fn set_status_releasing_claim(
        &self,
        booking: &Booking,
        id: &RecordId,
        status: BookingStatus,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let key = claim_key(&booking.hall, booking.event_date);
        let result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE $thing SET status = $status, updated_at = $now RETURN AFTER;
                DELETE type::thing('date_claim', $claim_key)
                    WHERE booking = $thing
                    AND booking.status INSIDE ['rejected', 'payment_rejected'];
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", id.clone()))
            .bind(("status", status))
            .bind(("now", now))
            .bind(("claim_key", key))
            .await?;

        let mut checked = result.check().map_err(RepoError::from)?;
        let updated: Vec<Booking> = checked.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Transition from a void status back to a live one, re-acquiring the
    /// date claim. Fails with `RepoError::Duplicate` if the date was taken.
    pub async fn set_status_acquiring_claim(
        &self,
        booking: &Booking,
        id: &RecordId,
        status: BookingStatus,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let key = claim_key(&booking.hall, booking.event_date);

        let mut attempt = 0;
        loop {
            let outcome = self
                .try_set_status_acquiring_claim(booking, id, &key, status, now)
                .await;
            match outcome {
                Err(ref e) if is_txn_conflict(e) && attempt < TXN_RETRIES => {
                    attempt += 1;
                    continue;
                }
                Err(e) if is_record_exists(&e) => {
                    return Err(RepoError::Duplicate(
                        "Hall is already booked for this date".to_string(),
                    ));
                }
                other => return other,
            }
        }
    }

    async fn try_set_status_acquiring_claim(
        &self,
        booking: &Booking,
        id: &RecordId,
        key: &str,
        status: BookingStatus,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                CREATE type::thing('date_claim', $claim_key) SET
                    hall = $hall,
                    event_date = $event_date,
                    booking = $thing
                RETURN NONE;
                UPDATE $thing SET status = $status, updated_at = $now RETURN AFTER;
                COMMIT TRANSACTION;"#,
            )
            .bind(("claim_key", key.to_string()))
            .bind(("hall", booking.hall.clone()))
            .bind(("event_date", format_date(booking.event_date)))
            .bind(("thing", id.clone()))
            .bind(("status", status))
            .bind(("now", now))
            .await?;

        let mut checked = result.check().map_err(RepoError::from)?;
        let updated: Vec<Booking> = checked.take(1)?;
        Ok(updated.into_iter().next())
    }

    /// Mark completed and set the derived commission amount. Guarded so a
    /// repeat completion returns None instead of re-deriving.
    pub async fn complete(
        &self,
        id: &RecordId,
        commission_amount: f64,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'completed',
                    commission_amount = $commission_amount,
                    updated_at = $now
                WHERE status != 'completed'
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("commission_amount", commission_amount))
            .bind(("now", now))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    // =========================================================================
    // Custom food
    // =========================================================================

    /// Replace the proposed food list (back to pending)
    pub async fn set_custom_food(
        &self,
        id: &RecordId,
        items: Vec<crate::db::models::FoodItem>,
        custom_seat_price: f64,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    custom_food = $items,
                    custom_food_status = 'pending',
                    custom_seat_price = $custom_seat_price,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("items", items))
            .bind(("custom_seat_price", custom_seat_price))
            .bind(("now", now))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Approve the proposed food and apply the recomputed amounts
    pub async fn approve_custom_food(
        &self,
        id: &RecordId,
        custom_seat_price: f64,
        total_amount: f64,
        prebooking_amount: f64,
        now: i64,
    ) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    custom_food_status = 'approved',
                    custom_seat_price = $custom_seat_price,
                    total_amount = $total_amount,
                    prebooking_amount = $prebooking_amount,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("custom_seat_price", custom_seat_price))
            .bind(("total_amount", total_amount))
            .bind(("prebooking_amount", prebooking_amount))
            .bind(("now", now))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Reject the proposed food; amounts untouched
    pub async fn reject_custom_food(&self, id: &RecordId, now: i64) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    custom_food_status = 'rejected',
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("now", now))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete a booking, releasing its date claim in the same transaction
    pub async fn delete(&self, booking: &Booking, id: &RecordId) -> RepoResult<bool> {
        let key = claim_key(&booking.hall, booking.event_date);
        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                DELETE type::thing('date_claim', $claim_key) WHERE booking = $thing;
                DELETE $thing;
                COMMIT TRANSACTION;"#,
            )
            .bind(("claim_key", key))
            .bind(("thing", id.clone()))
            .await?
            .check()
            .map_err(RepoError::from)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_keys_are_deterministic() {
        let hall: RecordId = "hall:h1".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(claim_key(&hall, date), "h1_20251201");
        assert_eq!(claim_key(&hall, date), claim_key(&hall, date));
    }

    #[test]
    fn claim_keys_differ_per_hall_and_date() {
        let h1: RecordId = "hall:h1".parse().unwrap();
        let h2: RecordId = "hall:h2".parse().unwrap();
        let d1 = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        assert_ne!(claim_key(&h1, d1), claim_key(&h2, d1));
        assert_ne!(claim_key(&h1, d1), claim_key(&h1, d2));
    }
}
