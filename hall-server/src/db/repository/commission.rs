//! Commission Payment Repository
//!
//! 佣金记录表。`booking` 字段带唯一索引 (见 db::define_schema)，
//! 保证每个 booking 最多一条佣金记录 —— 幂等创建依赖该索引。

use super::{BaseRepository, RepoError, RepoResult, is_index_conflict, is_record_exists};
use crate::db::models::CommissionPayment;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct CommissionRepository {
    base: BaseRepository,
}

impl CommissionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find commission payment by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<CommissionPayment>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let payment: Option<CommissionPayment> = self.base.db().select(thing).await?;
        Ok(payment)
    }

    /// Find the commission record for a booking, if one exists
    pub async fn find_by_booking(&self, booking: &RecordId) -> RepoResult<Option<CommissionPayment>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM commission_payment WHERE booking = $booking LIMIT 1")
            .bind(("booking", booking.clone()))
            .await?;
        let payments: Vec<CommissionPayment> = result.take(0)?;
        Ok(payments.into_iter().next())
    }

    /// A manager's commission payments, newest first
    pub async fn find_by_manager(&self, manager: &RecordId) -> RepoResult<Vec<CommissionPayment>> {
        let payments: Vec<CommissionPayment> = self
            .base
            .db()
            .query(
                "SELECT * FROM commission_payment WHERE manager = $manager ORDER BY created_at DESC",
            )
            .bind(("manager", manager.clone()))
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// All commission payments, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<CommissionPayment>> {
        let payments: Vec<CommissionPayment> = self
            .base
            .db()
            .query("SELECT * FROM commission_payment ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// Pending records with a submitted proof — the admin review queue
    pub async fn find_pending_with_proof(&self) -> RepoResult<Vec<CommissionPayment>> {
        let payments: Vec<CommissionPayment> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM commission_payment
                WHERE status = 'pending' AND payment_proof != NONE
                ORDER BY due_date ASC"#,
            )
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// Pending records past their due date at the given instant
    pub async fn find_overdue(&self, now: i64) -> RepoResult<Vec<CommissionPayment>> {
        let payments: Vec<CommissionPayment> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM commission_payment
                WHERE status = 'pending' AND due_date < $now
                ORDER BY due_date ASC"#,
            )
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(payments)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Idempotent create: at most one record per booking.
    ///
    /// Returns `(record, true)` when a new record was created, or
    /// `(existing, false)` when the booking already had one. The unique index
    /// on `booking` closes the check-then-create race between the inline
    /// completion path and the reconciliation task.
    pub async fn create_idempotent(
        &self,
        payment: CommissionPayment,
        now: i64,
    ) -> RepoResult<(CommissionPayment, bool)> {
        if let Some(existing) = self.find_by_booking(&payment.booking).await? {
            return Ok((existing, false));
        }

        let created = self.try_create(payment.clone(), now).await;
        match created {
            Ok(record) => Ok((record, true)),
            Err(ref e) if is_index_conflict(e) || is_record_exists(e) => {
                // Lost the race; the winner's record is authoritative
                let existing = self.find_by_booking(&payment.booking).await?.ok_or_else(|| {
                    RepoError::Database("Commission record vanished after index conflict".to_string())
                })?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }

    async fn try_create(&self, payment: CommissionPayment, now: i64) -> RepoResult<CommissionPayment> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE commission_payment SET
                    booking = $booking,
                    manager = $manager,
                    amount = $amount,
                    payment_proof = NONE,
                    status = 'pending',
                    due_date = $due_date,
                    verified_by = NONE,
                    rejection_reason = NONE,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("booking", payment.booking))
            .bind(("manager", payment.manager))
            .bind(("amount", payment.amount))
            .bind(("due_date", payment.due_date))
            .bind(("now", now))
            .await?;

        let created: Option<CommissionPayment> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create commission payment".to_string()))
    }

    // =========================================================================
    // Settlement transitions (guarded compare-and-set updates)
    // =========================================================================

    /// Store a manager-submitted proof. A rejected record goes back to
    /// pending so the admin sees the re-upload.
    pub async fn set_proof(
        &self,
        id: &RecordId,
        proof: String,
    ) -> RepoResult<Option<CommissionPayment>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    payment_proof = $proof,
                    status = 'pending'
                WHERE status != 'verified'
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("proof", proof))
            .await?;
        let updated: Vec<CommissionPayment> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// pending → verified, flagging the originating booking as settled in
    /// the same transaction. Returns None when the record is not pending;
    /// the booking flag only flips when the record actually verified.
    pub async fn verify_and_settle(
        &self,
        id: &RecordId,
        verifier: &RecordId,
        booking: &RecordId,
        now: i64,
    ) -> RepoResult<Option<CommissionPayment>> {
        let result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE $thing SET
                    status = 'verified',
                    verified_by = $verifier
                WHERE status = 'pending'
                RETURN AFTER;
                UPDATE $booking SET
                    commission_paid = true,
                    updated_at = $now
                WHERE $thing.status = 'verified'
                RETURN NONE;
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", id.clone()))
            .bind(("verifier", verifier.clone()))
            .bind(("booking", booking.clone()))
            .bind(("now", now))
            .await?;
        let mut checked = result.check().map_err(RepoError::from)?;
        let updated: Vec<CommissionPayment> = checked.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// pending → rejected. Clears the stored proof so the manager must
    /// re-upload; due_date is untouched.
    pub async fn reject(
        &self,
        id: &RecordId,
        reason: String,
    ) -> RepoResult<Option<CommissionPayment>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'rejected',
                    rejection_reason = $reason,
                    payment_proof = NONE
                WHERE status = 'pending'
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("reason", reason))
            .await?;
        let updated: Vec<CommissionPayment> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Hard delete a record. Idempotent: deleting a missing record is Ok.
    pub async fn delete_by_record(&self, id: &RecordId) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("DELETE $thing RETURN BEFORE")
            .bind(("thing", id.clone()))
            .await?;
        let deleted: Vec<CommissionPayment> = result.take(0)?;
        Ok(!deleted.is_empty())
    }
}
