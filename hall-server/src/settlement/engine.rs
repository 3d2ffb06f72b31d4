//! Commission Settlement Engine
//!
//! Tracks the 5% platform fee a manager owes once a booking completes:
//! idempotent creation, proof upload, admin verification/rejection, the
//! destructive overdue sweep, and the reconciliation backfill that converges
//! commissions the inline completion path failed to create.

use serde::Serialize;
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::db::models::{Booking, CommissionPayment};
use crate::db::repository::{
    BookingRepository, CommissionRepository, HallRepository, UserRepository,
};
use crate::utils::money;
use crate::utils::time::millis_plus_days;
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// Days a manager has to settle a commission before the overdue sweep
pub const COMMISSION_DUE_DAYS: i64 = 2;

/// Outcome of one overdue sweep run
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    /// Pending records past their due date at sweep time
    pub overdue: usize,
    /// Records fully cascaded (halls + manager + record removed)
    pub swept: usize,
    /// Records left pending for the next run after a step failed
    pub failed: usize,
}

/// Outcome of one reconciliation run
#[derive(Debug, Default, Serialize)]
pub struct ReconcileReport {
    /// Completed bookings that got a fresh commission record
    pub created: usize,
    /// Bookings that already had one (lost race with the inline path)
    pub skipped: usize,
    /// Bookings whose hall or manager could not be resolved
    pub failed: usize,
}

#[derive(Clone)]
pub struct SettlementEngine {
    commissions: CommissionRepository,
    bookings: BookingRepository,
    halls: HallRepository,
    users: UserRepository,
}

impl SettlementEngine {
    pub fn new(
        commissions: CommissionRepository,
        bookings: BookingRepository,
        halls: HallRepository,
        users: UserRepository,
    ) -> Self {
        Self {
            commissions,
            bookings,
            halls,
            users,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list_all(&self) -> AppResult<Vec<CommissionPayment>> {
        Ok(self.commissions.find_all().await?)
    }

    pub async fn list_for_manager(&self, actor: &CurrentUser) -> AppResult<Vec<CommissionPayment>> {
        Ok(self.commissions.find_by_manager(&actor.record_id()?).await?)
    }

    /// Admin review queue: pending records with a submitted proof
    pub async fn list_pending_with_proof(&self) -> AppResult<Vec<CommissionPayment>> {
        Ok(self.commissions.find_pending_with_proof().await?)
    }

    // =========================================================================
    // Creation (exactly-once per booking)
    // =========================================================================

    /// Create the commission obligation for a freshly completed booking.
    ///
    /// Resolves the hall's manager and creates the record with
    /// `due_date = now + 2 days`. Idempotent: an existing record for the
    /// booking is returned untouched.
    pub async fn create_for_booking(
        &self,
        booking: &Booking,
        amount: f64,
        now: i64,
    ) -> AppResult<(CommissionPayment, bool)> {
        let booking_id = booking
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Booking record without id"))?;
        let hall = self
            .halls
            .find_by_record(&booking.hall)
            .await?
            .ok_or_else(|| AppError::not_found("Hall for this booking no longer exists"))?;
        self.users
            .find_by_record(&hall.manager)
            .await?
            .ok_or_else(|| AppError::not_found("Manager for this hall no longer exists"))?;

        let payment = CommissionPayment::new(
            booking_id,
            hall.manager,
            amount,
            millis_plus_days(now, COMMISSION_DUE_DAYS),
        );
        let (record, created) = self.commissions.create_idempotent(payment, now).await?;
        if created {
            tracing::info!(
                booking = %record.booking,
                manager = %record.manager,
                amount = record.amount,
                "Commission payment created"
            );
        }
        Ok((record, created))
    }

    // =========================================================================
    // Proof and admin review
    // =========================================================================

    /// Manager uploads (or re-uploads after rejection) a payment proof
    pub async fn upload_proof(
        &self,
        actor: &CurrentUser,
        id: &str,
        proof_path: String,
    ) -> AppResult<CommissionPayment> {
        let (payment, record) = self.load(id).await?;
        if payment.manager != actor.record_id()? {
            return Err(AppError::forbidden(
                "Only the owing manager may upload a payment proof",
            ));
        }

        self.commissions
            .set_proof(&record, proof_path)
            .await?
            .ok_or_else(|| AppError::conflict("Commission payment is already verified"))
    }

    /// Admin verifies the proof; the originating booking is flagged settled
    /// in the same database transaction.
    pub async fn verify(&self, actor: &CurrentUser, id: &str, now: i64) -> AppResult<CommissionPayment> {
        let (payment, record) = self.load(id).await?;
        self.commissions
            .verify_and_settle(&record, &actor.record_id()?, &payment.booking, now)
            .await?
            .ok_or_else(|| AppError::conflict("Commission payment is not pending"))
    }

    /// Admin rejects the proof. The stored proof is cleared so the manager
    /// must re-upload; the due date keeps running from creation.
    pub async fn reject(&self, id: &str, reason: String) -> AppResult<CommissionPayment> {
        validate_required_text(&reason, "Rejection reason", MAX_NOTE_LEN)
            .map_err(|_| AppError::validation("Rejection reason is required"))?;

        let (_, record) = self.load(id).await?;
        self.commissions
            .reject(&record, reason)
            .await?
            .ok_or_else(|| AppError::conflict("Commission payment is not pending"))
    }

    // =========================================================================
    // OverdueSweep
    // =========================================================================

    /// Delete managers who let a commission lapse past its due date.
    ///
    /// Cascade order per record: halls → manager account → payment record,
    /// each step idempotent. A failed step leaves the record pending and the
    /// loop moves on; the next sweep re-runs the remaining steps.
    pub async fn overdue_sweep(&self, now: i64) -> SweepReport {
        let mut report = SweepReport::default();

        let overdue = match self.commissions.find_overdue(now).await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(error = %e, "Overdue sweep query failed");
                return report;
            }
        };
        report.overdue = overdue.len();

        for payment in overdue {
            match self.sweep_one(&payment).await {
                Ok(()) => report.swept += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        payment = ?payment.id,
                        manager = %payment.manager,
                        error = %e,
                        "Overdue cascade failed; record stays pending for the next sweep"
                    );
                }
            }
        }

        if report.overdue > 0 {
            tracing::warn!(
                overdue = report.overdue,
                swept = report.swept,
                failed = report.failed,
                "Overdue commission sweep finished"
            );
        }
        report
    }

    async fn sweep_one(&self, payment: &CommissionPayment) -> AppResult<()> {
        let record = payment
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Commission record without id"))?;

        let halls_deleted = self.halls.delete_by_manager(&payment.manager).await?;
        let user_deleted = self.users.delete_by_record(&payment.manager).await?;
        self.commissions.delete_by_record(&record).await?;

        tracing::warn!(
            manager = %payment.manager,
            halls_deleted,
            user_deleted,
            amount = payment.amount,
            "Manager removed for overdue commission"
        );
        Ok(())
    }

    // =========================================================================
    // Reconciliation (backfill)
    // =========================================================================

    /// Create the missing commission record for every completed booking that
    /// lacks one. Convergence mechanism for the completion soft failure;
    /// safe to run repeatedly.
    pub async fn reconcile_missing(&self, now: i64) -> AppResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        let orphans = self.bookings.find_completed_without_commission().await?;
        for booking in orphans {
            let amount = booking
                .commission_amount
                .unwrap_or_else(|| money::commission_amount(booking.total_amount));
            match self.create_for_booking(&booking, amount, now).await {
                Ok((_, true)) => report.created += 1,
                Ok((_, false)) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        booking = ?booking.id,
                        error = %e,
                        "Reconciliation could not create commission"
                    );
                }
            }
        }

        if report.created > 0 || report.failed > 0 {
            tracing::info!(
                created = report.created,
                skipped = report.skipped,
                failed = report.failed,
                "Commission reconciliation finished"
            );
        }
        Ok(report)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn load(&self, id: &str) -> AppResult<(CommissionPayment, RecordId)> {
        let payment = self
            .commissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Payment record not found"))?;
        let record = payment
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Commission record without id"))?;
        Ok((payment, record))
    }
}
