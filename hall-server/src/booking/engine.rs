//! Booking Lifecycle Engine
//!
//! Owns the booking state machine:
//!
//! ```text
//! awaiting_payment → payment_submitted → approved | payment_rejected
//! payment_rejected → payment_submitted   (resubmit, re-acquires the date)
//! approved → completed                   (triggers commission creation)
//! ```
//!
//! `rejected` and `payment_rejected` are void: they release the date claim
//! so another customer can take the slot. All ownership checks live here;
//! handlers only translate HTTP to engine calls.

use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::booking::food::{self, FoodItemRequest};
use crate::db::models::{Booking, BookingStatus, CustomFoodStatus, Hall};
use crate::db::repository::{BookingRepository, HallRepository};
use crate::settlement::SettlementEngine;
use crate::utils::money;
use crate::utils::validation::{MAX_MENU_ITEMS, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use serde::Deserialize;

/// Create booking payload
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub hall_id: String,
    /// YYYY-MM-DD
    pub event_date: String,
    pub guests_count: i64,
    /// Optional client-side figure, cross-checked against the server's
    /// authoritative computation (hall.price × guests)
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub custom_food: Vec<FoodItemRequest>,
}

#[derive(Clone)]
pub struct BookingEngine {
    bookings: BookingRepository,
    halls: HallRepository,
    settlement: SettlementEngine,
}

impl BookingEngine {
    pub fn new(
        bookings: BookingRepository,
        halls: HallRepository,
        settlement: SettlementEngine,
    ) -> Self {
        Self {
            bookings,
            halls,
            settlement,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list_all(&self) -> AppResult<Vec<Booking>> {
        Ok(self.bookings.find_all().await?)
    }

    pub async fn list_for_customer(&self, actor: &CurrentUser) -> AppResult<Vec<Booking>> {
        Ok(self.bookings.find_by_customer(&actor.record_id()?).await?)
    }

    /// Bookings against any hall the manager owns
    pub async fn list_for_manager(&self, actor: &CurrentUser) -> AppResult<Vec<Booking>> {
        let halls = self.halls.find_by_manager(&actor.record_id()?).await?;
        let hall_ids: Vec<RecordId> = halls.into_iter().filter_map(|h| h.id).collect();
        if hall_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.bookings.find_by_halls(hall_ids).await?)
    }

    /// Fetch one booking; visible to its customer, the hall's manager, admin
    pub async fn get_booking(&self, actor: &CurrentUser, id: &str) -> AppResult<Booking> {
        let (booking, _) = self.load(id).await?;
        if actor.is_admin() || booking.customer == actor.record_id()? {
            return Ok(booking);
        }
        let hall = self.halls.find_by_record(&booking.hall).await?;
        if let Some(hall) = hall
            && hall.manager == actor.record_id()?
        {
            return Ok(booking);
        }
        Err(AppError::forbidden("Not allowed to view this booking"))
    }

    // =========================================================================
    // CreateBooking
    // =========================================================================

    /// Create a booking with server-side pricing and an atomic date claim.
    ///
    /// The claim record and the booking are written in one transaction, so
    /// two concurrent requests for the same (hall, date) cannot both succeed.
    pub async fn create_booking(
        &self,
        actor: &CurrentUser,
        req: CreateBookingRequest,
        now: i64,
    ) -> AppResult<Booking> {
        let event_date = crate::utils::time::parse_date(&req.event_date)?;

        if req.guests_count < 1 {
            return Err(AppError::validation("Guest count must be at least 1"));
        }
        if req.custom_food.len() > MAX_MENU_ITEMS {
            return Err(AppError::validation(format!(
                "Too many custom food items (max {MAX_MENU_ITEMS})"
            )));
        }

        let hall = self
            .halls
            .find_by_id(&req.hall_id)
            .await?
            .ok_or_else(|| AppError::invalid("Hall not found"))?;
        let hall_id = hall
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Hall record without id"))?;

        if req.guests_count > hall.capacity {
            return Err(AppError::validation(format!(
                "Guest count cannot exceed hall capacity of {}",
                hall.capacity
            )));
        }
        if hall.is_date_blocked(event_date) {
            return Err(AppError::validation(
                "This date is unavailable (booked by manager)",
            ));
        }

        // Authoritative pricing: the client's figure is only a confirmation
        money::validate_amount(hall.price, "hall price", money::MAX_PRICE)?;
        let total_amount = money::seat_total(hall.price, req.guests_count);
        money::validate_amount(total_amount, "totalAmount", money::MAX_TOTAL_AMOUNT)?;
        if let Some(client_total) = req.total_amount
            && (client_total - total_amount).abs() > 0.005
        {
            return Err(AppError::validation(format!(
                "Total amount mismatch: expected {}",
                total_amount
            )));
        }
        let prebooking_amount = money::prebooking_amount(total_amount);

        // Custom food: charged only upon approval, never at creation
        let accepted = food::match_menu_items(&hall, &req.custom_food);

        let mut booking = Booking::new(
            actor.record_id()?,
            hall_id,
            event_date,
            req.guests_count,
            total_amount,
            prebooking_amount,
        );
        if !accepted.is_empty() {
            booking.custom_seat_price = Some(food::custom_seat_price(hall.price, &accepted));
            booking.custom_food = accepted;
            booking.custom_food_status = CustomFoodStatus::Pending;
        }
        booking.created_at = Some(now);
        booking.updated_at = Some(now);

        Ok(self.bookings.create_with_claim(booking).await?)
    }

    // =========================================================================
    // Payment flow
    // =========================================================================

    /// Customer submits (or resubmits) transaction id + proof reference.
    ///
    /// Resubmission from `payment_rejected` re-acquires the date claim; if
    /// another live booking took the date meanwhile this fails with the
    /// double-booking conflict.
    pub async fn submit_payment_proof(
        &self,
        actor: &CurrentUser,
        id: &str,
        transaction_id: String,
        proof_path: String,
        now: i64,
    ) -> AppResult<Booking> {
        validate_required_text(&transaction_id, "Transaction ID", MAX_SHORT_TEXT_LEN)
            .map_err(|_| AppError::validation("Transaction ID is required"))?;

        let (booking, record) = self.load(id).await?;
        if booking.customer != actor.record_id()? {
            return Err(AppError::forbidden(
                "Only the booking's customer may submit payment proof",
            ));
        }

        let updated = match booking.status {
            BookingStatus::AwaitingPayment => {
                self.bookings
                    .submit_payment(&record, transaction_id, proof_path, now)
                    .await?
            }
            BookingStatus::PaymentRejected => {
                self.bookings
                    .resubmit_payment(&booking, &record, transaction_id, proof_path, now)
                    .await?
            }
            _ => None,
        };

        updated.ok_or_else(|| {
            AppError::conflict("Payment proof already submitted or booking is not awaiting payment")
        })
    }

    /// Manager of the booking's hall verifies the submitted payment
    pub async fn verify_payment(&self, actor: &CurrentUser, id: &str, now: i64) -> AppResult<Booking> {
        let (booking, record) = self.load(id).await?;
        self.ensure_hall_manager(actor, &booking).await?;

        self.bookings
            .verify_payment(&record, &actor.record_id()?, now)
            .await?
            .ok_or_else(|| AppError::conflict("No payment proof submitted for this booking"))
    }

    /// Manager rejects the submitted payment; the date claim is released so
    /// other customers can book the slot. Proof is retained for reference.
    pub async fn reject_payment(
        &self,
        actor: &CurrentUser,
        id: &str,
        reason: String,
        now: i64,
    ) -> AppResult<Booking> {
        validate_required_text(&reason, "Rejection reason", MAX_NOTE_LEN)
            .map_err(|_| AppError::validation("Rejection reason is required"))?;

        let (booking, record) = self.load(id).await?;
        self.ensure_hall_manager(actor, &booking).await?;

        self.bookings
            .reject_payment(&booking, &record, reason, now)
            .await?
            .ok_or_else(|| AppError::conflict("No payment proof submitted for this booking"))
    }

    // =========================================================================
    // UpdateStatus (generic transition, completion → commission trigger)
    // =========================================================================

    /// Generic status transition for admin/manager.
    ///
    /// Claim maintenance: live → void releases the date claim; void → live
    /// re-acquires it (double-booking conflict if the date was taken).
    ///
    /// The transition into `completed` derives the 5% commission and invokes
    /// the settlement engine. If hall or manager resolution fails, the
    /// status change still commits — the omission is logged and the periodic
    /// reconciliation converges it later.
    pub async fn update_status(
        &self,
        actor: &CurrentUser,
        id: &str,
        new_status: &str,
        now: i64,
    ) -> AppResult<Booking> {
        let status = BookingStatus::parse(new_status)
            .ok_or_else(|| AppError::validation(format!("Unknown status: {}", new_status)))?;

        let (booking, record) = self.load(id).await?;
        if !actor.is_admin() {
            self.ensure_hall_manager(actor, &booking).await?;
        }

        if status == BookingStatus::Completed {
            return self.complete_booking(booking, record, now).await;
        }

        let updated = match (booking.status.is_void(), status.is_void()) {
            (false, true) => {
                self.bookings
                    .set_status_releasing_claim(&booking, &record, status, now)
                    .await?
            }
            (true, false) => {
                self.bookings
                    .set_status_acquiring_claim(&booking, &record, status, now)
                    .await?
            }
            _ => self.bookings.set_status(&record, status, now).await?,
        };

        updated.ok_or_else(|| AppError::not_found(format!("Booking {} not found", id)))
    }

    async fn complete_booking(
        &self,
        booking: Booking,
        record: RecordId,
        now: i64,
    ) -> AppResult<Booking> {
        if booking.status == BookingStatus::Completed {
            return Err(AppError::conflict("Booking is already completed"));
        }

        // A voided booking being completed must hold the date again
        if booking.status.is_void() {
            self.bookings
                .set_status_acquiring_claim(&booking, &record, BookingStatus::Approved, now)
                .await?;
        }

        let commission = money::commission_amount(booking.total_amount);
        let updated = self
            .bookings
            .complete(&record, commission, now)
            .await?
            .ok_or_else(|| AppError::conflict("Booking is already completed"))?;

        // Soft failure by design: the completed status stands even when the
        // commission record cannot be created; reconciliation converges it.
        if let Err(e) = self
            .settlement
            .create_for_booking(&updated, commission, now)
            .await
        {
            tracing::error!(
                booking = %record,
                error = %e,
                "Commission creation failed after completion; reconciliation will retry"
            );
        }

        Ok(updated)
    }

    // =========================================================================
    // Custom food
    // =========================================================================

    /// Customer proposes a replacement food list (status back to pending)
    pub async fn add_custom_food(
        &self,
        actor: &CurrentUser,
        id: &str,
        items: Vec<FoodItemRequest>,
        now: i64,
    ) -> AppResult<Booking> {
        if items.len() > MAX_MENU_ITEMS {
            return Err(AppError::validation(format!(
                "Too many custom food items (max {MAX_MENU_ITEMS})"
            )));
        }

        let (booking, record) = self.load(id).await?;
        if booking.customer != actor.record_id()? {
            return Err(AppError::forbidden(
                "Only the booking's customer may request custom food",
            ));
        }
        if matches!(
            booking.status,
            BookingStatus::Completed | BookingStatus::Rejected
        ) {
            return Err(AppError::business_rule(
                "Custom food cannot be changed on a completed or rejected booking",
            ));
        }

        let hall = self.load_hall(&booking).await?;
        let accepted = food::match_menu_items(&hall, &items);
        if accepted.is_empty() {
            return Err(AppError::validation(
                "No requested item matches the hall menu",
            ));
        }
        let custom_seat_price = food::custom_seat_price(hall.price, &accepted);

        self.bookings
            .set_custom_food(&record, accepted, custom_seat_price, now)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", id)))
    }

    /// Manager approves or rejects the pending food request.
    ///
    /// Approval recomputes the seat price and moves the booking total by
    /// (custom seat price − hall price) × guests; the 10% deposit follows.
    /// Rejection only flips the food status.
    pub async fn set_custom_food_status(
        &self,
        actor: &CurrentUser,
        id: &str,
        status: &str,
        now: i64,
    ) -> AppResult<Booking> {
        let approve = match status {
            "approved" => true,
            "rejected" => false,
            other => {
                return Err(AppError::validation(format!(
                    "Custom food status must be 'approved' or 'rejected', got '{}'",
                    other
                )));
            }
        };

        let (booking, record) = self.load(id).await?;
        let hall = self.ensure_hall_manager(actor, &booking).await?;

        if booking.status == BookingStatus::Completed {
            // Approving now would mutate the total after the commission
            // was derived from it
            return Err(AppError::business_rule(
                "Custom food cannot be decided on a completed booking",
            ));
        }
        if booking.custom_food_status != CustomFoodStatus::Pending {
            return Err(AppError::conflict("No pending custom food request"));
        }

        let updated = if approve {
            let custom_seat_price = food::custom_seat_price(hall.price, &booking.custom_food);
            let delta = food::approval_delta(hall.price, &booking.custom_food, booking.guests_count);
            let total_amount = money::to_f64(
                money::to_decimal(booking.total_amount) + money::to_decimal(delta),
            );
            money::validate_amount(total_amount, "totalAmount", money::MAX_TOTAL_AMOUNT)?;
            let prebooking_amount = money::prebooking_amount(total_amount);
            self.bookings
                .approve_custom_food(&record, custom_seat_price, total_amount, prebooking_amount, now)
                .await?
        } else {
            self.bookings.reject_custom_food(&record, now).await?
        };

        updated.ok_or_else(|| AppError::not_found(format!("Booking {} not found", id)))
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Admin or owning manager removes a booking; the date claim goes with it
    pub async fn delete_booking(&self, actor: &CurrentUser, id: &str) -> AppResult<()> {
        let (booking, record) = self.load(id).await?;
        if !actor.is_admin() {
            self.ensure_hall_manager(actor, &booking).await?;
        }
        self.bookings.delete(&booking, &record).await?;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn load(&self, id: &str) -> AppResult<(Booking, RecordId)> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", id)))?;
        let record = booking
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Booking record without id"))?;
        Ok((booking, record))
    }

    async fn load_hall(&self, booking: &Booking) -> AppResult<Hall> {
        self.halls
            .find_by_record(&booking.hall)
            .await?
            .ok_or_else(|| AppError::not_found("Hall for this booking no longer exists"))
    }

    /// Actor must be the manager owning the booking's hall (admin exempt)
    async fn ensure_hall_manager(&self, actor: &CurrentUser, booking: &Booking) -> AppResult<Hall> {
        let hall = self.load_hall(booking).await?;
        if !actor.is_admin() && hall.manager != actor.record_id()? {
            return Err(AppError::forbidden(
                "Only the hall's manager may perform this action",
            ));
        }
        Ok(hall)
    }
}
