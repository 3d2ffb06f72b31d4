//! Commission settlement: exactly-once creation, proof review cycle,
//! reconciliation backfill and the destructive overdue sweep.

mod common;

use common::{DAY_MILLIS, NOW, create_hall, hall_id, register, setup};
use hall_server::booking::CreateBookingRequest;
use hall_server::db::models::{CommissionStatus, UserRole};
use hall_server::utils::AppError;

fn request(hall_id: String, date: &str, guests: i64) -> CreateBookingRequest {
    CreateBookingRequest {
        hall_id,
        event_date: date.to_string(),
        guests_count: guests,
        total_amount: None,
        custom_food: vec![],
    }
}

/// Drive a fresh booking all the way to completed; returns its id string.
async fn completed_booking(
    app: &common::TestApp,
    manager_actor: &hall_server::auth::CurrentUser,
    customer: &hall_server::auth::CurrentUser,
    hall_id_str: String,
    date: &str,
    now: i64,
) -> String {
    let booking = app
        .booking_engine
        .create_booking(customer, request(hall_id_str, date, 50), now)
        .await
        .unwrap();
    let id = booking.id.clone().unwrap().to_string();
    app.booking_engine
        .submit_payment_proof(customer, &id, "TX1".into(), "p.png".into(), now)
        .await
        .unwrap();
    app.booking_engine
        .verify_payment(manager_actor, &id, now)
        .await
        .unwrap();
    app.booking_engine
        .update_status(manager_actor, &id, "completed", now)
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn commission_is_created_exactly_once() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let id = completed_booking(&app, &manager_actor, &customer, hall_id(&hall), "2025-12-01", NOW).await;

    let booking = app.bookings.find_by_id(&id).await.unwrap().unwrap();
    let record = booking.id.clone().unwrap();

    // Direct re-creation attempts return the existing record untouched
    let (first, created) = app
        .settlement
        .create_for_booking(&booking, 2_500.0, NOW + 999)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(first.due_date, NOW + 2 * DAY_MILLIS);

    assert_eq!(app.settlement.list_all().await.unwrap().len(), 1);
    assert!(app.commissions.find_by_booking(&record).await.unwrap().is_some());
}

#[tokio::test]
async fn reconciliation_backfills_missing_commissions() {
    let app = setup().await;
    let (manager, _) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    // Complete at the repository level, bypassing the inline commission
    // creation — the state a completion soft failure leaves behind
    let booking = app
        .booking_engine
        .create_booking(&customer, request(hall_id(&hall), "2025-12-01", 50), NOW)
        .await
        .unwrap();
    let record = booking.id.clone().unwrap();
    app.bookings.complete(&record, 2_500.0, NOW).await.unwrap();

    assert!(app.settlement.list_all().await.unwrap().is_empty());

    let report = app.settlement.reconcile_missing(NOW).await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, 0);

    let payment = app
        .commissions
        .find_by_booking(&record)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.amount, 2_500.0);
    assert_eq!(payment.due_date, NOW + 2 * DAY_MILLIS);

    // Running again converges to a no-op
    let report = app.settlement.reconcile_missing(NOW).await.unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(app.settlement.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn proof_review_cycle() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, other_manager) = register(&app, "Oscar", "oscar@test.io", UserRole::Manager).await;
    let (_, admin) = register(&app, "Root", "root@test.io", UserRole::Admin).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let booking_id =
        completed_booking(&app, &manager_actor, &customer, hall_id(&hall), "2025-12-01", NOW).await;
    let payment = app.settlement.list_all().await.unwrap().remove(0);
    let payment_id = payment.id.clone().unwrap().to_string();

    // Only the owing manager may upload
    let err = app
        .settlement
        .upload_proof(&other_manager, &payment_id, "transfer.png".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    app.settlement
        .upload_proof(&manager_actor, &payment_id, "transfer.png".into())
        .await
        .unwrap();
    assert_eq!(app.settlement.list_pending_with_proof().await.unwrap().len(), 1);

    // Admin rejects: proof cleared, manager must re-upload
    let rejected = app
        .settlement
        .reject(&payment_id, "Wrong account".into())
        .await
        .unwrap();
    assert_eq!(rejected.status, CommissionStatus::Rejected);
    assert!(rejected.payment_proof.is_none());
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Wrong account"));

    // Rejecting twice: the record is no longer pending
    let err = app
        .settlement
        .reject(&payment_id, "again".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Re-upload puts it back in the review queue
    let reuploaded = app
        .settlement
        .upload_proof(&manager_actor, &payment_id, "transfer2.png".into())
        .await
        .unwrap();
    assert_eq!(reuploaded.status, CommissionStatus::Pending);

    // Verification settles the originating booking
    let verified = app.settlement.verify(&admin, &payment_id, NOW).await.unwrap();
    assert_eq!(verified.status, CommissionStatus::Verified);

    let booking = app.bookings.find_by_id(&booking_id).await.unwrap().unwrap();
    assert!(booking.commission_paid);

    // A verified record refuses further proof uploads
    let err = app
        .settlement
        .upload_proof(&manager_actor, &payment_id, "late.png".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn overdue_sweep_cascades_and_spares_the_rest() {
    let app = setup().await;
    let (late_manager, late_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (good_manager, good_actor) = register(&app, "Oscar", "oscar@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;

    let late_hall = create_hall(&app, &late_manager, "Late Hall", 100, 1000.0, vec![]).await;
    let late_hall_2 = create_hall(&app, &late_manager, "Late Hall 2", 100, 1000.0, vec![]).await;
    let good_hall = create_hall(&app, &good_manager, "Good Hall", 100, 1000.0, vec![]).await;

    // Late manager's commission created at NOW (due NOW + 2d)
    completed_booking(&app, &late_actor, &customer, hall_id(&late_hall), "2025-12-01", NOW).await;
    // Good manager's created a day later (due NOW + 3d)
    completed_booking(&app, &good_actor, &customer, hall_id(&good_hall), "2025-12-02", NOW + DAY_MILLIS)
        .await;

    // Sweep just past the late due date
    let report = app.settlement.overdue_sweep(NOW + 2 * DAY_MILLIS + 1).await;
    assert_eq!(report.overdue, 1);
    assert_eq!(report.swept, 1);
    assert_eq!(report.failed, 0);

    // Late manager, both their halls and the payment record are gone
    let late_id = late_manager.id.clone().unwrap();
    assert!(app.users.find_by_record(&late_id).await.unwrap().is_none());
    assert!(app.halls.find_by_manager(&late_id).await.unwrap().is_empty());
    assert!(
        app.halls
            .find_by_record(&late_hall_2.id.clone().unwrap())
            .await
            .unwrap()
            .is_none()
    );

    // Good manager untouched, their record still pending
    let good_id = good_manager.id.clone().unwrap();
    assert!(app.users.find_by_record(&good_id).await.unwrap().is_some());
    assert_eq!(app.halls.find_by_manager(&good_id).await.unwrap().len(), 1);

    let remaining = app.settlement.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].manager, good_id);

    // Re-running at the same instant is a no-op
    let report = app.settlement.overdue_sweep(NOW + 2 * DAY_MILLIS + 1).await;
    assert_eq!(report.overdue, 0);
}

#[tokio::test]
async fn verified_and_future_commissions_never_sweep() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, admin) = register(&app, "Root", "root@test.io", UserRole::Admin).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    completed_booking(&app, &manager_actor, &customer, hall_id(&hall), "2025-12-01", NOW).await;
    let payment = app.settlement.list_all().await.unwrap().remove(0);
    let payment_id = payment.id.clone().unwrap().to_string();

    app.settlement
        .upload_proof(&manager_actor, &payment_id, "transfer.png".into())
        .await
        .unwrap();
    app.settlement.verify(&admin, &payment_id, NOW).await.unwrap();

    // Far past the due date, a verified record is not overdue
    let report = app.settlement.overdue_sweep(NOW + 30 * DAY_MILLIS).await;
    assert_eq!(report.overdue, 0);
    assert!(
        app.users
            .find_by_record(&manager.id.clone().unwrap())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn booking_settles_only_when_verification_commits() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, admin) = register(&app, "Root", "root@test.io", UserRole::Admin).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let booking_id =
        completed_booking(&app, &manager_actor, &customer, hall_id(&hall), "2025-12-01", NOW).await;
    let payment = app.settlement.list_all().await.unwrap().remove(0);
    let payment_id = payment.id.clone().unwrap().to_string();

    app.settlement
        .upload_proof(&manager_actor, &payment_id, "transfer.png".into())
        .await
        .unwrap();
    app.settlement
        .reject(&payment_id, "Wrong account".into())
        .await
        .unwrap();

    // A rejected record refuses verification and the booking stays unsettled
    let err = app.settlement.verify(&admin, &payment_id, NOW).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let booking = app.bookings.find_by_id(&booking_id).await.unwrap().unwrap();
    assert!(!booking.commission_paid);

    // Re-upload and verify: record and booking flag flip together
    app.settlement
        .upload_proof(&manager_actor, &payment_id, "transfer2.png".into())
        .await
        .unwrap();
    let verified = app.settlement.verify(&admin, &payment_id, NOW).await.unwrap();
    assert_eq!(verified.status, CommissionStatus::Verified);
    let booking = app.bookings.find_by_id(&booking_id).await.unwrap().unwrap();
    assert!(booking.commission_paid);
}
