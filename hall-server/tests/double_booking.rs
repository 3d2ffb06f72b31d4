//! Date-claim behavior: one live booking per (hall, event date), void
//! transitions free the slot, resubmission races lose cleanly.

mod common;

use common::{NOW, create_hall, hall_id, register, setup};
use hall_server::booking::CreateBookingRequest;
use hall_server::db::models::{BookingStatus, UserRole};
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

#[tokio::test]
async fn same_hall_same_date_conflicts() {
    let app = setup().await;
    let (manager, _) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, carl) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let (_, dana) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    app.booking_engine
        .create_booking(&carl, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();

    let err = app
        .booking_engine
        .create_booking(&dana, request(hall_id(&hall), "2025-12-01", 20), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Same customer retrying hits the same conflict
    let err = app
        .booking_engine
        .create_booking(&carl, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn other_dates_and_halls_are_independent() {
    let app = setup().await;
    let (manager, _) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, carl) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let (_, dana) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;
    let hall_a = create_hall(&app, &manager, "Hall A", 100, 1000.0, vec![]).await;
    let hall_b = create_hall(&app, &manager, "Hall B", 100, 1000.0, vec![]).await;

    app.booking_engine
        .create_booking(&carl, request(hall_id(&hall_a), "2025-12-01", 10), NOW)
        .await
        .unwrap();

    // Same hall, next day
    assert!(app
        .booking_engine
        .create_booking(&dana, request(hall_id(&hall_a), "2025-12-02", 10), NOW)
        .await
        .is_ok());

    // Same day, other hall
    assert!(app
        .booking_engine
        .create_booking(&dana, request(hall_id(&hall_b), "2025-12-01", 10), NOW)
        .await
        .is_ok());
}

#[tokio::test]
async fn payment_rejection_frees_the_date() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, carl) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let (_, dana) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let booking = app
        .booking_engine
        .create_booking(&carl, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();
    let carl_id = booking.id.clone().unwrap().to_string();

    app.booking_engine
        .submit_payment_proof(&carl, &carl_id, "TX1".into(), "p.png".into(), NOW)
        .await
        .unwrap();
    let rejected = app
        .booking_engine
        .reject_payment(&manager_actor, &carl_id, "Unreadable screenshot".into(), NOW)
        .await
        .unwrap();
    assert_eq!(rejected.status, BookingStatus::PaymentRejected);
    // Proof retained for reference
    assert_eq!(rejected.payment_proof.as_deref(), Some("p.png"));

    // The freed slot goes to Dana
    let dana_booking = app
        .booking_engine
        .create_booking(&dana, request(hall_id(&hall), "2025-12-01", 20), NOW)
        .await
        .unwrap();
    assert_eq!(dana_booking.status, BookingStatus::AwaitingPayment);

    // Carl's resubmission loses: the date is held by Dana's live booking
    let err = app
        .booking_engine
        .submit_payment_proof(&carl, &carl_id, "TX2".into(), "p2.png".into(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // His booking stays payment_rejected
    let carl_booking = app.booking_engine.get_booking(&carl, &carl_id).await.unwrap();
    assert_eq!(carl_booking.status, BookingStatus::PaymentRejected);
}

#[tokio::test]
async fn resubmission_reacquires_a_free_date() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, carl) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let booking = app
        .booking_engine
        .create_booking(&carl, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();
    let id = booking.id.clone().unwrap().to_string();

    app.booking_engine
        .submit_payment_proof(&carl, &id, "TX1".into(), "p.png".into(), NOW)
        .await
        .unwrap();
    app.booking_engine
        .reject_payment(&manager_actor, &id, "Wrong amount".into(), NOW)
        .await
        .unwrap();

    // Nobody took the slot, so the resubmit wins it back
    let booking = app
        .booking_engine
        .submit_payment_proof(&carl, &id, "TX2".into(), "p2.png".into(), NOW)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::PaymentSubmitted);
    assert_eq!(booking.transaction_id.as_deref(), Some("TX2"));
    assert!(booking.payment_rejection_reason.is_none());

    // And the claim is live again
    let (_, dana) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;
    let err = app
        .booking_engine
        .create_booking(&dana, request(hall_id(&hall), "2025-12-01", 5), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn status_rejection_and_deletion_free_the_date() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, carl) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let (_, dana) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    // Manager voids via the generic transition
    let booking = app
        .booking_engine
        .create_booking(&carl, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();
    let id = booking.id.clone().unwrap().to_string();
    let rejected = app
        .booking_engine
        .update_status(&manager_actor, &id, "rejected", NOW)
        .await
        .unwrap();
    assert_eq!(rejected.status, BookingStatus::Rejected);

    assert!(app
        .booking_engine
        .create_booking(&dana, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .is_ok());

    // Deletion also releases its claim
    let booking = app
        .booking_engine
        .create_booking(&carl, request(hall_id(&hall), "2025-12-02", 10), NOW)
        .await
        .unwrap();
    let id = booking.id.clone().unwrap().to_string();
    app.booking_engine
        .delete_booking(&manager_actor, &id)
        .await
        .unwrap();

    assert!(app
        .booking_engine
        .create_booking(&dana, request(hall_id(&hall), "2025-12-02", 10), NOW)
        .await
        .is_ok());
}

#[tokio::test]
async fn reviving_a_void_booking_needs_the_date_back() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, carl) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let (_, dana) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let booking = app
        .booking_engine
        .create_booking(&carl, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();
    let id = booking.id.clone().unwrap().to_string();
    app.booking_engine
        .update_status(&manager_actor, &id, "rejected", NOW)
        .await
        .unwrap();

    // Dana takes the date while Carl's booking is void
    app.booking_engine
        .create_booking(&dana, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();

    // Reviving Carl's booking would double-book: refused
    let err = app
        .booking_engine
        .update_status(&manager_actor, &id, "approved", NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
