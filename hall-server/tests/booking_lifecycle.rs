//! End-to-end booking lifecycle over the embedded database:
//! creation pricing, payment flow, completion and the derived commission.

mod common;

use common::{DAY_MILLIS, NOW, create_hall, hall_id, register, setup};
use hall_server::booking::CreateBookingRequest;
use hall_server::db::models::{BookingStatus, CommissionStatus, UserRole};
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
async fn full_lifecycle_to_completion() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Crystal Palace", 100, 1000.0, vec![]).await;

    // 100-capacity hall at 1000 per seat, 50 guests
    let booking = app
        .booking_engine
        .create_booking(&customer, request(hall_id(&hall), "2025-12-01", 50), NOW)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::AwaitingPayment);
    assert_eq!(booking.total_amount, 50_000.0);
    assert_eq!(booking.prebooking_amount, 5_000.0);
    assert!(booking.commission_amount.is_none());

    let id = booking.id.clone().unwrap().to_string();

    // Customer submits proof
    let booking = app
        .booking_engine
        .submit_payment_proof(&customer, &id, "TX1".into(), "proof.png".into(), NOW + 1)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::PaymentSubmitted);
    assert_eq!(booking.transaction_id.as_deref(), Some("TX1"));

    // Manager verifies
    let booking = app
        .booking_engine
        .verify_payment(&manager_actor, &id, NOW + 2)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Approved);
    assert!(booking.payment_verified);
    assert!(booking.prebooking_paid);

    // Manager completes; 5% commission is derived and the settlement record
    // created with a 2-day due window
    let booking = app
        .booking_engine
        .update_status(&manager_actor, &id, "completed", NOW + 3)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
    assert_eq!(booking.commission_amount, Some(2_500.0));

    let payments = app.settlement.list_all().await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, 2_500.0);
    assert_eq!(payments[0].status, CommissionStatus::Pending);
    assert_eq!(payments[0].due_date, NOW + 3 + 2 * DAY_MILLIS);
    assert_eq!(payments[0].manager, manager.id.clone().unwrap());
}

#[tokio::test]
async fn pricing_is_server_side_and_cross_checked() {
    let app = setup().await;
    let (manager, _) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    // Client figure contradicting the authoritative total is refused
    let mut req = request(hall_id(&hall), "2025-12-01", 50);
    req.total_amount = Some(42_000.0);
    let err = app
        .booking_engine
        .create_booking(&customer, req, NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // A matching figure passes
    let mut req = request(hall_id(&hall), "2025-12-01", 50);
    req.total_amount = Some(50_000.0);
    let booking = app
        .booking_engine
        .create_booking(&customer, req, NOW)
        .await
        .unwrap();
    assert_eq!(booking.total_amount, 50_000.0);
}

#[tokio::test]
async fn capacity_and_guest_count_guards() {
    let app = setup().await;
    let (manager, _) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Small Hall", 30, 800.0, vec![]).await;

    let err = app
        .booking_engine
        .create_booking(&customer, request(hall_id(&hall), "2025-12-01", 31), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = app
        .booking_engine
        .create_booking(&customer, request(hall_id(&hall), "2025-12-01", 0), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Exactly at capacity is allowed
    let booking = app
        .booking_engine
        .create_booking(&customer, request(hall_id(&hall), "2025-12-01", 30), NOW)
        .await
        .unwrap();
    assert_eq!(booking.guests_count, 30);
}

#[tokio::test]
async fn state_machine_rejects_out_of_order_transitions() {
    let app = setup().await;
    let (manager, manager_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let booking = app
        .booking_engine
        .create_booking(&customer, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();
    let id = booking.id.clone().unwrap().to_string();

    // Verify before any proof was submitted
    let err = app
        .booking_engine
        .verify_payment(&manager_actor, &id, NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Reject before any proof was submitted
    let err = app
        .booking_engine
        .reject_payment(&manager_actor, &id, "no proof".into(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    app.booking_engine
        .submit_payment_proof(&customer, &id, "TX1".into(), "p.png".into(), NOW)
        .await
        .unwrap();

    // Double submission without a rejection in between
    let err = app
        .booking_engine
        .submit_payment_proof(&customer, &id, "TX2".into(), "p2.png".into(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    app.booking_engine
        .verify_payment(&manager_actor, &id, NOW)
        .await
        .unwrap();
    app.booking_engine
        .update_status(&manager_actor, &id, "completed", NOW)
        .await
        .unwrap();

    // Completing twice is refused, so the commission cannot be re-derived
    let err = app
        .booking_engine
        .update_status(&manager_actor, &id, "completed", NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = app
        .booking_engine
        .update_status(&manager_actor, &id, "confirmed", NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn ownership_checks_per_role() {
    let app = setup().await;
    let (manager, _) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, other_manager) = register(&app, "Oscar", "oscar@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let (_, other_customer) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let booking = app
        .booking_engine
        .create_booking(&customer, request(hall_id(&hall), "2025-12-01", 10), NOW)
        .await
        .unwrap();
    let id = booking.id.clone().unwrap().to_string();

    // Another customer cannot submit proof on this booking
    let err = app
        .booking_engine
        .submit_payment_proof(&other_customer, &id, "TX1".into(), "p.png".into(), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    app.booking_engine
        .submit_payment_proof(&customer, &id, "TX1".into(), "p.png".into(), NOW)
        .await
        .unwrap();

    // A manager who does not own the hall cannot verify
    let err = app
        .booking_engine
        .verify_payment(&other_manager, &id, NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Nor view the booking
    let err = app
        .booking_engine
        .get_booking(&other_manager, &id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // The customer and the owning hall manager can
    assert!(app.booking_engine.get_booking(&customer, &id).await.is_ok());
}

#[tokio::test]
async fn manager_blocked_dates_refuse_bookings() {
    let app = setup().await;
    let (manager, _) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (_, customer) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let hall = create_hall(&app, &manager, "Hall", 100, 1000.0, vec![]).await;

    let id = hall_id(&hall);
    app.halls
        .update(
            &id,
            hall_server::db::models::HallUpdate {
                name: None,
                location: None,
                description: None,
                capacity: None,
                price: None,
                amenities: None,
                image: None,
                booked_dates: Some(vec![chrono::NaiveDate::from_ymd_opt(2025, 12, 24).unwrap()]),
                menu: None,
            },
        )
        .await
        .unwrap();

    let err = app
        .booking_engine
        .create_booking(&customer, request(id.clone(), "2025-12-24", 10), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Adjacent date is unaffected
    assert!(app
        .booking_engine
        .create_booking(&customer, request(id, "2025-12-25", 10), NOW)
        .await
        .is_ok());
}

#[tokio::test]
async fn list_views_are_scoped_per_role() {
    let app = setup().await;
    let (mia, mia_actor) = register(&app, "Mia", "mia@test.io", UserRole::Manager).await;
    let (oscar, oscar_actor) = register(&app, "Oscar", "oscar@test.io", UserRole::Manager).await;
    let (_, carl) = register(&app, "Carl", "carl@test.io", UserRole::Customer).await;
    let (_, dana) = register(&app, "Dana", "dana@test.io", UserRole::Customer).await;

    let mia_hall = create_hall(&app, &mia, "Mia Hall", 100, 1000.0, vec![]).await;
    let oscar_hall = create_hall(&app, &oscar, "Oscar Hall", 100, 800.0, vec![]).await;

    let carl_booking = app
        .booking_engine
        .create_booking(&carl, request(hall_id(&mia_hall), "2025-12-01", 50), NOW)
        .await
        .unwrap();
    app.booking_engine
        .create_booking(&dana, request(hall_id(&mia_hall), "2025-12-02", 40), NOW)
        .await
        .unwrap();
    app.booking_engine
        .create_booking(&dana, request(hall_id(&oscar_hall), "2025-12-01", 30), NOW)
        .await
        .unwrap();

    // Stored references survive the write as record ids the queries can match
    assert_eq!(carl_booking.customer.table(), "user");
    assert_eq!(carl_booking.hall, mia_hall.id.clone().unwrap());

    // Customers see exactly their own bookings
    let carls = app.booking_engine.list_for_customer(&carl).await.unwrap();
    assert_eq!(carls.len(), 1);
    assert_eq!(carls[0].id, carl_booking.id);

    let danas = app.booking_engine.list_for_customer(&dana).await.unwrap();
    assert_eq!(danas.len(), 2);

    // Managers see bookings against their halls only
    let mias = app.booking_engine.list_for_manager(&mia_actor).await.unwrap();
    assert_eq!(mias.len(), 2);
    assert!(mias.iter().all(|b| b.hall == mia_hall.id.clone().unwrap()));

    let oscars = app
        .booking_engine
        .list_for_manager(&oscar_actor)
        .await
        .unwrap();
    assert_eq!(oscars.len(), 1);

    // Admin view covers everything
    assert_eq!(app.booking_engine.list_all().await.unwrap().len(), 3);
}
