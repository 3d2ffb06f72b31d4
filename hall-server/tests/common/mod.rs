//! Shared test fixtures: embedded database + repositories + engines.

#![allow(dead_code)]

use hall_server::auth::CurrentUser;
use hall_server::booking::BookingEngine;
use hall_server::db::DbService;
use hall_server::db::models::{Hall, HallCreate, MenuItem, User, UserCreate, UserRole};
use hall_server::db::repository::{
    BookingRepository, CommissionRepository, HallRepository, UserRepository,
};
use hall_server::settlement::SettlementEngine;

/// Fixed wall clock for deterministic due dates (2025-06-15 前后)
pub const NOW: i64 = 1_750_000_000_000;

pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

pub struct TestApp {
    pub users: UserRepository,
    pub halls: HallRepository,
    pub bookings: BookingRepository,
    pub commissions: CommissionRepository,
    pub booking_engine: BookingEngine,
    pub settlement: SettlementEngine,
    _dir: tempfile::TempDir,
}

pub async fn setup() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let db = DbService::new(db_path.to_str().expect("Non-UTF8 temp path"))
        .await
        .expect("Failed to open test database")
        .db;

    let users = UserRepository::new(db.clone());
    let halls = HallRepository::new(db.clone());
    let bookings = BookingRepository::new(db.clone());
    let commissions = CommissionRepository::new(db.clone());

    let settlement = SettlementEngine::new(
        commissions.clone(),
        bookings.clone(),
        halls.clone(),
        users.clone(),
    );
    let booking_engine = BookingEngine::new(bookings.clone(), halls.clone(), settlement.clone());

    TestApp {
        users,
        halls,
        bookings,
        commissions,
        booking_engine,
        settlement,
        _dir: dir,
    }
}

/// Register an account and return both the stored record and the
/// authenticated actor the engines expect.
pub async fn register(app: &TestApp, name: &str, email: &str, role: UserRole) -> (User, CurrentUser) {
    let user = app
        .users
        .create(UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            phone: None,
            role: Some(role),
        })
        .await
        .expect("Failed to create user");

    let actor = CurrentUser {
        id: user.id.clone().expect("User without id").to_string(),
        name: user.name.clone(),
        role,
    };
    (user, actor)
}

pub async fn create_hall(
    app: &TestApp,
    manager: &User,
    name: &str,
    capacity: i64,
    price: f64,
    menu: Vec<MenuItem>,
) -> Hall {
    app.halls
        .create(
            HallCreate {
                name: name.to_string(),
                location: "Main Blvd".to_string(),
                description: None,
                capacity,
                price,
                amenities: vec![],
                image: None,
                menu,
                manager: None,
            },
            manager.id.clone().expect("Manager without id"),
        )
        .await
        .expect("Failed to create hall")
}

pub fn hall_id(hall: &Hall) -> String {
    hall.id.clone().expect("Hall without id").to_string()
}

pub fn menu_item(name: &str, price: f64) -> MenuItem {
    MenuItem {
        name: name.to_string(),
        price,
        category: None,
    }
}
