//! Database Models

// Serde helpers
pub mod serde_helpers;

// Accounts
pub mod user;

// Venues
pub mod hall;

// Booking lifecycle
pub mod booking;

// Commission settlement
pub mod commission;

// Re-exports
pub use booking::{Booking, BookingId, BookingStatus, CustomFoodStatus, FoodItem};
pub use commission::{CommissionId, CommissionPayment, CommissionStatus};
pub use hall::{Hall, HallCreate, HallId, HallUpdate, MenuItem};
pub use user::{User, UserCreate, UserId, UserRole};
