//! 预订生命周期引擎
//!
//! 状态机、所有权检查与定价计算。HTTP 层只做请求翻译，
//! 所有业务规则集中在 [`BookingEngine`]。

pub mod engine;
pub mod food;

pub use engine::{BookingEngine, CreateBookingRequest};
pub use food::FoodItemRequest;
