//! Money calculation utilities using rust_decimal for precision
//!
//! All derivations (seat totals, deposit, commission) are computed with
//! `Decimal` internally, then converted back to `f64` for storage and
//! serialization, rounded to 2 decimal places half-up.

use rust_decimal::prelude::*;

use super::{AppError, AppResult};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Deposit rate: 10% of the booking total
pub const PREBOOKING_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Platform commission rate: 5% of the booking total
pub const COMMISSION_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Maximum allowed per-seat / per-item price
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Maximum allowed booking total
pub const MAX_TOTAL_AMOUNT: f64 = 100_000_000.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Validate that a monetary value is finite, non-negative and within `max`
pub fn validate_amount(value: f64, field: &str, max: f64) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    if value > max {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, max, value
        )));
    }
    Ok(())
}

/// Seat portion of a booking total: per-seat price × guest count
pub fn seat_total(price_per_seat: f64, guests: i64) -> f64 {
    to_f64(to_decimal(price_per_seat) * Decimal::from(guests))
}

/// 10% deposit derived from the booking total
pub fn prebooking_amount(total: f64) -> f64 {
    to_f64(to_decimal(total) * PREBOOKING_RATE)
}

/// 5% platform commission derived from the booking total
pub fn commission_amount(total: f64) -> f64 {
    to_f64(to_decimal(total) * COMMISSION_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_rates() {
        assert_eq!(prebooking_amount(50000.0), 5000.0);
        assert_eq!(commission_amount(50000.0), 2500.0);
        assert_eq!(seat_total(1000.0, 50), 50000.0);
    }

    #[test]
    fn rounds_half_up_to_cents() {
        // 333.335 * 0.10 = 33.3335 -> 33.33; 333.35 * 0.05 = 16.6675 -> 16.67
        assert_eq!(prebooking_amount(333.335), 33.33);
        assert_eq!(commission_amount(333.35), 16.67);
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(validate_amount(f64::NAN, "total", MAX_TOTAL_AMOUNT).is_err());
        assert!(validate_amount(f64::INFINITY, "total", MAX_TOTAL_AMOUNT).is_err());
        assert!(validate_amount(-1.0, "total", MAX_TOTAL_AMOUNT).is_err());
        assert!(validate_amount(MAX_TOTAL_AMOUNT + 1.0, "total", MAX_TOTAL_AMOUNT).is_err());
        assert!(validate_amount(0.0, "total", MAX_TOTAL_AMOUNT).is_ok());
    }
}
