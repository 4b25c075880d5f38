//! Money calculation utilities using rust_decimal for precision
//!
//! 金额统一用 `Decimal` 计算，落库/序列化时再转回 `f64`（保留 2 位小数）。

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::CartLine;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed quantity per cart line
pub const MAX_QUANTITY: i64 = 9999;

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
        .unwrap_or_default()
}

pub fn line_total(line: &CartLine) -> Decimal {
    to_decimal(line.price) * Decimal::from(line.quantity)
}

/// Σ price × quantity over the cart, rounded to cents.
pub fn cart_total(lines: &[CartLine]) -> f64 {
    to_f64(lines.iter().map(line_total).sum())
}

pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}

/// Reject a client-side total that disagrees with the computed one.
pub fn verify_expected(computed: f64, expected: Option<f64>) -> AppResult<()> {
    match expected {
        Some(expected) if !expected.is_finite() => Err(AppError::validation(format!(
            "expected_amount must be a finite number, got {expected}"
        ))),
        Some(expected) if !money_eq(computed, expected) => Err(AppError::with_message(
            ErrorCode::AmountMismatch,
            format!("cart total is {computed:.2}, client expected {expected:.2}"),
        )
        .with_detail("computed", computed)
        .with_detail("expected", expected)),
        _ => Ok(()),
    }
}
