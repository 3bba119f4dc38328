//! Money calculation utilities using rust_decimal for precision
//!
//! All totals are computed with `Decimal` internally and converted to
//! `f64` only at the storage/serialization edge. Client-supplied totals
//! are never trusted; the order total is always derived from catalog
//! prices plus the flat shipping fee.

use rust_decimal::prelude::*;
use shared::{AppError, ErrorCode};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per cart line
pub const MAX_QUANTITY: i64 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{} must be a finite number, got {}", field_name, value),
        ));
    }
    Ok(())
}

/// Validate a unit price taken from the catalog
pub fn validate_price(price: f64) -> Result<(), AppError> {
    require_finite(price, "price")?;
    if price < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("price must be non-negative, got {}", price),
        ));
    }
    if price > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("price exceeds maximum allowed ({}), got {}", MAX_PRICE, price),
        ));
    }
    Ok(())
}

/// Validate a cart line quantity
pub fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("quantity must be positive, got {}", quantity),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!(
                "quantity exceeds maximum allowed ({}), got {}",
                MAX_QUANTITY, quantity
            ),
        ));
    }
    Ok(())
}

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        // Decimal rounded to 2dp with inputs bounded by MAX_PRICE * MAX_QUANTITY
        // is always within f64 representable range
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Line subtotal: unit price times quantity
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Order total: sum of line subtotals plus the flat shipping fee
pub fn order_total(subtotals: impl IntoIterator<Item = Decimal>, shipping_fee: f64) -> f64 {
    let mut total = Decimal::ZERO;
    for subtotal in subtotals {
        total += subtotal;
    }
    total += to_decimal(shipping_fee);
    to_f64(total)
}
