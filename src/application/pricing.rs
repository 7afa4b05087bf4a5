//! Pricing calculator

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{DateRange, DomainError, DomainResult};

/// Total price of renting for `range` at `daily_rate` per day.
pub fn price(range: &DateRange, daily_rate: Decimal) -> DomainResult<Decimal> {
    if daily_rate <= Decimal::ZERO {
        return Err(DomainError::Validation(format!(
            "daily rate must be positive, got {}",
            daily_rate
        )));
    }
    Decimal::from(range.number_of_days())
        .checked_mul(daily_rate)
        .ok_or_else(|| DomainError::Validation("total price overflows".into()))
}

/// Validate the dates and price them in one step.
pub fn quote(start: NaiveDate, end: NaiveDate, daily_rate: Decimal) -> DomainResult<Decimal> {
    price(&DateRange::new(start, end)?, daily_rate)
}
