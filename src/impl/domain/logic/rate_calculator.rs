use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{entities::PriceTimeUnit, errors::AmountOverflow};

const MINUTES_PER_HOUR: i64 = 60;
const DAYS_PER_WEEK: i64 = 7;
/// Fixed month length used for monthly pricing, independent of the calendar.
const DAYS_PER_MONTH: i64 = 30;

/// Quantity of care delivered in a period, in the unit it was measured in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BillableQuantity {
    Minutes(Decimal),
    Days(i64),
}

/// Converts a billable quantity into the contract's price unit and prices it.
///
/// Returns `Ok(None)` when the unit cannot express the quantity (ex. minutes
/// priced per day), so the caller can flag it instead of billing a guess.
/// The result is not rounded.
pub(crate) fn period_amount(
    quantity: BillableQuantity,
    price: Decimal,
    unit: PriceTimeUnit,
) -> Result<Option<Decimal>, ServerError> {
    let (quantity, units_per_price) = match (quantity, unit) {
        (BillableQuantity::Minutes(minutes), PriceTimeUnit::Minute) => (minutes, 1),
        (BillableQuantity::Minutes(minutes), PriceTimeUnit::Hourly) => (minutes, MINUTES_PER_HOUR),
        (BillableQuantity::Days(days), PriceTimeUnit::Daily) => (Decimal::from(days), 1),
        (BillableQuantity::Days(days), PriceTimeUnit::Weekly) => (Decimal::from(days), DAYS_PER_WEEK),
        (BillableQuantity::Days(days), PriceTimeUnit::Monthly) => {
            (Decimal::from(days), DAYS_PER_MONTH)
        }
        (BillableQuantity::Minutes(_), _) | (BillableQuantity::Days(_), _) => return Ok(None),
    };
    quantity
        .checked_mul(price)
        .and_then(|amount| amount.checked_div(Decimal::from(units_per_price)))
        .map(Some)
        .ok_or_else(|| {
            AmountOverflow::new(&format!("{quantity} at {price} per {}", unit.as_str()))
        })
}

pub(crate) fn unit_applies_to_minutes(unit: PriceTimeUnit) -> bool {
    matches!(unit, PriceTimeUnit::Minute | PriceTimeUnit::Hourly)
}
