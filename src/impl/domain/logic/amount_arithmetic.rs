use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::errors::AmountOverflow;

/// Sums `amounts`, failing with `AmountOverflow` instead of panicking when the
/// total leaves `Decimal`'s range. `what` names the total in the error.
pub(crate) fn checked_sum<I>(amounts: I, what: &str) -> Result<Decimal, ServerError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or_else(|| AmountOverflow::new(what))
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, ServerError> {
    a.checked_mul(b).ok_or_else(|| AmountOverflow::new(what))
}
