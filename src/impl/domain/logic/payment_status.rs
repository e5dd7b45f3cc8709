use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{entities::InvoiceStatus, errors::AmountOverflow};

/// Status of an invoice of `invoice_total` after `total_paid` has been
/// received. Differences within `tolerance` count as settled.
pub(crate) fn determine_invoice_status(
    invoice_total: Decimal,
    total_paid: Decimal,
    tolerance: Decimal,
) -> InvoiceStatus {
    let difference = match total_paid.checked_sub(invoice_total) {
        Some(difference) => difference,
        None if total_paid > invoice_total => Decimal::MAX,
        None => Decimal::MIN,
    };
    if total_paid <= tolerance {
        InvoiceStatus::Outstanding
    } else if difference < -tolerance {
        InvoiceStatus::PartiallyPaid
    } else if difference > tolerance {
        InvoiceStatus::Overpaid
    } else {
        InvoiceStatus::Paid
    }
}

/// Share of the invoice total covered by completed payments, in percent.
/// Zero for invoices without a total.
pub(crate) fn payment_completion_percentage(
    invoice_total: Decimal,
    total_paid: Decimal,
) -> Result<Decimal, ServerError> {
    if invoice_total.is_zero() {
        return Ok(Decimal::ZERO);
    }
    total_paid
        .checked_div(invoice_total)
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| AmountOverflow::new(&format!("{total_paid} paid of {invoice_total}")))
}
