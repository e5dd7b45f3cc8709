use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    domain::logic::amount_arithmetic::checked_sum, entities::InvoiceDetail,
    errors::InvoiceTotalMismatch,
};

/// Checks that `total_amount` is exactly the sum of the detail totals.
pub(crate) fn verify_total_amount(
    invoice_details: &[InvoiceDetail],
    total_amount: Decimal,
) -> Result<(), ServerError> {
    let calculated = checked_sum(invoice_details.iter().map(|d| d.total), "invoice total")?;
    if calculated != total_amount {
        return Err(InvoiceTotalMismatch::new(
            &total_amount.to_string(),
            &calculated.to_string(),
        ));
    }
    Ok(())
}
