use crate::entities::{InvoiceDetail, InvoicePeriod};

/// Details of the credit note cancelling `details`: every amount negated,
/// quantities kept, warnings dropped.
pub(crate) fn credit_note_details(details: &[InvoiceDetail]) -> Vec<InvoiceDetail> {
    details
        .iter()
        .map(|detail| InvoiceDetail {
            contract_id: detail.contract_id,
            contract_type: detail.contract_type,
            periods: detail
                .periods
                .iter()
                .map(|p| InvoicePeriod {
                    range: p.range,
                    quantity: p.quantity.clone(),
                    amount: -p.amount,
                })
                .collect(),
            pre_vat_total: -detail.pre_vat_total,
            vat: detail.vat,
            total: -detail.total,
            price: -detail.price,
            price_time_unit: detail.price_time_unit,
            warnings: Vec::new(),
        })
        .collect()
}
