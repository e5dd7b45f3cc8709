use fractic_server_error::ServerError;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::AmountOverflow;

pub(crate) struct VatApplier {
    decimal_places: u32,
}

impl VatApplier {
    /// `decimal_places` is the currency's smallest unit (ex. 2 for EUR).
    pub(crate) fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    /// `pre_vat_total × (1 + vat/100)`, rounded half away from zero to the
    /// currency unit. This is the only place amounts get rounded.
    pub(crate) fn apply(
        &self,
        pre_vat_total: Decimal,
        vat_percentage: u32,
    ) -> Result<Decimal, ServerError> {
        pre_vat_total
            .checked_mul(Decimal::from(vat_percentage))
            .and_then(|vat| vat.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|vat| pre_vat_total.checked_add(vat))
            .map(|total| {
                total.round_dp_with_strategy(
                    self.decimal_places,
                    RoundingStrategy::MidpointAwayFromZero,
                )
            })
            .ok_or_else(|| {
                AmountOverflow::new(&format!("{pre_vat_total} plus {vat_percentage}% VAT"))
            })
    }
}
