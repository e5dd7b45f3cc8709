use chrono::NaiveDate;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};

use crate::{
    entities::{
        ContractId, DateRange, InvoiceDetail, InvoicePeriod, PeriodQuantity, Warning,
    },
    errors::InvalidFieldValue,
};

use super::closed_enum_model::{CareTypeModel, PriceTimeUnitModel};

/// JSON shape of an invoice period, as stored with an invoice and returned
/// over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicePeriodModel {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Ex. "30 days".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation_time_frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambulante_total_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambulante_billed_minutes: Option<Decimal>,
    #[serde(default)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetailModel {
    pub contract_id: i64,
    #[serde(rename = "contract_name")]
    pub contract_type: CareTypeModel,
    pub periods: Vec<InvoicePeriodModel>,
    #[serde(rename = "pre_vat_total_price")]
    pub pre_vat_total: Decimal,
    #[serde(rename = "total_price")]
    pub total: Decimal,
    pub vat: u32,
    pub price: Decimal,
    pub price_time_unit: PriceTimeUnitModel,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// --

impl From<&InvoicePeriod> for InvoicePeriodModel {
    fn from(period: &InvoicePeriod) -> Self {
        let (accommodation_time_frame, ambulante_total_minutes, ambulante_billed_minutes) =
            match &period.quantity {
                PeriodQuantity::Accommodation { days } => (Some(format!("{days} days")), None, None),
                PeriodQuantity::Ambulante {
                    total_minutes,
                    billed_minutes,
                } => (None, *total_minutes, Some(*billed_minutes)),
            };
        InvoicePeriodModel {
            start_date: period.range.start(),
            end_date: period.range.end(),
            accommodation_time_frame,
            ambulante_total_minutes,
            ambulante_billed_minutes,
            amount: period.amount,
        }
    }
}

impl TryFrom<InvoicePeriodModel> for InvoicePeriod {
    type Error = ServerError;

    fn try_from(model: InvoicePeriodModel) -> Result<Self, Self::Error> {
        let range = DateRange::new(model.start_date, model.end_date)?;
        let quantity = match model.accommodation_time_frame {
            Some(time_frame) => PeriodQuantity::Accommodation {
                days: parse_time_frame(&time_frame)?,
            },
            None => PeriodQuantity::Ambulante {
                total_minutes: model.ambulante_total_minutes,
                billed_minutes: model
                    .ambulante_billed_minutes
                    .or_else(|| model.ambulante_total_minutes.map(Decimal::from))
                    .unwrap_or(Decimal::ZERO),
            },
        };
        Ok(InvoicePeriod {
            range,
            quantity,
            amount: model.amount,
        })
    }
}

impl From<&InvoiceDetail> for InvoiceDetailModel {
    fn from(detail: &InvoiceDetail) -> Self {
        InvoiceDetailModel {
            contract_id: detail.contract_id.0,
            contract_type: detail.contract_type.into(),
            periods: detail.periods.iter().map(Into::into).collect(),
            pre_vat_total: detail.pre_vat_total,
            total: detail.total,
            vat: detail.vat,
            price: detail.price,
            price_time_unit: detail.price_time_unit.into(),
            warnings: detail.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

impl TryFrom<InvoiceDetailModel> for InvoiceDetail {
    type Error = ServerError;

    fn try_from(model: InvoiceDetailModel) -> Result<Self, Self::Error> {
        Ok(InvoiceDetail {
            contract_id: ContractId(model.contract_id),
            contract_type: model.contract_type.into(),
            periods: model
                .periods
                .into_iter()
                .map(InvoicePeriod::try_from)
                .collect::<Result<_, _>>()?,
            pre_vat_total: model.pre_vat_total,
            vat: model.vat,
            total: model.total,
            price: model.price,
            price_time_unit: model.price_time_unit.into(),
            warnings: model.warnings.into_iter().map(Warning::Custom).collect(),
        })
    }
}

fn parse_time_frame(time_frame: &str) -> Result<i64, ServerError> {
    time_frame
        .trim()
        .trim_end_matches("days")
        .trim_end_matches("day")
        .trim()
        .parse::<i64>()
        .map_err(|_| InvalidFieldValue::new("accommodation_time_frame", time_frame))
}
