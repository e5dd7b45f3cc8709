use std::{fs, str::FromStr as _};

use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    data::models::{
        amount_model::AmountModel,
        closed_enum_model::{
            CareTypeModel, ContractStatusModel, FinancingActModel, FinancingOptionModel,
            HoursTypeModel, PriceTimeUnitModel,
        },
        iso_date_model::ISODateModel,
    },
    entities::{ClientId, Contract, ContractId, DateRange, SenderId},
    errors::{InvalidContract, InvalidCsv, InvalidCsvContent, ReadError},
};

/// Reads contracts from CSV with a header row and the columns:
///
/// `id, client_id, sender_id, start_date, end_date, price, price_time_unit,
/// care_type, hours, hours_type, vat, status, financing_act,
/// financing_option`
///
/// `sender_id`, `hours`, `hours_type` and `vat` may be left empty.
pub(crate) trait ContractsCsvDatasource {
    fn from_string(&self, s: &str) -> Result<Vec<Contract>, ServerError>;

    fn from_file<P>(&self, path: P) -> Result<Vec<Contract>, ServerError>
    where
        P: AsRef<std::path::Path>;
}

pub(crate) struct ContractsCsvDatasourceImpl;

impl ContractsCsvDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl ContractsCsvDatasource for ContractsCsvDatasourceImpl {
    fn from_string(&self, s: &str) -> Result<Vec<Contract>, ServerError> {
        csv::Reader::from_reader(s.as_bytes())
            .records()
            .map(|r| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    // Extract from CSV record.
                    let raw_id = r.get(0).unwrap_or("");
                    let raw_client_id = r.get(1).unwrap_or("");
                    let raw_sender_id = non_empty(r.get(2));
                    let raw_start_date = r.get(3).unwrap_or("");
                    let raw_end_date = r.get(4).unwrap_or("");
                    let raw_price = r.get(5).unwrap_or("");
                    let raw_price_time_unit = r.get(6).unwrap_or("");
                    let raw_care_type = r.get(7).unwrap_or("");
                    let raw_hours = non_empty(r.get(8));
                    let raw_hours_type = non_empty(r.get(9));
                    let raw_vat = non_empty(r.get(10));
                    let raw_status = r.get(11).unwrap_or("");
                    let raw_financing_act = r.get(12).unwrap_or("");
                    let raw_financing_option = r.get(13).unwrap_or("");

                    // Parse.
                    let id = parse_integer("id", raw_id)?;
                    let client_id = parse_integer("client_id", raw_client_id)?;
                    let sender_id = raw_sender_id
                        .map(|s| parse_integer("sender_id", s))
                        .transpose()?;
                    let start_date = ISODateModel::from_str(raw_start_date)?;
                    let end_date = ISODateModel::from_str(raw_end_date)?;
                    let price: Decimal = AmountModel::from_str(raw_price)?.into();
                    let price_time_unit = PriceTimeUnitModel::from_str(raw_price_time_unit)?;
                    let care_type = CareTypeModel::from_str(raw_care_type)?;
                    let hours: Option<Decimal> = raw_hours
                        .map(AmountModel::from_str)
                        .transpose()?
                        .map(Into::into);
                    let hours_type = raw_hours_type.map(HoursTypeModel::from_str).transpose()?;
                    let vat = raw_vat
                        .map(|s| {
                            s.trim()
                                .parse::<u32>()
                                .map_err(|e| InvalidCsvContent::with_debug(&format!("vat '{s}'"), &e))
                        })
                        .transpose()?;
                    let status = ContractStatusModel::from_str(raw_status)?;
                    let financing_act = FinancingActModel::from_str(raw_financing_act)?;
                    let financing_option = FinancingOptionModel::from_str(raw_financing_option)?;

                    // Validate.
                    let validity = DateRange::new(start_date.into(), end_date.into())
                        .map_err(|e| InvalidContract::with_debug(id, "end date before start date", &e))?;
                    if price < Decimal::ZERO {
                        return Err(InvalidContract::new(id, "negative price"));
                    }
                    if hours.is_some_and(|h| h < Decimal::ZERO) {
                        return Err(InvalidContract::new(id, "negative hours"));
                    }

                    // Build.
                    Ok(Contract {
                        id: ContractId(id),
                        client_id: ClientId(client_id),
                        sender_id: sender_id.map(SenderId),
                        validity,
                        price,
                        price_time_unit: price_time_unit.into(),
                        care_type: care_type.into(),
                        hours,
                        hours_type: hours_type.map(Into::into),
                        vat,
                        status: status.into(),
                        financing_act: financing_act.into(),
                        financing_option: financing_option.into(),
                    })
                })
            })
            .collect()
    }

    fn from_file<P>(&self, path: P) -> Result<Vec<Contract>, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        self.from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }
}

pub(super) fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.filter(|s| !s.trim().is_empty())
}

pub(super) fn parse_integer(field: &str, raw: &str) -> Result<i64, ServerError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| InvalidCsvContent::with_debug(&format!("{field} '{raw}'"), &e))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::entities::{CareType, ContractStatus, HoursType, PriceTimeUnit};

    const HEADER: &str = "id,client_id,sender_id,start_date,end_date,price,price_time_unit,care_type,hours,hours_type,vat,status,financing_act,financing_option\n";

    #[test]
    fn reads_contract_rows() {
        let csv = format!(
            "{HEADER}\
             1,42,3,2024-06-01,2024-12-31,558,hourly,ambulante,40,weekly,,approved,WMO,ZIN\n\
             2,42,,2024-01-01,2024-12-31,125.50,daily,accommodation,,,21,draft,WLZ,PGB\n"
        );
        let contracts = ContractsCsvDatasourceImpl::new().from_string(&csv).unwrap();

        assert_eq!(contracts.len(), 2);
        let ambulante = &contracts[0];
        assert_eq!(ambulante.client_id, ClientId(42));
        assert_eq!(ambulante.sender_id, Some(SenderId(3)));
        assert_eq!(ambulante.price_time_unit, PriceTimeUnit::Hourly);
        assert_eq!(ambulante.hours, Some(Decimal::from(40)));
        assert_eq!(ambulante.hours_type, Some(HoursType::Weekly));
        assert_eq!(ambulante.vat, None);
        assert_eq!(
            ambulante.validity.start(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );

        let accommodation = &contracts[1];
        assert_eq!(accommodation.care_type, CareType::Accommodation);
        assert_eq!(accommodation.price, Decimal::new(12550, 2));
        assert_eq!(accommodation.vat, Some(21));
        assert_eq!(accommodation.status, ContractStatus::Draft);
        assert_eq!(accommodation.sender_id, None);
    }

    #[test]
    fn rejects_unknown_price_time_unit() {
        let csv = format!(
            "{HEADER}1,42,,2024-06-01,2024-12-31,558,yearly,ambulante,,,,approved,WMO,ZIN\n"
        );
        assert!(ContractsCsvDatasourceImpl::new().from_string(&csv).is_err());
    }

    #[test]
    fn rejects_invalid_records() {
        let datasource = ContractsCsvDatasourceImpl::new();
        // Inverted validity.
        let csv = format!(
            "{HEADER}1,42,,2024-12-31,2024-06-01,558,hourly,ambulante,,,,approved,WMO,ZIN\n"
        );
        assert!(datasource.from_string(&csv).is_err());
        // Negative price.
        let csv = format!(
            "{HEADER}1,42,,2024-06-01,2024-12-31,(10),daily,accommodation,,,,approved,WMO,ZIN\n"
        );
        assert!(datasource.from_string(&csv).is_err());
        // Non-numeric id.
        let csv = format!(
            "{HEADER}x,42,,2024-06-01,2024-12-31,10,daily,accommodation,,,,approved,WMO,ZIN\n"
        );
        assert!(datasource.from_string(&csv).is_err());
    }
}
