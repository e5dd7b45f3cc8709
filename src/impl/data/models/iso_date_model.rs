use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use fractic_server_error::ServerError;

use crate::errors::{InvalidIsoDate, InvalidIsoDateTime};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ISODateModel(NaiveDate);
impl FromStr for ISODateModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| InvalidIsoDate::with_debug(s, &e))?;
        Ok(ISODateModel(d))
    }
}
impl From<ISODateModel> for NaiveDate {
    fn from(model: ISODateModel) -> Self {
        model.0
    }
}

/// Local date-time without offset, `YYYY-MM-DDTHH:MM[:SS]` (a space is also
/// accepted as separator).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ISODateTimeModel(NaiveDateTime);
impl FromStr for ISODateTimeModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(ISODateTimeModel)
            .ok_or_else(|| InvalidIsoDateTime::new(s))
    }
}
impl From<ISODateTimeModel> for NaiveDateTime {
    fn from(model: ISODateTimeModel) -> Self {
        model.0
    }
}
