use std::str::FromStr;

use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::errors::InvalidAmount;

/// Monetary or hour amount as written in a CSV cell. Thousands separators
/// are ignored and accounting-style parentheses mark a negative value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AmountModel(Decimal);
impl FromStr for AmountModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.replace(',', "");
        let raw = raw.trim();
        let is_negative = raw.starts_with('(') && raw.ends_with(')');
        let numeric_part = raw.trim_matches(|c| c == '(' || c == ')').trim();
        let amount =
            Decimal::from_str(numeric_part).map_err(|e| InvalidAmount::with_debug(s, &e))?;
        Ok(AmountModel(if is_negative { -amount } else { amount }))
    }
}

impl From<AmountModel> for Decimal {
    fn from(model: AmountModel) -> Self {
        model.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Decimal {
        AmountModel::from_str(s).unwrap().into()
    }

    #[test]
    fn parses_plain_and_formatted_amounts() {
        assert_eq!(parse("125.50"), Decimal::new(12550, 2));
        assert_eq!(parse(" 1,250.00 "), Decimal::new(125000, 2));
        assert_eq!(parse("(40)"), Decimal::from(-40));
    }

    #[test]
    fn rejects_non_numeric() {
        assert!(AmountModel::from_str("").is_err());
        assert!(AmountModel::from_str("abc").is_err());
    }
}
