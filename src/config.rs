use std::fs;

use fractic_server_error::ServerError;
use iso_currency::Currency;
use rust_decimal::Decimal;

use crate::errors::{InvalidConfig, InvalidIsoCurrencyCode, InvalidRon, ReadError};

/// Upper bound on `invoice_due_days`, roughly ten years.
const MAX_INVOICE_DUE_DAYS: i64 = 3650;

/// Raw configuration as written in a RON document. Every field is optional;
/// missing values fall back to the defaults of [`BillingConfig`].
#[derive(Debug, Default, serde_derive::Deserialize)]
#[serde(default)]
struct BillingConfigModel {
    currency: Option<String>,
    max_concurrent_contracts: Option<usize>,
    invoice_due_days: Option<i64>,
    payment_tolerance: Option<Decimal>,
    invoice_number_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingConfig {
    /// Currency all contracts are priced in. Its exponent (ex. EUR = 2) is the
    /// unit `Total` amounts are rounded to.
    pub currency: Currency,
    /// Upper bound on contracts computed at the same time. Should not exceed
    /// the connection pool size of the backing store.
    pub max_concurrent_contracts: usize,
    /// Days between issue and due date when no due date is given. At most
    /// ten years.
    pub invoice_due_days: i64,
    /// Absolute difference between amount paid and amount due that still
    /// counts as settled.
    pub payment_tolerance: Decimal,
    pub invoice_number_prefix: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::EUR,
            max_concurrent_contracts: 8,
            invoice_due_days: 30,
            payment_tolerance: Decimal::from(50),
            invoice_number_prefix: "INV".to_string(),
        }
    }
}

impl BillingConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ServerError> {
        let model: BillingConfigModel =
            ron::from_str(s).map_err(|e| InvalidRon::with_debug("BillingConfig", &e))?;
        let defaults = Self::default();

        let currency = match model.currency {
            Some(code) => {
                Currency::from_code(&code).ok_or_else(|| InvalidIsoCurrencyCode::new(&code))?
            }
            None => defaults.currency,
        };
        let config = Self {
            currency,
            max_concurrent_contracts: model
                .max_concurrent_contracts
                .unwrap_or(defaults.max_concurrent_contracts),
            invoice_due_days: model.invoice_due_days.unwrap_or(defaults.invoice_due_days),
            payment_tolerance: model.payment_tolerance.unwrap_or(defaults.payment_tolerance),
            invoice_number_prefix: model
                .invoice_number_prefix
                .unwrap_or(defaults.invoice_number_prefix),
        };
        config.validate()?;
        Ok(config)
    }

    pub async fn from_file<P>(path: P) -> Result<Self, ServerError>
    where
        P: AsRef<std::path::Path> + Send,
    {
        let s = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReadError::with_debug(&e))?;
        Self::from_ron_str(&s)
    }

    /// Blocking variant of [`BillingConfig::from_file`].
    pub fn from_file_sync<P>(path: P) -> Result<Self, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        Self::from_ron_str(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }

    /// Decimal places amounts are rounded to (ex. EUR = 2, JPY = 0).
    pub fn decimal_places(&self) -> u32 {
        self.currency.exponent().unwrap_or(0) as u32
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.max_concurrent_contracts == 0 {
            return Err(InvalidConfig::new("max_concurrent_contracts must be at least 1"));
        }
        if !(0..=MAX_INVOICE_DUE_DAYS).contains(&self.invoice_due_days) {
            return Err(InvalidConfig::new(&format!(
                "invoice_due_days must be between 0 and {MAX_INVOICE_DUE_DAYS}"
            )));
        }
        if self.payment_tolerance.is_sign_negative() {
            return Err(InvalidConfig::new("payment_tolerance cannot be negative"));
        }
        if self.invoice_number_prefix.trim().is_empty() {
            return Err(InvalidConfig::new("invoice_number_prefix cannot be empty"));
        }
        Ok(())
    }
}
