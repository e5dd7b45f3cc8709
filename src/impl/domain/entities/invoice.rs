use chrono::NaiveDate;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::domain::logic::amount_arithmetic::checked_sum;

use super::{
    contract::{CareType, ClientId, ContractId, PriceTimeUnit, SenderId},
    date_range::DateRange,
    warning::Warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceId(pub i64);

/// Billable quantity recorded for a single period.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodQuantity {
    Ambulante {
        /// `None` if minutes were not computed for this period, `Some(0)` if
        /// they were and no activity was recorded.
        total_minutes: Option<i64>,
        /// Minutes actually charged (recorded minutes limited by any hours cap).
        billed_minutes: Decimal,
    },
    Accommodation {
        days: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePeriod {
    pub range: DateRange,
    pub quantity: PeriodQuantity,
    /// Pre-VAT amount, unrounded.
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetail {
    pub contract_id: ContractId,
    pub contract_type: CareType,
    pub periods: Vec<InvoicePeriod>,
    pub pre_vat_total: Decimal,
    pub vat: u32,
    pub total: Decimal,
    pub price: Decimal,
    pub price_time_unit: PriceTimeUnit,
    pub warnings: Vec<Warning>,
}

/// Pure output of invoice generation; nothing is persisted to produce it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceResult {
    pub client_id: ClientId,
    /// Payer of the first billed contract that names one.
    pub sender_id: Option<SenderId>,
    pub range: DateRange,
    pub pre_vat_total_amount: Decimal,
    pub total_amount: Decimal,
    pub invoice_details: Vec<InvoiceDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvoiceStatus {
    Outstanding,
    PartiallyPaid,
    Paid,
    Expired,
    Overpaid,
    Imported,
    #[default]
    Concept,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvoiceType {
    #[default]
    Standard,
    CreditNote,
}

/// Invoice ready to be written by an [`InvoiceStore`](super::stores::InvoiceStore).
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub client_id: ClientId,
    pub sender_id: Option<SenderId>,
    pub invoice_number: String,
    pub invoice_sequence: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub invoice_details: Vec<InvoiceDetail>,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub invoice_type: InvoiceType,
    /// Invoice being credited, set on credit notes only.
    pub original_invoice_id: Option<InvoiceId>,
    pub warning_count: usize,
}

/// Invoice computed or edited outside the engine, persisted as given once its
/// totals check out.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedInvoice {
    pub client_id: ClientId,
    pub sender_id: Option<SenderId>,
    pub invoice_type: InvoiceType,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub invoice_details: Vec<InvoiceDetail>,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
}

/// Persisted invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub client_id: ClientId,
    pub sender_id: Option<SenderId>,
    pub invoice_number: String,
    pub invoice_sequence: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub invoice_details: Vec<InvoiceDetail>,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub invoice_type: InvoiceType,
    pub original_invoice_id: Option<InvoiceId>,
    pub warning_count: usize,
}

/// Persisted invoice together with its payment progress.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceOverview {
    pub invoice: Invoice,
    pub total_paid: Decimal,
    /// Paid share of the total in percent, 0 for invoices without a total.
    pub payment_completion_percentage: Decimal,
}

// --

impl InvoiceDetail {
    pub fn has_warning(&self, message: &str) -> bool {
        self.warnings.iter().any(|w| w.matches(message))
    }
}

impl Invoice {
    /// Sum of the details' pre-VAT totals.
    pub fn pre_vat_total_amount(&self) -> Result<Decimal, ServerError> {
        checked_sum(
            self.invoice_details.iter().map(|d| d.pre_vat_total),
            "invoice pre-VAT total",
        )
    }
}

impl InvoiceResult {
    pub fn empty(client_id: ClientId, range: DateRange) -> Self {
        Self {
            client_id,
            sender_id: None,
            range,
            pre_vat_total_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            invoice_details: Vec::new(),
        }
    }

    pub fn warning_count(&self) -> usize {
        self.invoice_details.iter().map(|d| d.warnings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.invoice_details.is_empty()
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
