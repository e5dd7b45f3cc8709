use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use super::{
    appointment::Appointment,
    contract::{ClientId, Contract},
    date_range::DateRange,
    invoice::{Invoice, InvoiceId, InvoiceStatus, NewInvoice},
};

// Read side.
// ---
//
// Implementations must be safe for concurrent reads. Connectivity failures
// should be reported as `StoreUnavailable`.

#[async_trait]
pub trait ContractStore: Send + Sync {
    /// All contracts of the client whose validity shares at least one day with
    /// `range`, regardless of status.
    async fn list_contracts_for_client(
        &self,
        client_id: ClientId,
        range: &DateRange,
    ) -> Result<Vec<Contract>, ServerError>;

    async fn list_client_ids(&self) -> Result<Vec<ClientId>, ServerError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Appointments linked to the client overlapping `[from, until)`.
    async fn list_client_appointments(
        &self,
        client_id: ClientId,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<Appointment>, ServerError>;
}

// Write side.
// ---

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Highest sequence number already used on `date`, 0 if none.
    async fn max_invoice_sequence_for_date(&self, date: NaiveDate) -> Result<i64, ServerError>;

    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, ServerError>;

    /// Writes `credit_note` and cancels the invoice it credits as a single
    /// atomic step. Fails without writing anything if the original is missing
    /// or already canceled.
    async fn insert_credit_note(
        &self,
        credit_note: NewInvoice,
        original_id: InvoiceId,
    ) -> Result<Invoice, ServerError>;

    async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>, ServerError>;

    async fn update_invoice_status(
        &self,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, ServerError>;

    /// Records a completed payment and returns the total paid so far.
    async fn add_payment(
        &self,
        invoice_id: InvoiceId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Decimal, ServerError>;

    /// Sum of the completed payments recorded for the invoice.
    async fn total_paid(&self, invoice_id: InvoiceId) -> Result<Decimal, ServerError>;
}
