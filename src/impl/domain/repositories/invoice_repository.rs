use async_trait::async_trait;
use chrono::NaiveDate;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::entities::{Invoice, InvoiceId, InvoiceStatus, NewInvoice};

#[async_trait]
pub(crate) trait InvoiceRepository: Send + Sync {
    /// Next free sequence number for invoices issued on `date`.
    async fn next_invoice_sequence(&self, date: NaiveDate) -> Result<i64, ServerError>;

    async fn insert(&self, invoice: NewInvoice) -> Result<Invoice, ServerError>;

    /// Inserts the credit note and cancels `original_id` atomically.
    async fn insert_credit_note(
        &self,
        credit_note: NewInvoice,
        original_id: InvoiceId,
    ) -> Result<Invoice, ServerError>;

    /// Fails with `InvoiceNotFound` if there is no such invoice.
    async fn get(&self, invoice_id: InvoiceId) -> Result<Invoice, ServerError>;

    async fn set_status(
        &self,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, ServerError>;

    async fn add_payment(
        &self,
        invoice_id: InvoiceId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Decimal, ServerError>;

    async fn total_paid(&self, invoice_id: InvoiceId) -> Result<Decimal, ServerError>;
}
