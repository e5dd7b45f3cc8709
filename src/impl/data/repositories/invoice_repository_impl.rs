use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    domain::repositories::invoice_repository::InvoiceRepository,
    entities::{Invoice, InvoiceId, InvoiceStatus, InvoiceStore, NewInvoice},
    errors::InvoiceNotFound,
};

pub(crate) struct InvoiceRepositoryImpl<S: InvoiceStore> {
    store: Arc<S>,
}

impl<S: InvoiceStore> InvoiceRepositoryImpl<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: InvoiceStore> InvoiceRepository for InvoiceRepositoryImpl<S> {
    async fn next_invoice_sequence(&self, date: NaiveDate) -> Result<i64, ServerError> {
        Ok(self.store.max_invoice_sequence_for_date(date).await? + 1)
    }

    async fn insert(&self, invoice: NewInvoice) -> Result<Invoice, ServerError> {
        self.store.insert_invoice(invoice).await
    }

    async fn insert_credit_note(
        &self,
        credit_note: NewInvoice,
        original_id: InvoiceId,
    ) -> Result<Invoice, ServerError> {
        self.store.insert_credit_note(credit_note, original_id).await
    }

    async fn get(&self, invoice_id: InvoiceId) -> Result<Invoice, ServerError> {
        self.store
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| InvoiceNotFound::new(invoice_id.0))
    }

    async fn set_status(
        &self,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, ServerError> {
        self.store.update_invoice_status(invoice_id, status).await
    }

    async fn add_payment(
        &self,
        invoice_id: InvoiceId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Decimal, ServerError> {
        self.store.add_payment(invoice_id, amount, date).await
    }

    async fn total_paid(&self, invoice_id: InvoiceId) -> Result<Decimal, ServerError> {
        self.store.total_paid(invoice_id).await
    }
}
