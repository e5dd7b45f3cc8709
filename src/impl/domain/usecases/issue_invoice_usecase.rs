use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use fractic_server_error::ServerError;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    config::BillingConfig,
    data::repositories::invoice_repository_impl::InvoiceRepositoryImpl,
    domain::{
        logic::{
            credit_note::credit_note_details, invoice_numbering::format_invoice_number,
            invoice_verification::verify_total_amount,
            payment_status::{determine_invoice_status, payment_completion_percentage},
        },
        repositories::invoice_repository::InvoiceRepository,
    },
    entities::{
        Invoice, InvoiceId, InvoiceOverview, InvoiceResult, InvoiceStatus, InvoiceStore,
        InvoiceType, NewInvoice, PrecomputedInvoice,
    },
    errors::{
        CannotCreditCreditNote, DateOutOfRange, InvalidPaymentAmount, InvoiceAlreadyCanceled,
    },
};

#[async_trait]
pub trait IssueInvoiceUsecase: Send + Sync {
    /// Persists a generated result as a standard invoice. `due_date` defaults
    /// to the configured number of days after `issue_date`, `status` to
    /// `Concept`.
    async fn issue(
        &self,
        result: InvoiceResult,
        issue_date: NaiveDate,
        due_date: Option<NaiveDate>,
        status: Option<InvoiceStatus>,
    ) -> Result<Invoice, ServerError>;

    /// Persists an invoice computed elsewhere, bypassing generation.
    async fn create(&self, invoice: PrecomputedInvoice) -> Result<Invoice, ServerError>;

    /// Issues a credit note for `invoice_id` and cancels the original. An
    /// invoice can be credited once; credit notes cannot be credited.
    async fn credit(&self, invoice_id: InvoiceId, issue_date: NaiveDate)
        -> Result<Invoice, ServerError>;

    async fn register_payment(
        &self,
        invoice_id: InvoiceId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Invoice, ServerError>;

    /// The invoice with the share of its total already paid.
    async fn overview(&self, invoice_id: InvoiceId) -> Result<InvoiceOverview, ServerError>;
}

pub(crate) struct IssueInvoiceUsecaseImpl<
    S,
    R1 = InvoiceRepositoryImpl<S>, // Default.
> where
    S: InvoiceStore,
    R1: InvoiceRepository,
{
    invoice_repository: R1,
    config: BillingConfig,
    _phantom: std::marker::PhantomData<S>,
}

#[async_trait]
impl<S, R1> IssueInvoiceUsecase for IssueInvoiceUsecaseImpl<S, R1>
where
    S: InvoiceStore,
    R1: InvoiceRepository,
{
    async fn issue(
        &self,
        result: InvoiceResult,
        issue_date: NaiveDate,
        due_date: Option<NaiveDate>,
        status: Option<InvoiceStatus>,
    ) -> Result<Invoice, ServerError> {
        verify_total_amount(&result.invoice_details, result.total_amount)?;
        let warning_count = result.warning_count();
        let due_date = match due_date {
            Some(due_date) => due_date,
            None => self.default_due_date(issue_date)?,
        };
        let (invoice_number, invoice_sequence) = self.next_invoice_number(issue_date).await?;

        let invoice = self
            .invoice_repository
            .insert(NewInvoice {
                client_id: result.client_id,
                sender_id: result.sender_id,
                invoice_number,
                invoice_sequence,
                issue_date,
                due_date,
                invoice_details: result.invoice_details,
                total_amount: result.total_amount,
                status: status.unwrap_or(InvoiceStatus::Concept),
                invoice_type: InvoiceType::Standard,
                original_invoice_id: None,
                warning_count,
            })
            .await?;
        info!(
            invoice_id = invoice.id.0,
            invoice_number = %invoice.invoice_number,
            client_id = invoice.client_id.0,
            total_amount = %invoice.total_amount,
            warnings = warning_count,
            "invoice issued"
        );
        Ok(invoice)
    }

    async fn create(&self, invoice: PrecomputedInvoice) -> Result<Invoice, ServerError> {
        verify_total_amount(&invoice.invoice_details, invoice.total_amount)?;
        let (invoice_number, invoice_sequence) =
            self.next_invoice_number(invoice.issue_date).await?;
        let warning_count: usize = invoice
            .invoice_details
            .iter()
            .map(|d| d.warnings.len())
            .sum();

        let created = self
            .invoice_repository
            .insert(NewInvoice {
                client_id: invoice.client_id,
                sender_id: invoice.sender_id,
                invoice_number,
                invoice_sequence,
                issue_date: invoice.issue_date,
                due_date: invoice.due_date,
                invoice_details: invoice.invoice_details,
                total_amount: invoice.total_amount,
                status: invoice.status,
                invoice_type: invoice.invoice_type,
                original_invoice_id: None,
                warning_count,
            })
            .await?;
        info!(
            invoice_id = created.id.0,
            invoice_number = %created.invoice_number,
            "precomputed invoice stored"
        );
        Ok(created)
    }

    async fn credit(
        &self,
        invoice_id: InvoiceId,
        issue_date: NaiveDate,
    ) -> Result<Invoice, ServerError> {
        let original = self.invoice_repository.get(invoice_id).await?;
        if original.invoice_type == InvoiceType::CreditNote {
            warn!(invoice_id = invoice_id.0, "attempt to credit a credit note");
            return Err(CannotCreditCreditNote::new(invoice_id.0));
        }
        if original.status == InvoiceStatus::Canceled {
            warn!(invoice_id = invoice_id.0, "attempt to credit a canceled invoice");
            return Err(InvoiceAlreadyCanceled::new(invoice_id.0));
        }

        let due_date = self.default_due_date(issue_date)?;
        let (invoice_number, invoice_sequence) = self.next_invoice_number(issue_date).await?;
        // Status is checked again by the store under the same write.
        let credit_note = self
            .invoice_repository
            .insert_credit_note(
                NewInvoice {
                    client_id: original.client_id,
                    sender_id: original.sender_id,
                    invoice_number,
                    invoice_sequence,
                    issue_date,
                    due_date,
                    invoice_details: credit_note_details(&original.invoice_details),
                    total_amount: -original.total_amount,
                    status: InvoiceStatus::Concept,
                    invoice_type: InvoiceType::CreditNote,
                    original_invoice_id: Some(original.id),
                    warning_count: 0,
                },
                original.id,
            )
            .await?;
        info!(
            invoice_id = original.id.0,
            credit_note_id = credit_note.id.0,
            "invoice credited"
        );
        Ok(credit_note)
    }

    async fn register_payment(
        &self,
        invoice_id: InvoiceId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Invoice, ServerError> {
        if amount <= Decimal::ZERO {
            return Err(InvalidPaymentAmount::new(&amount.to_string()));
        }
        let invoice = self.invoice_repository.get(invoice_id).await?;
        let total_paid = self
            .invoice_repository
            .add_payment(invoice_id, amount, date)
            .await?;
        let status = determine_invoice_status(
            invoice.total_amount,
            total_paid,
            self.config.payment_tolerance,
        );
        info!(
            invoice_id = invoice_id.0,
            total_paid = %total_paid,
            status = ?status,
            "payment registered"
        );
        self.invoice_repository.set_status(invoice_id, status).await
    }

    async fn overview(&self, invoice_id: InvoiceId) -> Result<InvoiceOverview, ServerError> {
        let invoice = self.invoice_repository.get(invoice_id).await?;
        let total_paid = self.invoice_repository.total_paid(invoice_id).await?;
        let payment_completion_percentage =
            payment_completion_percentage(invoice.total_amount, total_paid)?;
        Ok(InvoiceOverview {
            invoice,
            total_paid,
            payment_completion_percentage,
        })
    }
}

impl<S, R1> IssueInvoiceUsecaseImpl<S, R1>
where
    S: InvoiceStore,
    R1: InvoiceRepository,
{
    async fn next_invoice_number(&self, issue_date: NaiveDate) -> Result<(String, i64), ServerError> {
        let sequence = self
            .invoice_repository
            .next_invoice_sequence(issue_date)
            .await?;
        Ok((
            format_invoice_number(&self.config.invoice_number_prefix, issue_date, sequence),
            sequence,
        ))
    }

    fn default_due_date(&self, issue_date: NaiveDate) -> Result<NaiveDate, ServerError> {
        let days = self.config.invoice_due_days;
        u64::try_from(days)
            .ok()
            .and_then(|days| issue_date.checked_add_days(Days::new(days)))
            .ok_or_else(|| DateOutOfRange::new(&format!("{issue_date} plus {days} days")))
    }
}

impl<S: InvoiceStore> IssueInvoiceUsecaseImpl<S> {
    pub(crate) fn new(store: Arc<S>, config: BillingConfig) -> Self {
        IssueInvoiceUsecaseImpl {
            invoice_repository: InvoiceRepositoryImpl::new(store),
            config,
            _phantom: std::marker::PhantomData,
        }
    }
}
