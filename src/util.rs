use std::sync::Arc;

use chrono::{Days, NaiveDate};
use fractic_server_error::ServerError;
use tracing::{error, info, info_span, Instrument as _};

use crate::{
    config::BillingConfig,
    domain::usecases::{
        generate_invoice_usecase::{GenerateInvoiceUsecase as _, GenerateInvoiceUsecaseImpl},
        issue_invoice_usecase::{IssueInvoiceUsecase as _, IssueInvoiceUsecaseImpl},
    },
    entities::{
        AppointmentStore, ClientId, ContractStore, Invoice, InvoiceId, InvoiceResult,
        InvoiceStore, PrecomputedInvoice,
    },
    errors::DateOutOfRange,
    models::{
        CreateInvoiceRequest, GenerateInvoiceRequest, InvoiceOverviewResponse, InvoiceResponse,
        RegisterPaymentRequest,
    },
};

/// Length of the window covered by a batch run, ending the day before it.
const BATCH_WINDOW_DAYS: u64 = 28;

/// Entry point of the billing engine, bound to a store implementing every
/// collaborator trait (ex. [`InMemoryStore`](crate::stores::InMemoryStore)).
pub struct CareBillingUtil<S>
where
    S: ContractStore + AppointmentStore + InvoiceStore,
{
    generate_usecase: GenerateInvoiceUsecaseImpl<S>,
    issue_usecase: IssueInvoiceUsecaseImpl<S>,
}

impl<S> CareBillingUtil<S>
where
    S: ContractStore + AppointmentStore + InvoiceStore,
{
    pub fn new(store: Arc<S>, config: BillingConfig) -> Self {
        Self {
            generate_usecase: GenerateInvoiceUsecaseImpl::new(store.clone(), config.clone()),
            issue_usecase: IssueInvoiceUsecaseImpl::new(store, config),
        }
    }

    /// Computes the invoice for `[start, end]` without persisting anything.
    pub async fn generate_invoice(
        &self,
        client_id: ClientId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<InvoiceResult, ServerError> {
        self.generate_usecase.generate(client_id, start, end).await
    }

    /// Generates the invoice for `[start, end]` and stores it as a concept
    /// invoice issued on `issue_date`.
    pub async fn issue_invoice(
        &self,
        client_id: ClientId,
        start: NaiveDate,
        end: NaiveDate,
        issue_date: NaiveDate,
    ) -> Result<Invoice, ServerError> {
        let result = self.generate_usecase.generate(client_id, start, end).await?;
        self.issue_usecase.issue(result, issue_date, None, None).await
    }

    /// Handles a generate request: the invoice is computed, issued on
    /// `issue_date` and returned in its wire shape. Returns `None`, without
    /// consuming an invoice number, when the client has no contract in range.
    pub async fn handle_generate_request(
        &self,
        request: GenerateInvoiceRequest,
        issue_date: NaiveDate,
    ) -> Result<Option<InvoiceResponse>, ServerError> {
        self.issue_if_billable(
            ClientId(request.client_id),
            request.start_date,
            request.end_date,
            issue_date,
        )
        .await?
        .as_ref()
        .map(InvoiceResponse::try_from)
        .transpose()
    }

    /// Stores an invoice computed elsewhere, once its total matches its
    /// details.
    pub async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<InvoiceResponse, ServerError> {
        let invoice = self
            .issue_usecase
            .create(PrecomputedInvoice::try_from(request)?)
            .await?;
        InvoiceResponse::try_from(&invoice)
    }

    /// Fetches a stored invoice together with its payment progress.
    pub async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<InvoiceOverviewResponse, ServerError> {
        let overview = self.issue_usecase.overview(invoice_id).await?;
        InvoiceOverviewResponse::try_from(&overview)
    }

    /// Issues a credit note for the invoice and cancels it.
    pub async fn credit_invoice(
        &self,
        invoice_id: InvoiceId,
        issue_date: NaiveDate,
    ) -> Result<Invoice, ServerError> {
        self.issue_usecase.credit(invoice_id, issue_date).await
    }

    pub async fn register_payment(
        &self,
        invoice_id: InvoiceId,
        request: RegisterPaymentRequest,
    ) -> Result<Invoice, ServerError> {
        self.issue_usecase
            .register_payment(invoice_id, request.amount, request.payment_date)
            .await
    }

    /// Generates and issues an invoice for every known client over
    /// `[start, end]`. A failing client is logged and skipped; clients with
    /// nothing to bill get no invoice.
    pub async fn batch_generate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        issue_date: NaiveDate,
    ) -> Result<Vec<Invoice>, ServerError> {
        let span = info_span!("batch_generate", start = %start, end = %end);
        async move {
            let client_ids = self
                .generate_usecase
                .client_ids()
                .await
                .inspect_err(|e| error!(error = %e, "failed to fetch client ids"))?;
            info!(clients = client_ids.len(), "starting batch invoice generation");

            let mut issued = Vec::new();
            for client_id in client_ids {
                match self.issue_if_billable(client_id, start, end, issue_date).await {
                    Ok(Some(invoice)) => issued.push(invoice),
                    Ok(None) => info!(client_id = client_id.0, "nothing to bill"),
                    Err(e) => {
                        error!(client_id = client_id.0, error = %e, "failed to generate invoice")
                    }
                }
            }
            info!(issued = issued.len(), "batch invoice generation finished");
            Ok(issued)
        }
        .instrument(span)
        .await
    }

    /// Runs [`batch_generate`](Self::batch_generate) over the 28 days ending
    /// the day before `today`, issuing on `today`.
    pub async fn batch_generate_until(&self, today: NaiveDate) -> Result<Vec<Invoice>, ServerError> {
        let (start, end) = batch_window(today)?;
        self.batch_generate(start, end, today).await
    }

    async fn issue_if_billable(
        &self,
        client_id: ClientId,
        start: NaiveDate,
        end: NaiveDate,
        issue_date: NaiveDate,
    ) -> Result<Option<Invoice>, ServerError> {
        let result = self.generate_usecase.generate(client_id, start, end).await?;
        if result.is_empty() {
            return Ok(None);
        }
        self.issue_usecase
            .issue(result, issue_date, None, None)
            .await
            .map(Some)
    }
}

fn batch_window(today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ServerError> {
    let start = today.checked_sub_days(Days::new(BATCH_WINDOW_DAYS));
    let end = today.checked_sub_days(Days::new(1));
    start
        .zip(end)
        .ok_or_else(|| DateOutOfRange::new(&format!("batch window before {today}")))
}
