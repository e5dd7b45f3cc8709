use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use fractic_server_error::ServerError;
use tracing::{info, Instrument as _};

use crate::{
    config::BillingConfig,
    data::repositories::billing_repository_impl::BillingRepositoryImpl,
    domain::{
        logic::invoice_assembler::InvoiceAssembler,
        repositories::billing_repository::BillingRepository,
    },
    entities::{AppointmentStore, ClientId, ContractStore, DateRange, InvoiceResult},
    errors::InvalidClientId,
};

#[async_trait]
pub trait GenerateInvoiceUsecase: Send + Sync {
    /// Computes the invoice of a client for `[start, end]` (both inclusive).
    /// Nothing is written; repeated calls over unchanged data return equal
    /// results.
    async fn generate(
        &self,
        client_id: ClientId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<InvoiceResult, ServerError>;

    async fn client_ids(&self) -> Result<Vec<ClientId>, ServerError>;
}

pub(crate) struct GenerateInvoiceUsecaseImpl<
    S,
    R1 = BillingRepositoryImpl<S>, // Default.
> where
    S: ContractStore + AppointmentStore,
    R1: BillingRepository,
{
    billing_repository: R1,
    config: BillingConfig,
    _phantom: std::marker::PhantomData<S>,
}

#[async_trait]
impl<S, R1> GenerateInvoiceUsecase for GenerateInvoiceUsecaseImpl<S, R1>
where
    S: ContractStore + AppointmentStore,
    R1: BillingRepository,
{
    async fn generate(
        &self,
        client_id: ClientId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<InvoiceResult, ServerError> {
        if client_id.0 <= 0 {
            return Err(InvalidClientId::new(client_id.0));
        }
        let range = DateRange::new(start, end)?;

        let span = tracing::info_span!("generate_invoice", client_id = client_id.0, range = %range);
        async move {
            let result = InvoiceAssembler::new(&self.billing_repository, &self.config)
                .assemble(client_id, range)
                .await?;
            info!(
                contracts = result.invoice_details.len(),
                total_amount = %result.total_amount,
                warnings = result.warning_count(),
                "invoice generated"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    async fn client_ids(&self) -> Result<Vec<ClientId>, ServerError> {
        self.billing_repository.client_ids().await
    }
}

impl<S> GenerateInvoiceUsecaseImpl<S>
where
    S: ContractStore + AppointmentStore,
{
    pub(crate) fn new(store: Arc<S>, config: BillingConfig) -> Self {
        GenerateInvoiceUsecaseImpl {
            billing_repository: BillingRepositoryImpl::new(store),
            config,
            _phantom: std::marker::PhantomData,
        }
    }
}
