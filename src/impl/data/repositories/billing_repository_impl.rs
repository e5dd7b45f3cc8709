use std::sync::Arc;

use async_trait::async_trait;
use fractic_server_error::ServerError;
use tracing::error;

use crate::{
    domain::repositories::billing_repository::BillingRepository,
    entities::{Appointment, AppointmentStore, ClientId, Contract, ContractStore, DateRange},
};

pub(crate) struct BillingRepositoryImpl<S>
where
    S: ContractStore + AppointmentStore,
{
    store: Arc<S>,
}

impl<S> BillingRepositoryImpl<S>
where
    S: ContractStore + AppointmentStore,
{
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> BillingRepository for BillingRepositoryImpl<S>
where
    S: ContractStore + AppointmentStore,
{
    async fn contracts_for_client(
        &self,
        client_id: ClientId,
        range: &DateRange,
    ) -> Result<Vec<Contract>, ServerError> {
        let mut contracts = self
            .store
            .list_contracts_for_client(client_id, range)
            .await
            .inspect_err(|e| {
                error!(client_id = client_id.0, error = ?e, "contract retrieval failed")
            })?;

        // Stores may return extra rows; only the client's overlapping contracts
        // are candidates.
        contracts.retain(|c| c.client_id == client_id && c.validity.overlaps(range));
        contracts.sort_by_key(|c| (c.validity.start(), c.id));
        Ok(contracts)
    }

    async fn appointments_for_client(
        &self,
        client_id: ClientId,
        period: &DateRange,
    ) -> Result<Vec<Appointment>, ServerError> {
        let (from, until) = period.instant_window();
        let mut appointments = self
            .store
            .list_client_appointments(client_id, from, until)
            .await
            .inspect_err(|e| {
                error!(client_id = client_id.0, period = %period, error = ?e, "appointment retrieval failed")
            })?;

        appointments.retain(|a| a.is_linked_to(client_id));
        appointments.sort_by_key(|a| (a.start_time, a.id));
        appointments.dedup_by_key(|a| a.id);
        Ok(appointments)
    }

    async fn client_ids(&self) -> Result<Vec<ClientId>, ServerError> {
        let mut ids = self
            .store
            .list_client_ids()
            .await
            .inspect_err(|e| error!(error = ?e, "client id retrieval failed"))?;
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}
