use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::entities::{Appointment, ClientId, Contract, DateRange};

#[async_trait]
pub(crate) trait BillingRepository: Send + Sync {
    /// Contracts overlapping `range`, ordered by validity start then id.
    async fn contracts_for_client(
        &self,
        client_id: ClientId,
        range: &DateRange,
    ) -> Result<Vec<Contract>, ServerError>;

    /// Appointments linked to the client touching any instant of `period`.
    async fn appointments_for_client(
        &self,
        client_id: ClientId,
        period: &DateRange,
    ) -> Result<Vec<Appointment>, ServerError>;

    async fn client_ids(&self) -> Result<Vec<ClientId>, ServerError>;
}
