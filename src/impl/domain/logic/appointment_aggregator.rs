use fractic_server_error::ServerError;

use crate::{
    domain::repositories::billing_repository::BillingRepository,
    entities::{Appointment, ClientId, DateRange},
};

pub(crate) struct AppointmentAggregator<'a, R: BillingRepository> {
    repository: &'a R,
}

impl<'a, R: BillingRepository> AppointmentAggregator<'a, R> {
    pub(crate) fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Minutes of care the client received inside `period`. Appointments
    /// straddling a boundary only contribute the part inside the period.
    pub(crate) async fn sum_minutes(
        &self,
        client_id: ClientId,
        period: &DateRange,
    ) -> Result<i64, ServerError> {
        let appointments = self
            .repository
            .appointments_for_client(client_id, period)
            .await?;
        Ok(clipped_minutes(&appointments, client_id, period))
    }
}

/// Seconds are summed before converting, so partial minutes of separate
/// appointments still add up; the total is floored to whole minutes.
pub(crate) fn clipped_minutes(
    appointments: &[Appointment],
    client_id: ClientId,
    period: &DateRange,
) -> i64 {
    let (from, until) = period.instant_window();
    let seconds: i64 = appointments
        .iter()
        .filter(|a| a.is_linked_to(client_id))
        .map(|a| a.overlap_seconds(from, until))
        .sum();
    seconds / 60
}
