use chrono::NaiveDateTime;

use super::contract::ClientId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppointmentId(pub i64);

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Every linked client is attributed the full duration.
    pub client_ids: Vec<ClientId>,
}

impl Appointment {
    pub fn is_linked_to(&self, client_id: ClientId) -> bool {
        self.client_ids.contains(&client_id)
    }

    /// Seconds of this appointment falling inside `[from, until)`.
    pub fn overlap_seconds(&self, from: NaiveDateTime, until: NaiveDateTime) -> i64 {
        let start = std::cmp::max(self.start_time, from);
        let end = std::cmp::min(self.end_time, until);
        if start >= end {
            0
        } else {
            (end - start).num_seconds()
        }
    }
}
