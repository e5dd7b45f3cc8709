use std::{fs, str::FromStr as _};

use chrono::NaiveDateTime;
use fractic_server_error::ServerError;

use crate::{
    data::models::iso_date_model::ISODateTimeModel,
    entities::{Appointment, AppointmentId, ClientId},
    errors::{InvalidAppointment, InvalidCsv, ReadError},
};

use super::contracts_csv_datasource::parse_integer;

/// Reads appointments from CSV with a header row and the columns
/// `id, start_time, end_time, client_ids`, where `client_ids` is a
/// `;`-separated list.
pub(crate) trait AppointmentsCsvDatasource {
    fn from_string(&self, s: &str) -> Result<Vec<Appointment>, ServerError>;

    fn from_file<P>(&self, path: P) -> Result<Vec<Appointment>, ServerError>
    where
        P: AsRef<std::path::Path>;
}

pub(crate) struct AppointmentsCsvDatasourceImpl;

impl AppointmentsCsvDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl AppointmentsCsvDatasource for AppointmentsCsvDatasourceImpl {
    fn from_string(&self, s: &str) -> Result<Vec<Appointment>, ServerError> {
        csv::Reader::from_reader(s.as_bytes())
            .records()
            .map(|r| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    // Extract from CSV record.
                    let raw_id = r.get(0).unwrap_or("");
                    let raw_start_time = r.get(1).unwrap_or("");
                    let raw_end_time = r.get(2).unwrap_or("");
                    let raw_client_ids = r.get(3).unwrap_or("");

                    // Parse.
                    let id = parse_integer("id", raw_id)?;
                    let start_time: NaiveDateTime =
                        ISODateTimeModel::from_str(raw_start_time)?.into();
                    let end_time: NaiveDateTime = ISODateTimeModel::from_str(raw_end_time)?.into();
                    let client_ids = raw_client_ids
                        .split(';')
                        .filter(|s| !s.trim().is_empty())
                        .map(|s| parse_integer("client_ids", s).map(ClientId))
                        .collect::<Result<Vec<_>, _>>()?;

                    // Validate.
                    if end_time < start_time {
                        return Err(InvalidAppointment::new(id, "end time before start time"));
                    }

                    // Build.
                    Ok(Appointment {
                        id: AppointmentId(id),
                        start_time,
                        end_time,
                        client_ids,
                    })
                })
            })
            .collect()
    }

    fn from_file<P>(&self, path: P) -> Result<Vec<Appointment>, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        self.from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_appointments_with_multiple_clients() {
        let csv = "id,start_time,end_time,client_ids\n\
                   1,2024-06-03T09:00:00,2024-06-03T10:40:00,42\n\
                   2,2024-06-04 14:00,2024-06-04 15:00,42;43\n";
        let appointments = AppointmentsCsvDatasourceImpl::new().from_string(csv).unwrap();

        assert_eq!(appointments.len(), 2);
        assert_eq!(appointments[0].client_ids, vec![ClientId(42)]);
        assert_eq!(
            (appointments[0].end_time - appointments[0].start_time).num_minutes(),
            100
        );
        assert_eq!(appointments[1].client_ids, vec![ClientId(42), ClientId(43)]);
    }

    #[test]
    fn rejects_inverted_appointment() {
        let csv = "id,start_time,end_time,client_ids\n\
                   1,2024-06-03T10:00:00,2024-06-03T09:00:00,42\n";
        assert!(AppointmentsCsvDatasourceImpl::new().from_string(csv).is_err());
    }
}
