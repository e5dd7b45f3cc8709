use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use fractic_server_error::ServerError;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::{
    data::models::invoice_detail_model::InvoiceDetailModel,
    entities::{
        Appointment, AppointmentStore, ClientId, Contract, ContractStore, DateRange, Invoice,
        InvoiceDetail, InvoiceId, InvoiceStatus, InvoiceStore, InvoiceType, NewInvoice, SenderId,
    },
    errors::{
        AmountOverflow, InvoiceAlreadyCanceled, InvoiceNotFound, InvoiceSerializationError,
        ReadError,
    },
};

use super::{
    appointments_csv_datasource::{AppointmentsCsvDatasource, AppointmentsCsvDatasourceImpl},
    contracts_csv_datasource::{ContractsCsvDatasource, ContractsCsvDatasourceImpl},
};

/// Store keeping contracts, appointments and invoices in memory. Invoice
/// details are kept as serialized JSON, the way they would be persisted in a
/// database column.
#[derive(Default)]
pub struct InMemoryStore {
    contracts: RwLock<Vec<Contract>>,
    appointments: RwLock<Vec<Appointment>>,
    invoices: RwLock<InvoiceTable>,
}

#[derive(Default)]
struct InvoiceTable {
    last_id: i64,
    rows: BTreeMap<InvoiceId, InvoiceRow>,
}

struct InvoiceRow {
    client_id: ClientId,
    sender_id: Option<SenderId>,
    invoice_number: String,
    invoice_sequence: i64,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    invoice_details: String,
    total_amount: Decimal,
    status: InvoiceStatus,
    invoice_type: InvoiceType,
    original_invoice_id: Option<InvoiceId>,
    warning_count: usize,
    payments: Vec<(NaiveDate, Decimal)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(contracts: Vec<Contract>, appointments: Vec<Appointment>) -> Self {
        Self {
            contracts: RwLock::new(contracts),
            appointments: RwLock::new(appointments),
            invoices: RwLock::default(),
        }
    }

    /// Builds a store from CSV text, see the CSV datasources for the expected
    /// columns.
    pub fn from_csv_strings(contracts_csv: &str, appointments_csv: &str) -> Result<Self, ServerError> {
        let contracts = ContractsCsvDatasourceImpl::new().from_string(contracts_csv)?;
        let appointments = AppointmentsCsvDatasourceImpl::new().from_string(appointments_csv)?;
        Ok(Self::with_records(contracts, appointments))
    }

    pub async fn from_csv_files<P1, P2>(contracts_path: P1, appointments_path: P2) -> Result<Self, ServerError>
    where
        P1: AsRef<std::path::Path>,
        P2: AsRef<std::path::Path>,
    {
        let contracts_csv = tokio::fs::read_to_string(contracts_path)
            .await
            .map_err(|e| ReadError::with_debug(&e))?;
        let appointments_csv = tokio::fs::read_to_string(appointments_path)
            .await
            .map_err(|e| ReadError::with_debug(&e))?;
        Self::from_csv_strings(&contracts_csv, &appointments_csv)
    }

    pub async fn add_contract(&self, contract: Contract) {
        self.contracts.write().await.push(contract);
    }

    pub async fn add_appointment(&self, appointment: Appointment) {
        self.appointments.write().await.push(appointment);
    }

    /// Every stored invoice of the client, oldest first.
    pub async fn invoices_for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>, ServerError> {
        let table = self.invoices.read().await;
        table
            .rows
            .iter()
            .filter(|(_, row)| row.client_id == client_id)
            .map(|(id, row)| row.to_invoice(*id))
            .collect()
    }
}

impl InvoiceTable {
    fn insert(&mut self, row: InvoiceRow) -> Result<Invoice, ServerError> {
        let id = InvoiceId(self.last_id + 1);
        let stored = row.to_invoice(id)?;
        self.last_id = id.0;
        self.rows.insert(id, row);
        Ok(stored)
    }
}

impl InvoiceRow {
    fn from_new_invoice(invoice: NewInvoice) -> Result<Self, ServerError> {
        let models: Vec<InvoiceDetailModel> =
            invoice.invoice_details.iter().map(Into::into).collect();
        let invoice_details = serde_json::to_string(&models)
            .map_err(|e| InvoiceSerializationError::with_debug(&invoice.invoice_number, &e))?;
        Ok(Self {
            client_id: invoice.client_id,
            sender_id: invoice.sender_id,
            invoice_number: invoice.invoice_number,
            invoice_sequence: invoice.invoice_sequence,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            invoice_details,
            total_amount: invoice.total_amount,
            status: invoice.status,
            invoice_type: invoice.invoice_type,
            original_invoice_id: invoice.original_invoice_id,
            warning_count: invoice.warning_count,
            payments: Vec::new(),
        })
    }

    fn total_paid(&self) -> Result<Decimal, ServerError> {
        self.payments
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or_else(|| AmountOverflow::new(&format!("payments of {}", self.invoice_number)))
    }

    fn to_invoice(&self, id: InvoiceId) -> Result<Invoice, ServerError> {
        let models: Vec<InvoiceDetailModel> = serde_json::from_str(&self.invoice_details)
            .map_err(|e| InvoiceSerializationError::with_debug(&self.invoice_number, &e))?;
        let invoice_details = models
            .into_iter()
            .map(InvoiceDetail::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Invoice {
            id,
            client_id: self.client_id,
            sender_id: self.sender_id,
            invoice_number: self.invoice_number.clone(),
            invoice_sequence: self.invoice_sequence,
            issue_date: self.issue_date,
            due_date: self.due_date,
            invoice_details,
            total_amount: self.total_amount,
            status: self.status,
            invoice_type: self.invoice_type,
            original_invoice_id: self.original_invoice_id,
            warning_count: self.warning_count,
        })
    }
}

#[async_trait]
impl ContractStore for InMemoryStore {
    async fn list_contracts_for_client(
        &self,
        client_id: ClientId,
        range: &DateRange,
    ) -> Result<Vec<Contract>, ServerError> {
        Ok(self
            .contracts
            .read()
            .await
            .iter()
            .filter(|c| c.client_id == client_id && c.validity.overlaps(range))
            .cloned()
            .collect())
    }

    async fn list_client_ids(&self) -> Result<Vec<ClientId>, ServerError> {
        let mut ids: Vec<ClientId> = self.contracts.read().await.iter().map(|c| c.client_id).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn list_client_appointments(
        &self,
        client_id: ClientId,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<Appointment>, ServerError> {
        Ok(self
            .appointments
            .read()
            .await
            .iter()
            .filter(|a| a.is_linked_to(client_id) && a.start_time < until && a.end_time > from)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn max_invoice_sequence_for_date(&self, date: NaiveDate) -> Result<i64, ServerError> {
        Ok(self
            .invoices
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.issue_date == date)
            .map(|row| row.invoice_sequence)
            .max()
            .unwrap_or(0))
    }

    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, ServerError> {
        let row = InvoiceRow::from_new_invoice(invoice)?;
        self.invoices.write().await.insert(row)
    }

    async fn insert_credit_note(
        &self,
        credit_note: NewInvoice,
        original_id: InvoiceId,
    ) -> Result<Invoice, ServerError> {
        let row = InvoiceRow::from_new_invoice(credit_note)?;

        // Check, insert and cancel under one write lock.
        let mut table = self.invoices.write().await;
        match table.rows.get(&original_id) {
            None => return Err(InvoiceNotFound::new(original_id.0)),
            Some(original) if original.status == InvoiceStatus::Canceled => {
                return Err(InvoiceAlreadyCanceled::new(original_id.0));
            }
            Some(_) => {}
        }
        let stored = table.insert(row)?;
        if let Some(original) = table.rows.get_mut(&original_id) {
            original.status = InvoiceStatus::Canceled;
        }
        Ok(stored)
    }

    async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>, ServerError> {
        self.invoices
            .read()
            .await
            .rows
            .get(&invoice_id)
            .map(|row| row.to_invoice(invoice_id))
            .transpose()
    }

    async fn update_invoice_status(
        &self,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, ServerError> {
        let mut table = self.invoices.write().await;
        let row = table
            .rows
            .get_mut(&invoice_id)
            .ok_or_else(|| InvoiceNotFound::new(invoice_id.0))?;
        row.status = status;
        row.to_invoice(invoice_id)
    }

    async fn add_payment(
        &self,
        invoice_id: InvoiceId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Decimal, ServerError> {
        let mut table = self.invoices.write().await;
        let row = table
            .rows
            .get_mut(&invoice_id)
            .ok_or_else(|| InvoiceNotFound::new(invoice_id.0))?;
        row.payments.push((date, amount));
        let total = row.total_paid();
        if total.is_err() {
            row.payments.pop();
        }
        total
    }

    async fn total_paid(&self, invoice_id: InvoiceId) -> Result<Decimal, ServerError> {
        self.invoices
            .read()
            .await
            .rows
            .get(&invoice_id)
            .ok_or_else(|| InvoiceNotFound::new(invoice_id.0))?
            .total_paid()
    }
}
