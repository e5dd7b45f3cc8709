use chrono::NaiveDate;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};

use crate::entities::{
    ClientId, Invoice, InvoiceDetail, InvoiceOverview, PrecomputedInvoice, SenderId,
};

use super::{
    closed_enum_model::{InvoiceStatusModel, InvoiceTypeModel},
    invoice_detail_model::InvoiceDetailModel,
};

/// Body of `POST /invoices/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateInvoiceRequest {
    pub client_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Body of `POST /invoices`: an invoice computed outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: i64,
    #[serde(default)]
    pub sender_id: Option<i64>,
    #[serde(default)]
    pub invoice_type: Option<InvoiceTypeModel>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: Option<InvoiceStatusModel>,
    pub invoice_details: Vec<InvoiceDetailModel>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterPaymentRequest {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub id: i64,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatusModel,
    pub invoice_type: InvoiceTypeModel,
    pub invoice_details: Vec<InvoiceDetailModel>,
    pub pre_vat_total_amount: Decimal,
    pub total_amount: Decimal,
    pub client_id: i64,
    pub sender_id: Option<i64>,
    /// Invoice credited by this one, for credit notes.
    pub original_invoice_id: Option<i64>,
    pub warning_count: usize,
}

/// Body returned by `GET /invoices/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceOverviewResponse {
    #[serde(flatten)]
    pub invoice: InvoiceResponse,
    pub total_paid: Decimal,
    pub payment_completion_percentage: Decimal,
}

// --

impl TryFrom<CreateInvoiceRequest> for PrecomputedInvoice {
    type Error = ServerError;

    fn try_from(request: CreateInvoiceRequest) -> Result<Self, Self::Error> {
        Ok(PrecomputedInvoice {
            client_id: ClientId(request.client_id),
            sender_id: request.sender_id.map(SenderId),
            invoice_type: request.invoice_type.map(Into::into).unwrap_or_default(),
            issue_date: request.issue_date,
            due_date: request.due_date,
            invoice_details: request
                .invoice_details
                .into_iter()
                .map(InvoiceDetail::try_from)
                .collect::<Result<_, _>>()?,
            total_amount: request.total_amount,
            status: request.status.map(Into::into).unwrap_or_default(),
        })
    }
}

impl TryFrom<&Invoice> for InvoiceResponse {
    type Error = ServerError;

    fn try_from(invoice: &Invoice) -> Result<Self, Self::Error> {
        Ok(InvoiceResponse {
            id: invoice.id.0,
            invoice_number: invoice.invoice_number.clone(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            status: invoice.status.into(),
            invoice_type: invoice.invoice_type.into(),
            invoice_details: invoice.invoice_details.iter().map(Into::into).collect(),
            pre_vat_total_amount: invoice.pre_vat_total_amount()?,
            total_amount: invoice.total_amount,
            client_id: invoice.client_id.0,
            sender_id: invoice.sender_id.map(|s| s.0),
            original_invoice_id: invoice.original_invoice_id.map(|id| id.0),
            warning_count: invoice.warning_count,
        })
    }
}

impl TryFrom<&InvoiceOverview> for InvoiceOverviewResponse {
    type Error = ServerError;

    fn try_from(overview: &InvoiceOverview) -> Result<Self, Self::Error> {
        Ok(InvoiceOverviewResponse {
            invoice: InvoiceResponse::try_from(&overview.invoice)?,
            total_paid: overview.total_paid,
            payment_completion_percentage: overview.payment_completion_percentage,
        })
    }
}
