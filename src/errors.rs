use chrono::NaiveDate;
use fractic_server_error::{define_client_error, define_internal_error};

// IO-related.
define_client_error!(ReadError, "Error reading file.");

// Parsing-related.
define_client_error!(InvalidCsv, "Invalid CSV format.");
define_client_error!(InvalidCsvContent, "Invalid CSV content: {details}.", { details: &str });
define_client_error!(InvalidRon, "Invalid {ron_type} (invalid RON format).", { ron_type: &str });
define_client_error!(InvalidIsoDate, "Invalid ISO date: {date}.", { date: &str });
define_client_error!(InvalidIsoDateTime, "Invalid ISO date-time: {date_time}.", { date_time: &str });
define_client_error!(InvalidIsoCurrencyCode, "Invalid ISO currency code: {code}.", { code: &str });
define_client_error!(InvalidConfig, "Invalid billing configuration: {details}.", { details: &str });
define_client_error!(InvalidAmount, "Invalid amount: {amount}.", { amount: &str });
define_client_error!(
    InvalidFieldValue,
    "Invalid value for {field}: '{value}'.",
    { field: &str, value: &str }
);

// Record validation.
define_client_error!(
    InvalidContract,
    "Invalid contract {contract_id}: {details}.",
    { contract_id: i64, details: &str }
);
define_client_error!(
    InvalidAppointment,
    "Invalid appointment {appointment_id}: {details}.",
    { appointment_id: i64, details: &str }
);

// Request validation.
define_client_error!(
    InvalidRange,
    "Invalid billing range: start date ({start}) is after end date ({end}).",
    { start: &NaiveDate, end: &NaiveDate }
);
define_client_error!(InvalidClientId, "Invalid client ID: {client_id}.", { client_id: i64 });

// Invoice-related.
define_client_error!(InvoiceNotFound, "Invoice {invoice_id} not found.", { invoice_id: i64 });
define_client_error!(
    CannotCreditCreditNote,
    "Invoice {invoice_id} is a credit note and cannot be credited.",
    { invoice_id: i64 }
);
define_client_error!(
    InvoiceAlreadyCanceled,
    "Invoice {invoice_id} is already canceled and cannot be credited again.",
    { invoice_id: i64 }
);
define_client_error!(
    InvoiceTotalMismatch,
    "Total amount does not match the sum of invoice details: expected {expected}, got {actual}.",
    { expected: &str, actual: &str }
);
define_client_error!(
    InvalidPaymentAmount,
    "Payment amount must be greater than zero (got {amount}).",
    { amount: &str }
);

// Arithmetic.
define_client_error!(
    AmountOverflow,
    "Amount too large to compute: {details}.",
    { details: &str }
);
define_client_error!(
    DateOutOfRange,
    "Date out of supported range: {details}.",
    { details: &str }
);

// Store-related.
define_internal_error!(
    StoreUnavailable,
    "Billing data store unavailable: {details}.",
    { details: &str }
);
define_internal_error!(
    InvoiceSerializationError,
    "Error (de)serializing invoice details for invoice {invoice_number}.",
    { invoice_number: &str }
);
