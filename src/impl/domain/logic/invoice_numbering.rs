use chrono::NaiveDate;

/// Invoice number such as `INV-20240601-0007`: the issue date followed by the
/// sequence number of the invoice within that day.
pub(crate) fn format_invoice_number(prefix: &str, issue_date: NaiveDate, sequence: i64) -> String {
    format!("{}-{}-{:04}", prefix, issue_date.format("%Y%m%d"), sequence)
}
