use crate::types::InvoiceRecord;

/// Payment type that routes an invoice to risk classification. The match is
/// exact and case sensitive; the upstream process model emits this value
/// verbatim.
pub const LATE_PAY_TYPE: &str = "Late";

/// Only invoices with a positive amount are classifiable. Zero and negative
/// amounts are data-quality noise, not failures.
pub fn is_valid(record: &InvoiceRecord) -> bool {
    record.amount > 0.0
}

/// Whether the invoice was paid late and should be scored.
pub fn is_late(record: &InvoiceRecord) -> bool {
    record.pay_type == LATE_PAY_TYPE
}
