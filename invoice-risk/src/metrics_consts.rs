pub const EVENTS_RECEIVED: &str = "invoice_risk_events_received";
pub const EVENT_PARSE_ERROR: &str = "invoice_risk_event_parse_error";
pub const RECORDS_INVALID: &str = "invoice_risk_records_invalid_dropped";
pub const RECORDS_ON_TIME: &str = "invoice_risk_records_on_time_skipped";
pub const RECORDS_CLASSIFIED: &str = "invoice_risk_records_classified";
pub const CLASSIFY_FAILURES: &str = "invoice_risk_classify_failures";
pub const RECORDS_PUBLISHED: &str = "invoice_risk_records_published";
pub const CLASSIFY_TIME: &str = "invoice_risk_classify_time_ms";
