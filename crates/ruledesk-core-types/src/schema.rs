//! Canonical schema constants for structured logging and events
//!
//! These constants keep log fields and HTTP headers consistent across crates.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_RULE_ID: &str = "rule_id";
pub const FIELD_CORE_ID: &str = "core_id";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Header carrying the caller's request id across the HTTP boundary
pub const HEADER_REQUEST_ID: &str = "x-request-id";
