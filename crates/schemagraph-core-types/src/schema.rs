//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_GRAPH_ID: &str = "graph_id";
pub const FIELD_OBJECT_ID: &str = "object_id";
pub const FIELD_CATEGORY_ID: &str = "category_id";
pub const FIELD_PROPERTY_ID: &str = "property_id";
pub const FIELD_SCHEMA_NAME: &str = "schema_name";

// Merge outcomes
pub const FIELD_CHANGED: &str = "changed";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
