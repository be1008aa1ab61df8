//! Core types shared across the schema graph crates
//!
//! - **Identity types**: GraphId, ObjectId
//! - **Schema constants**: Canonical log field keys and event names

pub mod identity;
pub mod schema;

pub use identity::{GraphId, ObjectId};
