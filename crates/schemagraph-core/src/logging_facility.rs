//! Structured logging facility for the schema graph engine
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Graph-level boundaries (metadata import, cross-graph merges) log start and
//! end events. Silent rejections inside objects are logged with
//! `tracing::debug!` only.
//!
//! # Usage
//!
//! ```rust
//! use schemagraph_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
