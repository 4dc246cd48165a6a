//! Structured logging facility for RuleDesk
//!
//! - Single initialization point via `init(profile)`
//! - Operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//!   emitting the canonical fields from `ruledesk_core_types::schema`
//! - In-memory capture for asserting on events in tests
//!
//! ```rust
//! use ruledesk_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
