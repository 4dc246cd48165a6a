//! RuleDesk Client - remote rule access and the editor driver
//!
//! [`RuleClient`] is the transport seam; [`HttpRuleClient`] talks to
//! `ruledesk-api`. [`RuleEditor`] drives the lifecycle state machine from
//! `ruledesk_core::lifecycle` against any client.

pub mod client;
pub mod editor;
pub mod error;
pub mod http;

pub use client::RuleClient;
pub use editor::RuleEditor;
pub use error::{ClientError, Result};
pub use http::HttpRuleClient;
