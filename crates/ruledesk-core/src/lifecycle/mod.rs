//! Client-side rule lifecycle
//!
//! [`EditState`] is the single authoritative value for what the user is
//! editing. Transitions consume a state and return the next one;
//! [`ActionGates::evaluate`] derives which actions are legal from it.
//! Network calls live in `ruledesk-client`, which drives these transitions.

pub mod gates;
pub mod notice;
pub mod policy;
pub mod state;
pub mod template;

pub use gates::{Action, ActionGates};
pub use notice::{Notice, Severity};
pub use policy::{AlwaysModifiable, LockedRules, ModifiablePolicy};
pub use state::{Baseline, EditState};
pub use template::DEFAULT_TEMPLATE;
