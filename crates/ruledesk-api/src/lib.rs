//! RuleDesk API - HTTP surface
//!
//! JSON endpoints over the engine, backed by any `RuleStorage` +
//! `IdentifierAllocator` pair. Storage calls are synchronous and run on
//! the blocking pool.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::router;
pub use server::serve;
pub use state::AppState;
