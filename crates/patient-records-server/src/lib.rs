//! Patient Records Server
//!
//! HTTP surface over [`patient_records_core`]: list, view, sort, create,
//! edit and delete patient records kept in a flat JSON document.
//!
//! # Modules
//!
//! - [`api`]: axum router, handlers and error mapping
//! - [`config`]: constants and server settings
//! - [`server`]: store setup, listener binding and graceful shutdown

pub mod api;
pub mod config;
pub mod server;

pub use api::patient_api_router;
pub use config::ServerConfig;
