//! Patient records HTTP API.
//!
//! Each handler loads the collection through the shared registry, runs
//! validation, reconciliation or a query, and persists on mutation.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::patient_api_router;
pub use types::{ApiContext, DynStore, SharedRegistry};
