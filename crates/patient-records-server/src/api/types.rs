//! Shared API types.

use std::sync::Arc;

use patient_records_core::{PatientRegistry, RecordStore};
use serde::Serialize;

/// Any store the server can run against.
pub type DynStore = Box<dyn RecordStore + Send>;

/// Registry shared across request handlers.
pub type SharedRegistry = Arc<PatientRegistry<DynStore>>;

/// Handler state.
#[derive(Clone)]
pub struct ApiContext {
    pub registry: SharedRegistry,
}

impl ApiContext {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Wrap a concrete store in a fresh registry.
    pub fn with_store<S: RecordStore + Send + 'static>(store: S) -> Self {
        let store: DynStore = Box::new(store);
        Self::new(Arc::new(PatientRegistry::new(store)))
    }
}

/// Confirmation payload for write endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
