//! Patient Records Core Library
//!
//! Validation, partial-update reconciliation and querying for patient
//! health records kept in a single flat document.
//!
//! # Architecture
//!
//! ```text
//!   request fields ──► Patient::validate ──► bmi / verdict derived
//!                                │
//!   partial fields ──► PatientUpdate::apply (merge over stored, revalidate)
//!                                │
//!                ┌───────────────▼───────────────┐
//!                │        PatientRegistry        │
//!                │  lock → load → mutate → save  │
//!                └───────────────┬───────────────┘
//!                                │
//!                          RecordStore
//!                   (JsonFileStore / MemoryStore)
//! ```
//!
//! # Modules
//!
//! - [`models`]: Patient entity, derived fields, partial updates, validation errors
//! - [`store`]: Whole-collection load/save behind the [`RecordStore`] trait
//! - [`query`]: Listing, lookup and sorting over a loaded collection

pub mod models;
pub mod query;
pub mod store;

// Re-export commonly used types
pub use models::{
    compute_bmi, Fields, Gender, GenderPolicy, Patient, PatientUpdate, ValidationError, Verdict,
    Violation,
};
pub use query::{QueryError, RecordEntry, SortField, SortOrder};
pub use store::{Collection, JsonFileStore, MemoryStore, RecordStore, StoreError};

use std::sync::{Mutex, MutexGuard};

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Patient already exists: {0}")]
    Duplicate(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<QueryError> for RecordsError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::NotFound(id) => RecordsError::NotFound(id),
            other @ QueryError::InvalidArgument { .. } => {
                RecordsError::InvalidArgument(other.to_string())
            }
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for RecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RecordsError::LockPoisoned(e.to_string())
    }
}

pub type RecordsResult<T> = Result<T, RecordsError>;

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe registry over a record store.
///
/// Every operation holds the store lock for its full load → mutate → save
/// sequence, so concurrent writers cannot lose each other's updates.
pub struct PatientRegistry<S> {
    store: Mutex<S>,
}

impl<S: RecordStore> PatientRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> RecordsResult<MutexGuard<'_, S>> {
        Ok(self.store.lock()?)
    }

    /// Run a closure against the underlying store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> RecordsResult<R> {
        let store = self.lock()?;
        Ok(f(&store))
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// The full collection.
    pub fn list(&self) -> RecordsResult<Collection> {
        let store = self.lock()?;
        Ok(store.load()?)
    }

    /// All records with their ids, in collection order.
    pub fn entries(&self) -> RecordsResult<Vec<RecordEntry>> {
        let collection = self.list()?;
        Ok(query::list_all(&collection))
    }

    /// Number of stored records.
    pub fn count(&self) -> RecordsResult<usize> {
        Ok(self.list()?.len())
    }

    /// Stored fields of one patient.
    pub fn get(&self, id: &str) -> RecordsResult<Fields> {
        let collection = self.list()?;
        Ok(query::get_by_id(&collection, id)?.clone())
    }

    /// Records sorted on a named field. Arguments are checked before the
    /// store is read.
    pub fn sorted(&self, sort_by: &str, order: &str) -> RecordsResult<Vec<RecordEntry>> {
        let field: SortField = sort_by.parse()?;
        let order: SortOrder = order.parse()?;
        let collection = self.list()?;
        Ok(query::sort(&collection, field, order))
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Validate and insert a new patient.
    ///
    /// Validation runs before the store is touched; a duplicate id leaves
    /// the stored collection unchanged.
    pub fn create(&self, fields: &Fields) -> RecordsResult<Patient> {
        let patient = Patient::validate(fields, GenderPolicy::Create)?;

        let store = self.lock()?;
        let mut collection = store.load()?;
        if collection.contains(&patient.id) {
            tracing::debug!(patient_id = %patient.id, "Rejected duplicate patient");
            return Err(RecordsError::Duplicate(patient.id));
        }

        collection.insert(&patient);
        store.save(&collection)?;

        tracing::info!(
            patient_id = %patient.id,
            bmi = patient.bmi,
            verdict = %patient.verdict,
            "Patient created"
        );
        Ok(patient)
    }

    /// Apply a partial update to an existing patient.
    pub fn update(&self, id: &str, update: &PatientUpdate) -> RecordsResult<Patient> {
        let store = self.lock()?;
        let mut collection = store.load()?;
        let existing = collection
            .get(id)
            .ok_or_else(|| RecordsError::NotFound(id.to_string()))?;

        let patient = update.apply(id, existing).map_err(|e| {
            tracing::debug!(patient_id = %id, error = %e, "Rejected patient update");
            e
        })?;

        collection.insert(&patient);
        store.save(&collection)?;

        tracing::info!(
            patient_id = %id,
            fields = ?update.changed_fields().collect::<Vec<_>>(),
            verdict = %patient.verdict,
            "Patient updated"
        );
        Ok(patient)
    }

    /// Remove a patient.
    pub fn delete(&self, id: &str) -> RecordsResult<()> {
        let store = self.lock()?;
        let mut collection = store.load()?;
        if collection.remove(id).is_none() {
            return Err(RecordsError::NotFound(id.to_string()));
        }
        store.save(&collection)?;

        tracing::info!(patient_id = %id, "Patient deleted");
        Ok(())
    }
}
