//! Record store layer.
//!
//! The whole collection is the unit of persistence: every read loads the
//! full document and every mutation rewrites it.

mod json_file;
mod memory;

pub use json_file::*;
pub use memory::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Fields, Patient};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record document at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Loads and persists the full collection.
pub trait RecordStore {
    fn load(&self) -> StoreResult<Collection>;

    fn save(&self, collection: &Collection) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load(&self) -> StoreResult<Collection> {
        (**self).load()
    }

    fn save(&self, collection: &Collection) -> StoreResult<()> {
        (**self).save(collection)
    }
}

/// Patient id to stored fields, in insertion order.
///
/// Serializes as the persisted document: a JSON object keyed by id whose
/// values are record objects without the id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Collection {
    records: Map<String, Value>,
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl TryFrom<Map<String, Value>> for Collection {
    type Error = String;

    fn try_from(records: Map<String, Value>) -> Result<Self, Self::Error> {
        if let Some((id, _)) = records.iter().find(|(_, v)| !v.is_object()) {
            return Err(format!("record '{}' is not a JSON object", id));
        }
        Ok(Self { records })
    }
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Stored fields for a patient.
    pub fn get(&self, id: &str) -> Option<&Fields> {
        self.records.get(id).and_then(Value::as_object)
    }

    /// Insert or replace a record. A replaced record keeps its position.
    pub fn insert(&mut self, patient: &Patient) -> Option<Fields> {
        self.insert_raw(patient.id.clone(), patient.to_stored())
    }

    /// Insert unvalidated fields, as found in a hand-edited document.
    pub fn insert_raw(&mut self, id: impl Into<String>, fields: Fields) -> Option<Fields> {
        self.records
            .insert(id.into(), Value::Object(fields))
            .and_then(into_fields)
    }

    /// Remove a record, preserving the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Fields> {
        self.records.shift_remove(id).and_then(into_fields)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fields)> {
        self.records
            .iter()
            .filter_map(|(id, v)| v.as_object().map(|fields| (id.as_str(), fields)))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

fn into_fields(value: Value) -> Option<Fields> {
    match value {
        Value::Object(fields) => Some(fields),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenderPolicy;
    use serde_json::json;

    fn patient(id: &str, height: f64, weight: f64) -> Patient {
        let fields = json!({
            "id": id, "name": "Test", "city": "Pune", "age": 40,
            "gender": "male", "height": height, "weight": weight
        });
        Patient::validate(fields.as_object().unwrap(), GenderPolicy::Create).unwrap()
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut collection = Collection::new();
        collection.insert(&patient("P003", 1.7, 70.0));
        collection.insert(&patient("P001", 1.7, 70.0));
        collection.insert(&patient("P002", 1.7, 70.0));

        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["P003", "P001", "P002"]);

        collection.insert(&patient("P001", 1.8, 90.0));
        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["P003", "P001", "P002"]);
        assert_eq!(collection.get("P001").unwrap()["weight"], json!(90.0));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut collection = Collection::new();
        for id in ["P001", "P002", "P003", "P004"] {
            collection.insert(&patient(id, 1.7, 70.0));
        }

        assert!(collection.remove("P002").is_some());
        assert!(collection.remove("P002").is_none());
        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["P001", "P003", "P004"]);
    }

    #[test]
    fn test_serializes_as_document() {
        let mut collection = Collection::new();
        collection.insert(&patient("P001", 1.8, 81.0));

        let doc = serde_json::to_value(&collection).unwrap();
        assert_eq!(doc["P001"]["bmi"], json!(25.0));
        assert_eq!(doc["P001"]["verdict"], json!("Normal"));
        assert!(doc["P001"].get("id").is_none());
    }

    #[test]
    fn test_rejects_non_object_records() {
        let result: Result<Collection, _> =
            serde_json::from_value(json!({"P001": {"name": "A"}, "P002": 7}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("P002"));

        let result: Result<Collection, _> = serde_json::from_value(json!([1, 2]));
        assert!(result.is_err());
    }
}
