//! Partial update reconciliation.

use serde::Deserialize;
use serde_json::Value;

use super::patient::{Fields, Gender, GenderPolicy, Patient};
use super::validation::ValidationError;

/// Keys a partial update can never set.
const IGNORED_KEYS: [&str; 3] = ["id", "bmi", "verdict"];

/// A partial update: only the keys present in the request are applied.
///
/// A key present with `null` is distinct from an omitted key. It overwrites
/// the stored value and the merged record then fails validation for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Fields")]
pub struct PatientUpdate {
    fields: Fields,
}

impl From<Fields> for PatientUpdate {
    fn from(mut fields: Fields) -> Self {
        for key in IGNORED_KEYS {
            fields.remove(key);
        }
        Self { fields }
    }
}

impl PatientUpdate {
    /// Build an update from the keys of a request body.
    pub fn new(fields: Fields) -> Self {
        fields.into()
    }

    /// Set a single field.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        if !IGNORED_KEYS.contains(&field) {
            self.fields.insert(field.to_string(), value.into());
        }
        self
    }

    /// Names of the fields this update touches.
    pub fn changed_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Merge this update over `existing` and revalidate the result.
    ///
    /// `id` always comes from the caller and `bmi`/`verdict` are recomputed
    /// from the merged height and weight. A gender carried by the update
    /// itself is checked against [`GenderPolicy::Update`].
    pub fn apply(&self, id: &str, existing: &Fields) -> Result<Patient, ValidationError> {
        let mut merged = existing.clone();
        for (key, value) in &self.fields {
            merged.insert(key.clone(), value.clone());
        }
        merged.insert("id".into(), Value::from(id));

        // A gender sent with the update must satisfy the update rules,
        // whatever the create rules would say about it.
        let gender_rejected = self.fields.get("gender").is_some_and(|value| {
            !value
                .as_str()
                .and_then(Gender::parse)
                .is_some_and(|g| GenderPolicy::Update.accepts(g))
        });

        match Patient::validate(&merged, GenderPolicy::Create) {
            Ok(_) if gender_rejected => Err(ValidationError::new(vec![
                GenderPolicy::Update.violation(),
            ])),
            Ok(patient) => Ok(patient),
            Err(mut err) => {
                if gender_rejected {
                    let violation = GenderPolicy::Update.violation();
                    match err.violations.iter_mut().find(|v| v.field == "gender") {
                        Some(existing) => *existing = violation,
                        None => err.violations.push(violation),
                    }
                }
                Err(err)
            }
        }
    }
}
