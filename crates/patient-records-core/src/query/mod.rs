//! Query service over a loaded collection.
//!
//! Listing, single-record lookup and field-ordered sorting. Nothing here
//! touches the store; callers load the collection first.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::models::Fields;
use crate::store::Collection;

/// Query errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Invalid {param}: expected one of {expected}, got '{value}'")]
    InvalidArgument {
        param: &'static str,
        expected: &'static str,
        value: String,
    },
}

pub type QueryResult<T> = Result<T, QueryError>;

/// A record together with its id.
///
/// Serializes as the stored object with `id` as the first key.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEntry {
    pub id: String,
    pub fields: Fields,
}

impl RecordEntry {
    fn new(id: &str, fields: &Fields) -> Self {
        Self {
            id: id.to_string(),
            fields: fields.clone(),
        }
    }

    /// Numeric value of a field; missing or non-numeric counts as 0.
    pub fn numeric(&self, field: &str) -> f64 {
        self.fields
            .get(field)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }
}

impl Serialize for RecordEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (key, value) in self.fields.iter().filter(|(k, _)| k.as_str() != "id") {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Field a collection can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Height => "height",
            SortField::Weight => "weight",
            SortField::Bmi => "bmi",
        }
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            _ => Err(QueryError::InvalidArgument {
                param: "sort_by",
                expected: "height, weight, bmi",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryError::InvalidArgument {
                param: "order",
                expected: "asc, desc",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All records in collection order.
pub fn list_all(collection: &Collection) -> Vec<RecordEntry> {
    collection
        .iter()
        .map(|(id, fields)| RecordEntry::new(id, fields))
        .collect()
}

/// Stored fields of a single record.
pub fn get_by_id<'c>(collection: &'c Collection, id: &str) -> QueryResult<&'c Fields> {
    collection
        .get(id)
        .ok_or_else(|| QueryError::NotFound(id.to_string()))
}

/// Records ordered on a numeric field. Ties keep collection order.
pub fn sort(collection: &Collection, field: SortField, order: SortOrder) -> Vec<RecordEntry> {
    let mut keyed: Vec<(f64, RecordEntry)> = list_all(collection)
        .into_iter()
        .map(|entry| (entry.numeric(field.as_str()), entry))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_keys(*a, *b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, entry)| entry).collect()
}

// -0.0 and 0.0 compare equal so a stored -0.0 ties with a missing field.
fn compare_keys(a: f64, b: f64) -> Ordering {
    if a == b {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}
