//! Patient models.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{ValidationError, Violation};

/// Untyped record fields as they arrive in a request or sit in the store.
pub type Fields = Map<String, Value>;

/// BMI below this is classified as underweight.
pub const UNDERWEIGHT_BELOW: f64 = 18.5;
/// BMI at or above this is classified as obese.
pub const OBESE_FROM: f64 = 30.0;

/// Patient gender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        }
    }

    /// Parse the exact lowercase wire form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "others" => Some(Gender::Others),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which gender values a write path accepts.
///
/// Creation accepts all three values while a partial update may only set
/// `male` or `female`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderPolicy {
    Create,
    Update,
}

impl GenderPolicy {
    pub fn allowed(&self) -> &'static [Gender] {
        match self {
            GenderPolicy::Create => &[Gender::Male, Gender::Female, Gender::Others],
            GenderPolicy::Update => &[Gender::Male, Gender::Female],
        }
    }

    pub fn accepts(&self, gender: Gender) -> bool {
        self.allowed().contains(&gender)
    }

    /// Violation reported when a value falls outside this policy.
    pub fn violation(&self) -> Violation {
        let allowed = self
            .allowed()
            .iter()
            .map(Gender::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Violation::new("gender", format!("must be one of: {}", allowed))
    }
}

/// Weight classification derived from BMI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    Underweight,
    Normal,
    Obese,
}

impl Verdict {
    /// Classify a BMI value. The 25–30 band is reported as `Normal`.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < UNDERWEIGHT_BELOW {
            Verdict::Underweight
        } else if bmi < OBESE_FROM {
            Verdict::Normal
        } else {
            Verdict::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::Normal => "Normal",
            Verdict::Obese => "Obese",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body-mass index rounded to two decimal places.
pub fn compute_bmi(height_m: f64, weight_kg: f64) -> f64 {
    let bmi = weight_kg / (height_m * height_m);
    (bmi * 100.0).round() / 100.0
}

/// A validated patient record with derived fields populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Client-supplied unique key
    pub id: String,
    /// Patient name
    pub name: String,
    /// City of residence
    pub city: String,
    /// Age in years
    pub age: i64,
    /// Gender
    pub gender: Gender,
    /// Height in meters
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    /// Derived from height and weight
    pub bmi: f64,
    /// Derived from bmi
    pub verdict: Verdict,
}

impl Patient {
    /// Validate raw fields and compute `bmi` and `verdict`.
    ///
    /// All violations are collected before returning. Any `bmi` or
    /// `verdict` present in `fields` is ignored, as are unknown keys.
    pub fn validate(fields: &Fields, policy: GenderPolicy) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(fields);

        let id = reader.string("id", true);
        let name = reader.string("name", true);
        let city = reader.string("city", false);
        let age = reader.integer("age");
        let gender = reader.gender(policy);
        let height = reader.positive_number("height");
        let weight = reader.positive_number("weight");

        match (id, name, city, age, gender, height, weight) {
            (
                Some(id),
                Some(name),
                Some(city),
                Some(age),
                Some(gender),
                Some(height),
                Some(weight),
            ) if reader.violations.is_empty() => {
                let bmi = compute_bmi(height, weight);
                if !bmi.is_finite() {
                    return Err(ValidationError::new(vec![
                        Violation::new("height", "produces a non-finite BMI"),
                        Violation::new("weight", "produces a non-finite BMI"),
                    ]));
                }
                Ok(Patient {
                    id,
                    name,
                    city,
                    age,
                    gender,
                    height,
                    weight,
                    bmi,
                    verdict: Verdict::from_bmi(bmi),
                })
            }
            _ => Err(ValidationError::new(reader.violations)),
        }
    }

    /// Persisted representation: every field except `id`, which is the
    /// collection key.
    pub fn to_stored(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::from(self.name.as_str()));
        fields.insert("city".into(), Value::from(self.city.as_str()));
        fields.insert("age".into(), Value::from(self.age));
        fields.insert("gender".into(), Value::from(self.gender.as_str()));
        fields.insert("height".into(), Value::from(self.height));
        fields.insert("weight".into(), Value::from(self.weight));
        fields.insert("bmi".into(), Value::from(self.bmi));
        fields.insert("verdict".into(), Value::from(self.verdict.as_str()));
        fields
    }
}

/// Pulls typed values out of a JSON object while recording violations.
struct FieldReader<'a> {
    fields: &'a Fields,
    violations: Vec<Violation>,
}

impl<'a> FieldReader<'a> {
    fn new(fields: &'a Fields) -> Self {
        Self {
            fields,
            violations: Vec::new(),
        }
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.violations.push(Violation::new(field, message));
    }

    fn present(&mut self, field: &str) -> Option<&'a Value> {
        let value = self.fields.get(field);
        if value.is_none() {
            self.reject(field, "field required");
        }
        value
    }

    fn string(&mut self, field: &str, non_empty: bool) -> Option<String> {
        match self.present(field)? {
            Value::String(s) if non_empty && s.is_empty() => {
                self.reject(field, "must not be empty");
                None
            }
            Value::String(s) => Some(s.clone()),
            _ => {
                self.reject(field, "must be a string");
                None
            }
        }
    }

    fn integer(&mut self, field: &str) -> Option<i64> {
        let value = self.present(field)?;
        let parsed = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        });
        if parsed.is_none() {
            self.reject(field, "must be an integer");
        }
        parsed
    }

    fn positive_number(&mut self, field: &str) -> Option<f64> {
        match self.present(field)?.as_f64() {
            Some(n) if n > 0.0 && n.is_finite() => Some(n),
            Some(_) => {
                self.reject(field, "must be greater than 0");
                None
            }
            None => {
                self.reject(field, "must be a number");
                None
            }
        }
    }

    fn gender(&mut self, policy: GenderPolicy) -> Option<Gender> {
        let value = self.present("gender")?;
        match value.as_str().and_then(Gender::parse) {
            Some(gender) if policy.accepts(gender) => Some(gender),
            _ => {
                self.violations.push(policy.violation());
                None
            }
        }
    }
}
