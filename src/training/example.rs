//! # Labeled Examples
//!
//! Raw participant submissions are validated into immutable examples
//! before they can reach the dataset.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{TrainingError, TrainingResult};

/// Contributor name used when a connection never registered one
pub const ANONYMOUS: &str = "Anonymous";

/// Feature vector the predictor operates on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub age: f64,
    pub income: f64,
    pub has_protected_attribute: bool,
}

/// One accepted training data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub age: f64,
    pub income: f64,
    pub has_protected_attribute: bool,
    pub label: bool,
    pub contributor: String,
}

impl LabeledExample {
    /// Create a new example. An empty contributor falls back to [`ANONYMOUS`].
    pub fn new(features: Features, label: bool, contributor: impl Into<String>) -> Self {
        let contributor = contributor.into();
        let contributor = if contributor.trim().is_empty() {
            ANONYMOUS.to_string()
        } else {
            contributor
        };

        Self {
            age: features.age,
            income: features.income,
            has_protected_attribute: features.has_protected_attribute,
            label,
            contributor,
        }
    }

    /// The feature part of the example
    pub fn features(&self) -> Features {
        Features {
            age: self.age,
            income: self.income,
            has_protected_attribute: self.has_protected_attribute,
        }
    }
}

/// Unvalidated example as it arrives from a participant.
///
/// Fields are kept as raw JSON so that a wrongly typed field is reported
/// as a [`TrainingError::MalformedExample`] naming that field, instead of
/// failing the whole message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleSubmission {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub income: Option<Value>,
    #[serde(default)]
    pub has_protected_attribute: Option<Value>,
    #[serde(default)]
    pub label: Option<Value>,
}

impl ExampleSubmission {
    /// Validate into features and label
    pub fn validate(&self) -> TrainingResult<(Features, bool)> {
        let features = validate_features(
            self.age.as_ref(),
            self.income.as_ref(),
            self.has_protected_attribute.as_ref(),
        )?;
        let label = match self.label.as_ref() {
            None | Some(Value::Null) => {
                return Err(TrainingError::malformed("label", "is missing"))
            }
            Some(value) => value
                .as_bool()
                .ok_or_else(|| TrainingError::malformed("label", "must be a boolean"))?,
        };
        Ok((features, label))
    }
}

/// Unvalidated feature vector for a prediction request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturesSubmission {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub income: Option<Value>,
    #[serde(default)]
    pub has_protected_attribute: Option<Value>,
}

impl FeaturesSubmission {
    pub fn validate(&self) -> TrainingResult<Features> {
        validate_features(
            self.age.as_ref(),
            self.income.as_ref(),
            self.has_protected_attribute.as_ref(),
        )
    }
}

fn validate_features(
    age: Option<&Value>,
    income: Option<&Value>,
    has_protected_attribute: Option<&Value>,
) -> TrainingResult<Features> {
    // A missing protected flag counts as "not protected".
    let has_protected_attribute = match has_protected_attribute {
        None | Some(Value::Null) => false,
        Some(value) => value.as_bool().ok_or_else(|| {
            TrainingError::malformed("has_protected_attribute", "must be a boolean")
        })?,
    };

    Ok(Features {
        age: finite_number("age", age)?,
        income: finite_number("income", income)?,
        has_protected_attribute,
    })
}

fn finite_number(field: &'static str, value: Option<&Value>) -> TrainingResult<f64> {
    let value = match value {
        None | Some(Value::Null) => return Err(TrainingError::malformed(field, "is missing")),
        Some(value) => value,
    };
    let number = value
        .as_f64()
        .ok_or_else(|| TrainingError::malformed(field, "must be a number"))?;
    if !number.is_finite() {
        return Err(TrainingError::malformed(field, "must be finite"));
    }
    Ok(number)
}
