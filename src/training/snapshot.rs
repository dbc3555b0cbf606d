//! # Model Snapshot
//!
//! The classifier state derived from the full dataset at the time of the
//! last training. Snapshots are replaced wholesale, never mutated.

use serde::{Deserialize, Serialize};

use super::example::Features;

/// Margin below the positive-class mean age that still predicts `true`
pub const AGE_MARGIN: f64 = 5.0;

/// Decision rule of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predictor {
    /// `age > avg_age - 5 || income < avg_income || has_protected_attribute`
    ThresholdRule { avg_age: f64, avg_income: f64 },

    /// Always returns `value`. Used when no positive examples exist.
    Constant { value: bool },
}

impl Predictor {
    /// Apply the rule to a feature vector
    pub fn predict(&self, features: &Features) -> bool {
        match *self {
            Predictor::ThresholdRule {
                avg_age,
                avg_income,
            } => {
                features.age > avg_age - AGE_MARGIN
                    || features.income < avg_income
                    || features.has_protected_attribute
            }
            Predictor::Constant { value } => value,
        }
    }
}

/// Current classifier plus its evaluation statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub predictor: Predictor,

    /// Fraction of the full dataset the predictor labels correctly
    pub accuracy: f64,

    /// Demographic parity gap between protected and unprotected groups
    pub fairness_gap: f64,

    /// Mean age of positive examples (absent for the degenerate model)
    pub avg_age: Option<f64>,

    /// Mean income of positive examples (absent for the degenerate model)
    pub avg_income: Option<f64>,

    /// Share of positive examples with the protected attribute.
    /// Reported only, the predictor does not use it.
    pub protected_rate: Option<f64>,

    /// Number of examples this snapshot was trained on
    pub trained_on: usize,
}

impl ModelSnapshot {
    /// Constant-false model for datasets with no positive label.
    ///
    /// Accuracy is reported as 0 even though a constant-false predictor is
    /// right on every all-negative example. Clients depend on this value.
    pub fn degenerate(trained_on: usize) -> Self {
        Self {
            predictor: Predictor::Constant { value: false },
            accuracy: 0.0,
            fairness_gap: 0.0,
            avg_age: None,
            avg_income: None,
            protected_rate: None,
            trained_on,
        }
    }

    pub fn predict(&self, features: &Features) -> bool {
        self.predictor.predict(features)
    }
}
