//! # Prediction Service
//!
//! Applies the current snapshot without mutating anything.

use super::errors::{TrainingError, TrainingResult};
use super::example::Features;
use super::snapshot::ModelSnapshot;

/// Predict with the current model, failing if none has been trained
pub fn predict(model: Option<&ModelSnapshot>, features: &Features) -> TrainingResult<bool> {
    model
        .map(|snapshot| snapshot.predict(features))
        .ok_or(TrainingError::ModelNotTrained)
}
