//! # Training Errors
//!
//! Error types for the training engine and prediction service.

use thiserror::Error;

/// Result type for training operations
pub type TrainingResult<T> = Result<T, TrainingError>;

/// Training errors
///
/// None of these are fatal to the server. They are reported to the
/// participant that caused them and nobody else.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    /// Prediction requested before any example exists, or right after a reset
    #[error("The model has not been trained yet")]
    ModelNotTrained,

    /// A submitted example or feature vector failed validation
    #[error("Malformed example: field '{field}' {reason}")]
    MalformedExample { field: &'static str, reason: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrainingError {
    /// Shorthand for a validation failure
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        TrainingError::MalformedExample {
            field,
            reason: reason.into(),
        }
    }

    /// Stable error code reported on the wire
    pub fn code(&self) -> &'static str {
        match self {
            TrainingError::ModelNotTrained => "MODEL_NOT_TRAINED",
            TrainingError::MalformedExample { .. } => "MALFORMED_EXAMPLE",
            TrainingError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TrainingError::ModelNotTrained.code(), "MODEL_NOT_TRAINED");
        assert_eq!(
            TrainingError::malformed("age", "is missing").code(),
            "MALFORMED_EXAMPLE"
        );
        assert_eq!(TrainingError::Internal("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_malformed_display_names_field() {
        let err = TrainingError::malformed("income", "must be a number");
        assert_eq!(
            err.to_string(),
            "Malformed example: field 'income' must be a number"
        );
    }
}
