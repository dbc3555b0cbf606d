//! # Training Engine
//!
//! Incremental training and evaluation of the shared classifier.
//!
//! ## Architecture
//!
//! - **Example**: validated, immutable labeled submissions
//! - **Dataset**: append-only store, cleared only by a full reset
//! - **Engine**: pure `train` over the whole dataset
//! - **Snapshot**: the current predictor plus accuracy and fairness statistics
//! - **Prediction**: applying the current snapshot to a feature vector

pub mod dataset;
pub mod engine;
pub mod errors;
pub mod example;
pub mod prediction;
pub mod snapshot;

pub use dataset::DatasetStore;
pub use engine::train;
pub use errors::{TrainingError, TrainingResult};
pub use example::{ExampleSubmission, Features, FeaturesSubmission, LabeledExample, ANONYMOUS};
pub use prediction::predict;
pub use snapshot::{ModelSnapshot, Predictor};
