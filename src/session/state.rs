//! # Session State
//!
//! The single owned state behind every connection.
//!
//! ## Invariant
//! Dataset and model live under one write lock. An append is always
//! followed by retraining and installing the new snapshot before the lock
//! is released, and a reset clears both together. The resulting broadcast
//! is published while the lock is still held, so participants see events
//! in the order the mutations happened.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::training::{
    self, DatasetStore, ExampleSubmission, Features, FeaturesSubmission, LabeledExample,
    ModelSnapshot, TrainingError, TrainingResult, ANONYMOUS,
};

use super::broadcast::Broadcast;
use super::event::{SessionEvent, TrainingUpdate, RESET_MESSAGE};
use super::presence::ParticipantRegistry;

/// Dataset and current model, always mutated together
#[derive(Debug, Default)]
struct Classroom {
    dataset: DatasetStore,
    model: Option<ModelSnapshot>,
}

/// Shared session state
pub struct SessionState {
    classroom: RwLock<Classroom>,
    participants: ParticipantRegistry,
    broadcast: Arc<dyn Broadcast>,
    metrics: Arc<MetricsRegistry>,
}

impl SessionState {
    /// Create an empty session fanning out through `broadcast`
    pub fn new(broadcast: Arc<dyn Broadcast>) -> Self {
        Self {
            classroom: RwLock::new(Classroom::default()),
            participants: ParticipantRegistry::new(),
            broadcast,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    fn read(&self) -> TrainingResult<RwLockReadGuard<'_, Classroom>> {
        self.classroom
            .read()
            .map_err(|_| TrainingError::Internal("Lock poisoned".into()))
    }

    fn write(&self) -> TrainingResult<RwLockWriteGuard<'_, Classroom>> {
        self.classroom
            .write()
            .map_err(|_| TrainingError::Internal("Lock poisoned".into()))
    }

    // ==================
    // Operations
    // ==================

    /// Register a display name for a connection.
    ///
    /// Returns the current dataset size and notifies everyone of the new
    /// participant count. A blank name registers as [`ANONYMOUS`].
    pub fn join(&self, connection_id: &str, name: &str) -> TrainingResult<usize> {
        let name = match name.trim() {
            "" => ANONYMOUS,
            trimmed => trimmed,
        };
        let dataset_size = self.read()?.dataset.size();
        let total_players = self.participants.register(connection_id, name, |total_players| {
            self.broadcast.notify_all(SessionEvent::UserJoined {
                name: name.to_string(),
                total_players,
            });
        })?;

        log_event_with_fields(
            Event::ParticipantJoined,
            &[
                ("connection_id", connection_id),
                ("name", name),
                ("total_players", &total_players.to_string()),
            ],
        );

        Ok(dataset_size)
    }

    /// Forget a connection. Returns its name if it had registered one.
    pub fn leave(&self, connection_id: &str) -> Option<String> {
        self.participants.remove(connection_id).map(|p| p.name)
    }

    /// Validate, append and retrain.
    ///
    /// A malformed submission is rejected before the dataset is touched;
    /// nobody but the caller learns about it.
    pub fn submit_example(
        &self,
        connection_id: &str,
        submission: &ExampleSubmission,
    ) -> TrainingResult<TrainingUpdate> {
        let (features, label) = match submission.validate() {
            Ok(valid) => valid,
            Err(e) => {
                self.metrics.increment_examples_rejected();
                log_event_with_fields(
                    Event::ExampleRejected,
                    &[("connection_id", connection_id), ("reason", &e.to_string())],
                );
                return Err(e);
            }
        };

        let contributor = self
            .participants
            .name_of(connection_id)
            .unwrap_or_else(|| ANONYMOUS.to_string());
        let example = LabeledExample::new(features, label, contributor.as_str());

        let update = {
            let mut classroom = self.write()?;
            let mut candidate = classroom.dataset.examples().to_vec();
            candidate.push(example.clone());
            let model = training::train(&candidate)
                .ok_or_else(|| TrainingError::Internal("No model for non-empty dataset".into()))?;

            let size = classroom.dataset.append(example);

            let update = TrainingUpdate {
                size,
                accuracy: model.accuracy,
                fairness_gap: model.fairness_gap,
            };
            classroom.model = Some(model);
            self.broadcast.notify_all(update.into());
            update
        };

        self.metrics.increment_examples_accepted();
        self.metrics.increment_retrains();
        log_event_with_fields(
            Event::ExampleAccepted,
            &[
                ("contributor", &contributor),
                ("age", &features.age.to_string()),
                ("income", &features.income.to_string()),
                (
                    "has_protected_attribute",
                    &features.has_protected_attribute.to_string(),
                ),
                ("label", &label.to_string()),
                ("size", &update.size.to_string()),
            ],
        );
        log_event_with_fields(
            Event::ModelTrained,
            &[
                ("size", &update.size.to_string()),
                ("accuracy", &format!("{:.2}", update.accuracy)),
                ("fairness_gap", &format!("{:.2}", update.fairness_gap)),
            ],
        );

        Ok(update)
    }

    /// Predict with the current model. Never mutates anything.
    pub fn predict(&self, submission: &FeaturesSubmission) -> TrainingResult<(Features, bool)> {
        let result = submission.validate().and_then(|features| {
            let classroom = self.read()?;
            training::predict(classroom.model.as_ref(), &features).map(|p| (features, p))
        });

        match &result {
            Ok(_) => self.metrics.increment_predictions_served(),
            Err(e) => {
                self.metrics.increment_predictions_rejected();
                log_event_with_fields(
                    Event::PredictionRejected,
                    &[("code", e.code()), ("reason", &e.to_string())],
                );
            }
        }
        result
    }

    /// Clear the dataset and discard the model, then notify everyone
    pub fn reset(&self, connection_id: &str) -> TrainingResult<()> {
        {
            let mut classroom = self.write()?;
            classroom.dataset.clear();
            classroom.model = None;
            self.broadcast.notify_all(SessionEvent::ResetDone {
                message: RESET_MESSAGE.to_string(),
            });
        }

        self.metrics.increment_resets();
        let requested_by = self
            .participants
            .name_of(connection_id)
            .unwrap_or_else(|| ANONYMOUS.to_string());
        log_event_with_fields(Event::ModelReset, &[("requested_by", &requested_by)]);

        Ok(())
    }

    // ==================
    // Read-only views
    // ==================

    /// Current dataset size
    pub fn dataset_size(&self) -> TrainingResult<usize> {
        Ok(self.read()?.dataset.size())
    }

    /// Dataset size and model read under one guard
    pub fn model(&self) -> TrainingResult<(usize, Option<ModelSnapshot>)> {
        let classroom = self.read()?;
        Ok((classroom.dataset.size(), classroom.model.clone()))
    }

    /// Copy of all examples in insertion order
    pub fn examples(&self) -> TrainingResult<Vec<LabeledExample>> {
        Ok(self.read()?.dataset.examples().to_vec())
    }

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.participants
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::broadcast::MemoryBroadcast;
    use serde_json::json;

    fn session() -> (SessionState, Arc<MemoryBroadcast>) {
        let broadcast = Arc::new(MemoryBroadcast::new());
        (SessionState::new(broadcast.clone()), broadcast)
    }

    fn submission(age: f64, income: f64, protected: bool, label: bool) -> ExampleSubmission {
        serde_json::from_value(json!({
            "age": age,
            "income": income,
            "has_protected_attribute": protected,
            "label": label,
        }))
        .unwrap()
    }

    fn features(age: f64, income: f64, protected: bool) -> FeaturesSubmission {
        serde_json::from_value(json!({
            "age": age,
            "income": income,
            "has_protected_attribute": protected,
        }))
        .unwrap()
    }

    #[test]
    fn test_join_reports_size_and_broadcasts() {
        let (state, broadcast) = session();
        state.submit_example("conn-1", &submission(30.0, 1.0, false, true)).unwrap();

        assert_eq!(state.join("conn-2", "  ada ").unwrap(), 1);
        assert_eq!(
            broadcast.events().last(),
            Some(&SessionEvent::UserJoined {
                name: "ada".to_string(),
                total_players: 1,
            })
        );
    }

    #[test]
    fn test_contributor_from_registered_name() {
        let (state, _) = session();
        state.join("conn-1", "grace").unwrap();

        state.submit_example("conn-1", &submission(30.0, 1.0, false, true)).unwrap();
        state.submit_example("conn-2", &submission(30.0, 1.0, false, true)).unwrap();

        let examples = state.examples().unwrap();
        assert_eq!(examples[0].contributor, "grace");
        assert_eq!(examples[1].contributor, ANONYMOUS);
    }

    #[test]
    fn test_submit_broadcasts_update() {
        let (state, broadcast) = session();
        state.submit_example("c", &submission(30.0, 20000.0, false, true)).unwrap();
        let update = state.submit_example("c", &submission(50.0, 80000.0, false, false)).unwrap();

        assert_eq!(update.size, 2);
        assert_eq!(update.accuracy, 0.5);
        assert_eq!(update.fairness_gap, 1.0);
        assert_eq!(broadcast.events().last(), Some(&SessionEvent::from(update)));
    }

    #[test]
    fn test_installed_model_covers_whole_dataset() {
        let (state, _) = session();
        for i in 0..5 {
            state
                .submit_example("c", &submission(20.0 + i as f64, 1000.0, i % 2 == 0, i != 2))
                .unwrap();
            let (size, model) = state.model().unwrap();
            assert_eq!(model.map(|m| m.trained_on), Some(size));
        }
    }

    #[test]
    fn test_malformed_submission_changes_nothing() {
        let (state, broadcast) = session();
        state.submit_example("c", &submission(30.0, 20000.0, false, true)).unwrap();
        let (_, before) = state.model().unwrap();
        let events_before = broadcast.events().len();

        let bad = ExampleSubmission {
            age: Some(json!("old")),
            ..submission(1.0, 1.0, false, true)
        };
        assert!(matches!(
            state.submit_example("c", &bad),
            Err(TrainingError::MalformedExample { field: "age", .. })
        ));

        let (size, after) = state.model().unwrap();
        assert_eq!(size, 1);
        assert_eq!(before, after);
        assert_eq!(broadcast.events().len(), events_before);
        assert_eq!(state.metrics().snapshot().examples_rejected, 1);
    }

    #[test]
    fn test_predict_before_training() {
        let (state, _) = session();
        assert_eq!(
            state.predict(&features(40.0, 1.0, false)),
            Err(TrainingError::ModelNotTrained)
        );
    }

    #[test]
    fn test_predict_echoes_features() {
        let (state, _) = session();
        state.submit_example("c", &submission(30.0, 20000.0, false, true)).unwrap();

        let (features, prediction) = state.predict(&features(20.0, 50000.0, true)).unwrap();
        assert!(features.has_protected_attribute);
        assert!(prediction);
        assert_eq!(state.dataset_size().unwrap(), 1);
    }

    #[test]
    fn test_reset_clears_dataset_and_model() {
        let (state, broadcast) = session();
        state.submit_example("c", &submission(30.0, 20000.0, false, true)).unwrap();
        assert!(state.predict(&features(40.0, 1.0, false)).is_ok());

        state.reset("c").unwrap();

        assert_eq!(state.dataset_size().unwrap(), 0);
        assert_eq!(state.model().unwrap(), (0, None));
        assert_eq!(
            state.predict(&features(40.0, 1.0, false)),
            Err(TrainingError::ModelNotTrained)
        );
        assert_eq!(
            broadcast.events().last(),
            Some(&SessionEvent::ResetDone {
                message: RESET_MESSAGE.to_string()
            })
        );
    }

    #[test]
    fn test_leave() {
        let (state, _) = session();
        state.join("conn-1", "ada").unwrap();

        assert_eq!(state.leave("conn-1").as_deref(), Some("ada"));
        assert_eq!(state.participants().count(), 0);
        assert_eq!(state.leave("conn-1"), None);
    }
}
