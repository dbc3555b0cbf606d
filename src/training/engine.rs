//! # Training/Evaluation Engine
//!
//! Pure function from the full dataset to a [`ModelSnapshot`].
//!
//! ## Invariant
//! The result depends only on the multiset of examples, never on their
//! order: counts are integers and float sums are taken over sorted values.

use super::example::LabeledExample;
use super::snapshot::{ModelSnapshot, Predictor};

/// Train a snapshot over `examples`. Returns `None` for an empty dataset.
pub fn train(examples: &[LabeledExample]) -> Option<ModelSnapshot> {
    if examples.is_empty() {
        return None;
    }

    let positives: Vec<&LabeledExample> = examples.iter().filter(|e| e.label).collect();
    if positives.is_empty() {
        return Some(ModelSnapshot::degenerate(examples.len()));
    }

    let avg_age = mean(positives.iter().map(|e| e.age));
    let avg_income = mean(positives.iter().map(|e| e.income));
    let protected_rate = ratio(
        positives.iter().filter(|e| e.has_protected_attribute).count(),
        positives.len(),
    );

    let predictor = Predictor::ThresholdRule {
        avg_age,
        avg_income,
    };

    Some(ModelSnapshot {
        predictor,
        accuracy: accuracy(&predictor, examples),
        fairness_gap: fairness_gap(&predictor, examples),
        avg_age: Some(avg_age),
        avg_income: Some(avg_income),
        protected_rate: Some(protected_rate),
        trained_on: examples.len(),
    })
}

/// Fraction of examples whose prediction matches the label
pub fn accuracy(predictor: &Predictor, examples: &[LabeledExample]) -> f64 {
    let correct = examples
        .iter()
        .filter(|e| predictor.predict(&e.features()) == e.label)
        .count();
    ratio(correct, examples.len())
}

/// Absolute difference in positive-prediction rate between the protected
/// and the unprotected group. An empty group has rate 0.
pub fn fairness_gap(predictor: &Predictor, examples: &[LabeledExample]) -> f64 {
    let (mut protected, mut protected_selected) = (0usize, 0usize);
    let (mut unprotected, mut unprotected_selected) = (0usize, 0usize);

    for example in examples {
        let selected = predictor.predict(&example.features());
        if example.has_protected_attribute {
            protected += 1;
            protected_selected += usize::from(selected);
        } else {
            unprotected += 1;
            unprotected_selected += usize::from(selected);
        }
    }

    (ratio(protected_selected, protected) - ratio(unprotected_selected, unprotected)).abs()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
