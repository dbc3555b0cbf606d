//! # Dataset Store
//!
//! Append-only sequence of labeled examples.
//!
//! The only mutation besides `append` is a full `clear`. Insertion order is
//! kept for display but has no effect on training.

use super::example::LabeledExample;

/// Ordered, append-only collection of examples
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    examples: Vec<LabeledExample>,
}

impl DatasetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an example, returning the new total count
    pub fn append(&mut self, example: LabeledExample) -> usize {
        self.examples.push(example);
        self.examples.len()
    }

    /// Number of stored examples
    pub fn size(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Remove every example
    pub fn clear(&mut self) {
        self.examples.clear();
    }

    /// All examples in insertion order
    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::example::Features;

    fn example(age: f64, label: bool) -> LabeledExample {
        LabeledExample::new(
            Features {
                age,
                income: 1000.0,
                has_protected_attribute: false,
            },
            label,
            "tester",
        )
    }

    #[test]
    fn test_append_returns_count() {
        let mut store = DatasetStore::new();
        assert_eq!(store.append(example(20.0, true)), 1);
        assert_eq!(store.append(example(30.0, false)), 2);
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut store = DatasetStore::new();
        store.append(example(20.0, true));
        store.append(example(30.0, false));
        store.append(example(40.0, true));

        let ages: Vec<f64> = store.examples().iter().map(|e| e.age).collect();
        assert_eq!(ages, vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_clear() {
        let mut store = DatasetStore::new();
        store.append(example(20.0, true));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.size(), 0);
    }
}
