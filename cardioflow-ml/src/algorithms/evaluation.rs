//! Binary classification metrics and seeded train/test partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Train/test row partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded generator and cut off the test partition.
///
/// The test partition holds `ceil(n * test_fraction)` rows, so 303 rows at
/// 0.2 yield 61 test and 242 train rows. Identical inputs always produce the
/// identical partition.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = ((n as f64) * test_fraction).ceil() as usize;
    let test_size = test_size.min(n);
    let train = indices.split_off(test_size);

    SplitIndices {
        train,
        test: indices,
    }
}

/// Confusion counts for the positive class (label 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    pub fn from_predictions(actual: &[u8], predicted: &[u8]) -> Self {
        let mut counts = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a == 1, p == 1) {
                (true, true) => counts.true_positives += 1,
                (false, true) => counts.false_positives += 1,
                (false, false) => counts.true_negatives += 1,
                (true, false) => counts.false_negatives += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// The four reported metrics. Field order is the artifact's key order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl ClassificationMetrics {
    /// Metrics for the positive class; a zero denominator yields 0.
    pub fn from_counts(c: &ConfusionCounts) -> Self {
        let accuracy = ratio(c.true_positives + c.true_negatives, c.total());
        let precision = ratio(c.true_positives, c.true_positives + c.false_positives);
        let recall = ratio(c.true_positives, c.true_positives + c.false_negatives);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            accuracy,
            precision,
            recall,
            f1_score,
        }
    }

    pub fn from_predictions(actual: &[u8], predicted: &[u8]) -> Self {
        Self::from_counts(&ConfusionCounts::from_predictions(actual, predicted))
    }

    /// `(name, value)` pairs in artifact key order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
        ]
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(303, 0.2, 42);
        assert_eq!(split.test.len(), 61);
        assert_eq!(split.train.len(), 242);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..303).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        assert_eq!(train_test_split(100, 0.2, 42), train_test_split(100, 0.2, 42));
        assert_ne!(
            train_test_split(100, 0.2, 42).test,
            train_test_split(100, 0.2, 7).test
        );
    }

    #[test]
    fn test_split_empty() {
        let split = train_test_split(0, 0.2, 42);
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }

    #[test]
    fn test_metrics() {
        let actual = [1, 1, 0, 0, 1];
        let predicted = [1, 0, 0, 1, 1];
        let m = ClassificationMetrics::from_predictions(&actual, &predicted);
        assert!((m.accuracy - 0.6).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1_score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_zero_denominators() {
        // No predicted positives and no actual positives.
        let m = ClassificationMetrics::from_predictions(&[0, 0, 0], &[0, 0, 0]);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1_score, 0.0);

        let m = ClassificationMetrics::from_predictions(&[], &[]);
        assert_eq!(m.accuracy, 0.0);
    }

    #[test]
    fn test_entries_order() {
        let m = ClassificationMetrics::from_predictions(&[1], &[1]);
        let names: Vec<_> = m.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["accuracy", "precision", "recall", "f1_score"]);
    }
}
