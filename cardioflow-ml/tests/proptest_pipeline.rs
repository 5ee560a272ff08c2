//! Property-based tests for scaling, splitting and metrics.

use proptest::prelude::*;

use cardioflow_ml::algorithms::{ClassificationMetrics, ConfusionCounts, train_test_split};
use cardioflow_ml::config::ConstantColumnPolicy;
use cardioflow_ml::data::transform::mean_and_std;
use cardioflow_ml::data::{FeatureMatrix, StandardScaler};

fn matrix(rows: Vec<Vec<i32>>) -> FeatureMatrix {
    FeatureMatrix {
        columns: vec!["a".into(), "b".into(), "c".into()],
        rows: rows
            .into_iter()
            .map(|r| r.into_iter().map(f64::from).collect())
            .collect(),
    }
}

// --- Standardization ---

proptest! {
    #[test]
    fn scaled_columns_have_zero_mean_unit_std(
        rows in prop::collection::vec(prop::collection::vec(-500i32..500, 3), 2..60),
    ) {
        let m = matrix(rows);
        let (scaler, scaled) = StandardScaler::fit_transform(&m, ConstantColumnPolicy::Zero);
        prop_assert_eq!(scaled.height(), m.height());
        prop_assert_eq!(scaled.width(), 3);

        let constant = scaler.constant_columns();
        for idx in 0..3 {
            let column = scaled.column(idx);
            if constant.contains(&idx) {
                prop_assert!(column.iter().all(|v| *v == 0.0));
            } else {
                let (mean, sd) = mean_and_std(&column);
                prop_assert!(mean.abs() < 1e-9, "mean {}", mean);
                prop_assert!((sd - 1.0).abs() < 1e-9, "sd {}", sd);
            }
        }
    }

    #[test]
    fn passthrough_keeps_constant_columns(value in -1000i32..1000, rows in 1usize..30) {
        let m = matrix(vec![vec![value, value, value]; rows]);
        let (scaler, scaled) = StandardScaler::fit_transform(&m, ConstantColumnPolicy::Passthrough);
        prop_assert_eq!(scaler.constant_columns(), vec![0, 1, 2]);
        prop_assert_eq!(scaled.rows, m.rows);
    }
}

// --- Train/test split ---

proptest! {
    #[test]
    fn split_is_a_deterministic_partition(
        n in 0usize..500,
        fraction in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let split = train_test_split(n, fraction, seed);
        prop_assert_eq!(split.test.len(), ((n as f64 * fraction).ceil() as usize).min(n));
        prop_assert_eq!(split.train.len() + split.test.len(), n);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..n).collect::<Vec<_>>());

        prop_assert_eq!(train_test_split(n, fraction, seed), split);
    }
}

// --- Metrics ---

proptest! {
    #[test]
    fn metrics_stay_in_unit_interval(
        pairs in prop::collection::vec((0u8..2, 0u8..2), 1..200),
    ) {
        let (actual, predicted): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
        let metrics = ClassificationMetrics::from_predictions(&actual, &predicted);
        for (name, value) in metrics.entries() {
            prop_assert!((0.0..=1.0).contains(&value), "{} = {}", name, value);
        }
    }

    #[test]
    fn f1_is_zero_without_true_positives(
        false_positives in 0usize..50,
        true_negatives in 0usize..50,
        false_negatives in 0usize..50,
    ) {
        let counts = ConfusionCounts {
            true_positives: 0,
            false_positives,
            true_negatives,
            false_negatives,
        };
        let metrics = ClassificationMetrics::from_counts(&counts);
        prop_assert_eq!(metrics.precision, 0.0);
        prop_assert_eq!(metrics.recall, 0.0);
        prop_assert_eq!(metrics.f1_score, 0.0);
    }
}
