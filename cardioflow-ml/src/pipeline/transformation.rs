//! Stage 3: standardize features and re-attach the label.

use super::{Stage, read_table};
use crate::config::{ConstantColumnPolicy, PipelineConfig};
use crate::data::{DataTable, StandardScaler};
use crate::error::PipelineError;
use crate::store::{ArtifactStore, keys};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Reads [`keys::RAW_SNAPSHOT`], standardizes every feature column and writes
/// [`keys::TRANSFORMED`]: the scaled features in their original order followed
/// by the untouched label column.
///
/// Scaling statistics come from every row, including rows that evaluation
/// later holds out as its test partition, so test-set information leaks into
/// the features the model is scored on.
#[derive(Debug, Clone)]
pub struct DataTransformation {
    pub label_column: String,
    pub constant_policy: ConstantColumnPolicy,
}

impl Default for DataTransformation {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSummary {
    pub rows: usize,
    pub feature_columns: usize,
    pub scaler: StandardScaler,
}

impl DataTransformation {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            label_column: config.data.label_column.clone(),
            constant_policy: config.transform.constant_columns,
        }
    }
}

impl Stage for DataTransformation {
    type Output = TransformSummary;
    const NAME: &'static str = "data_transformation";

    fn run(&self, store: &dyn ArtifactStore) -> Result<TransformSummary, PipelineError> {
        let raw = read_table(store, keys::RAW_SNAPSHOT)?;
        let (features, labels) = raw.split_label(&self.label_column)?;

        let (scaler, scaled) = StandardScaler::fit_transform(&features, self.constant_policy);
        for idx in scaler.constant_columns() {
            warn!(
                column = %scaler.columns[idx],
                policy = ?self.constant_policy,
                "Constant feature column, not scaled"
            );
        }

        let mut columns = scaled.columns.clone();
        columns.push(self.label_column.clone());
        let rows = scaled
            .rows
            .iter()
            .zip(labels)
            .map(|(values, label)| {
                let mut row: Vec<Option<String>> =
                    values.iter().map(|v| Some(v.to_string())).collect();
                row.push(label);
                row
            })
            .collect();
        let output = DataTable::new(columns, rows);

        store.put(keys::TRANSFORMED, &output.to_csv_bytes()?)?;

        info!(
            rows = output.row_count(),
            features = scaled.width(),
            location = %store.describe(keys::TRANSFORMED),
            "Transformed data saved"
        );
        Ok(TransformSummary {
            rows: output.row_count(),
            feature_columns: scaled.width(),
            scaler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::transform::mean_and_std;
    use crate::store::MemoryArtifactStore;

    const RAW: &str = "age,chol,fbs,target\n40,200,0,1\n50,250,0,0\n60,300,0,1\n70,350,0,0\n";

    #[test]
    fn test_transform_standardizes_and_keeps_label() {
        let store = MemoryArtifactStore::new().with(keys::RAW_SNAPSHOT, RAW);
        let summary = DataTransformation::default().run(&store).unwrap();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.feature_columns, 3);

        let out = DataTable::from_csv_bytes(&store.get(keys::TRANSFORMED).unwrap()).unwrap();
        assert_eq!(out.columns, vec!["age", "chol", "fbs", "target"]);

        let (features, labels) = out.split_label("target").unwrap();
        for idx in 0..2 {
            let (mean, sd) = mean_and_std(&features.column(idx));
            assert!(mean.abs() < 1e-9);
            assert!((sd - 1.0).abs() < 1e-9);
        }
        // fbs is constant
        assert!(features.column(2).iter().all(|v| *v == 0.0));

        let labels: Vec<_> = labels.into_iter().flatten().collect();
        assert_eq!(labels, vec!["1", "0", "1", "0"]);
    }

    #[test]
    fn test_transform_missing_label() {
        let store = MemoryArtifactStore::new().with(keys::RAW_SNAPSHOT, "age,chol\n40,200\n");
        let err = DataTransformation::default().run(&store).unwrap_err();
        assert!(matches!(err, PipelineError::LabelColumnMissing { .. }));
        assert!(!store.exists(keys::TRANSFORMED));
    }

    #[test]
    fn test_transform_non_numeric_feature() {
        let store =
            MemoryArtifactStore::new().with(keys::RAW_SNAPSHOT, "age,sex,target\n40,male,1\n");
        let err = DataTransformation::default().run(&store).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureType { .. }));
        assert!(!store.exists(keys::TRANSFORMED));
    }

    #[test]
    fn test_transform_missing_snapshot() {
        let store = MemoryArtifactStore::new();
        assert!(
            DataTransformation::default()
                .run(&store)
                .unwrap_err()
                .is_missing_artifact()
        );
    }

    #[test]
    fn test_transform_is_deterministic() {
        let store = MemoryArtifactStore::new().with(keys::RAW_SNAPSHOT, RAW);
        DataTransformation::default().run(&store).unwrap();
        let first = store.get(keys::TRANSFORMED).unwrap();
        DataTransformation::default().run(&store).unwrap();
        assert_eq!(store.get(keys::TRANSFORMED).unwrap(), first);
    }
}
