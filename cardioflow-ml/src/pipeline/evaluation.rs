//! Stage 5: score the predictor on the held-out partition.

use super::{Stage, read_table};
use crate::algorithms::{ClassificationMetrics, ConfusionCounts, train_test_split};
use crate::config::{PipelineConfig, SplitConfig};
use crate::data::parse_labels;
use crate::error::PipelineError;
use crate::inference::{Predictor, load_model};
use crate::store::{ArtifactStore, keys};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Reads [`keys::TRANSFORMED`] and [`keys::MODEL`], re-creates the seeded
/// train/test split, and writes accuracy, precision, recall and F1 on the test
/// partition to [`keys::METRICS`].
///
/// The split seed is fixed, so runs against the same artifacts write
/// byte-identical metrics.
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub label_column: String,
    pub split: SplitConfig,
}

impl Default for ModelEvaluation {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub metrics: ClassificationMetrics,
    pub confusion: ConfusionCounts,
    pub train_rows: usize,
    pub test_rows: usize,
    pub predictor: String,
}

impl ModelEvaluation {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            label_column: config.data.label_column.clone(),
            split: config.split.clone(),
        }
    }

    /// Evaluate an already-constructed predictor against the transformed data.
    pub fn evaluate_with(
        &self,
        store: &dyn ArtifactStore,
        predictor: &dyn Predictor,
    ) -> Result<EvaluationSummary, PipelineError> {
        let table = read_table(store, keys::TRANSFORMED)?;
        let (features, labels) = table.split_label(&self.label_column)?;
        let labels = parse_labels(&labels, &self.label_column)?;

        if let Some(expected) = predictor.expected_width() {
            if expected != features.width() {
                return Err(PipelineError::PredictionShape {
                    expected,
                    actual: features.width(),
                });
            }
        }

        let split = train_test_split(features.height(), self.split.test_fraction, self.split.seed);
        let x_test = features.select_rows(&split.test);
        let y_test: Vec<u8> = split.test.iter().map(|&i| labels[i]).collect();

        let predicted = predictor.predict(&x_test)?;
        if predicted.len() != y_test.len() {
            return Err(PipelineError::PredictionShape {
                expected: y_test.len(),
                actual: predicted.len(),
            });
        }

        let confusion = ConfusionCounts::from_predictions(&y_test, &predicted);
        let metrics = ClassificationMetrics::from_counts(&confusion);

        let mut body = serde_json::to_vec_pretty(&metrics)?;
        body.push(b'\n');
        store.put(keys::METRICS, &body)?;

        info!(
            train_rows = split.train.len(),
            test_rows = split.test.len(),
            location = %store.describe(keys::METRICS),
            "Model evaluation complete"
        );
        for (name, value) in metrics.entries() {
            info!(metric = name, value = %format!("{value:.4}"), "Metric");
        }

        Ok(EvaluationSummary {
            metrics,
            confusion,
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            predictor: predictor.name().to_string(),
        })
    }
}

impl Stage for ModelEvaluation {
    type Output = EvaluationSummary;
    const NAME: &'static str = "model_evaluation";

    fn run(&self, store: &dyn ArtifactStore) -> Result<EvaluationSummary, PipelineError> {
        if !store.exists(keys::TRANSFORMED) {
            return Err(PipelineError::artifact_missing(keys::TRANSFORMED));
        }
        let model = load_model(store)?;
        self.evaluate_with(store, &model)
    }
}
