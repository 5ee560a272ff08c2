//! Stage 4: fit the classifier on the training partition.

use super::{Stage, read_table};
use crate::algorithms::{ClassificationMetrics, LogisticRegression, train_test_split};
use crate::config::{PipelineConfig, SplitConfig, TrainingConfig};
use crate::data::parse_labels;
use crate::error::PipelineError;
use crate::inference::ModelArtifact;
use crate::store::{ArtifactStore, keys};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fits a logistic regression on the train side of the same seeded split that
/// evaluation uses, and writes it to [`keys::MODEL`].
#[derive(Debug, Clone)]
pub struct ModelTraining {
    pub label_column: String,
    pub split: SplitConfig,
    pub training: TrainingConfig,
}

impl Default for ModelTraining {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub train_rows: usize,
    pub features: usize,
    pub train_accuracy: f64,
}

impl ModelTraining {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            label_column: config.data.label_column.clone(),
            split: config.split.clone(),
            training: config.training.clone(),
        }
    }
}

impl Stage for ModelTraining {
    type Output = TrainingSummary;
    const NAME: &'static str = "model_training";

    fn run(&self, store: &dyn ArtifactStore) -> Result<TrainingSummary, PipelineError> {
        let table = read_table(store, keys::TRANSFORMED)?;
        let (features, labels) = table.split_label(&self.label_column)?;
        let labels = parse_labels(&labels, &self.label_column)?;

        let split = train_test_split(features.height(), self.split.test_fraction, self.split.seed);
        let x_train = features.select_rows(&split.train);
        let y_train: Vec<u8> = split.train.iter().map(|&i| labels[i]).collect();

        let model = LogisticRegression::fit(&x_train, &y_train, &self.training)?;

        let predicted: Vec<u8> = x_train.iter().map(|row| model.predict(row)).collect();
        let train_accuracy = ClassificationMetrics::from_predictions(&y_train, &predicted).accuracy;

        let artifact = ModelArtifact::new(features.columns.clone(), model, x_train.len());
        store.put(keys::MODEL, &artifact.to_json()?)?;

        info!(
            train_rows = x_train.len(),
            features = features.width(),
            train_accuracy,
            location = %store.describe(keys::MODEL),
            "Model trained"
        );
        Ok(TrainingSummary {
            train_rows: x_train.len(),
            features: features.width(),
            train_accuracy,
        })
    }
}
