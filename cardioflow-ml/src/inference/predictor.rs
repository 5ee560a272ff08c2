//! Binary predictors: a fitted model loaded from the artifact store, or a
//! fallback heuristic when no usable model exists.

use crate::algorithms::LogisticRegression;
use crate::error::PipelineError;
use crate::store::{ArtifactStore, keys};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Row-wise 0/1 classifier.
pub trait Predictor: Send + Sync + std::fmt::Debug {
    /// Short identifier for logs and the health endpoint.
    fn name(&self) -> &str;

    /// Number of features each row must have, if the predictor cares.
    fn expected_width(&self) -> Option<usize>;

    /// Predict a label for every row.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<u8>, PipelineError>;

    /// Predict a single row.
    fn predict_one(&self, row: &[f64]) -> Result<u8, PipelineError> {
        let labels = self.predict(&[row.to_vec()])?;
        labels.first().copied().ok_or(PipelineError::PredictionShape {
            expected: 1,
            actual: 0,
        })
    }
}

/// Serialized form of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub algorithm: String,
    /// Feature columns in the order the weights expect them.
    pub feature_names: Vec<String>,
    pub model: LogisticRegression,
    pub train_rows: usize,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub const LOGISTIC_REGRESSION: &'static str = "logistic_regression";

    pub fn new(feature_names: Vec<String>, model: LogisticRegression, train_rows: usize) -> Self {
        Self {
            algorithm: Self::LOGISTIC_REGRESSION.to_string(),
            feature_names,
            model,
            train_rows,
            trained_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, PipelineError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self, PipelineError> {
        let artifact: Self = serde_json::from_slice(data)
            .map_err(|e| PipelineError::predictor_load(format!("undecodable model: {e}")))?;
        if artifact.algorithm != Self::LOGISTIC_REGRESSION {
            return Err(PipelineError::predictor_load(format!(
                "unsupported algorithm '{}'",
                artifact.algorithm
            )));
        }
        if artifact.feature_names.len() != artifact.model.n_features() {
            return Err(PipelineError::predictor_load(format!(
                "{} feature names for {} weights",
                artifact.feature_names.len(),
                artifact.model.n_features()
            )));
        }
        Ok(artifact)
    }
}

/// A fitted model read from the store.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    artifact: ModelArtifact,
}

impl LoadedModel {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl Predictor for LoadedModel {
    fn name(&self) -> &str {
        &self.artifact.algorithm
    }

    fn expected_width(&self) -> Option<usize> {
        Some(self.artifact.model.n_features())
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<u8>, PipelineError> {
        let expected = self.artifact.model.n_features();
        rows.iter()
            .map(|row| {
                if row.len() != expected {
                    return Err(PipelineError::PredictionShape {
                        expected,
                        actual: row.len(),
                    });
                }
                Ok(self.artifact.model.predict(row))
            })
            .collect()
    }
}

/// Heuristic used when no fitted model can be loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallbackPredictor {
    /// Positive when the sum of the raw inputs exceeds `threshold`.
    SumThreshold { threshold: f64 },
    /// Always the same label.
    Constant { label: u8 },
}

impl FallbackPredictor {
    /// Used when the model artifact does not exist.
    pub const MODEL_ABSENT: Self = Self::SumThreshold { threshold: 100.0 };
    /// Used when the model artifact exists but cannot be loaded.
    pub const MODEL_UNREADABLE: Self = Self::Constant { label: 0 };
}

impl Predictor for FallbackPredictor {
    fn name(&self) -> &str {
        match self {
            Self::SumThreshold { .. } => "fallback_sum_threshold",
            Self::Constant { .. } => "fallback_constant",
        }
    }

    fn expected_width(&self) -> Option<usize> {
        None
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<u8>, PipelineError> {
        Ok(rows
            .iter()
            .map(|row| match *self {
                Self::SumThreshold { threshold } => u8::from(row.iter().sum::<f64>() > threshold),
                Self::Constant { label } => label,
            })
            .collect())
    }
}

/// Load the fitted model, failing with [`PipelineError::PredictorLoad`] if it
/// is absent or unreadable.
pub fn load_model(store: &dyn ArtifactStore) -> Result<LoadedModel, PipelineError> {
    let data = store.get(keys::MODEL).map_err(|e| match e {
        PipelineError::ArtifactMissing { key } => {
            PipelineError::predictor_load(format!("model artifact not found at {key}"))
        }
        other => PipelineError::predictor_load(other.to_string()),
    })?;
    Ok(LoadedModel::new(ModelArtifact::from_json(&data)?))
}

/// Pick the predictor for a long-running process.
///
/// Called once at startup; callers hold on to the result rather than
/// re-checking the store per request.
pub fn select_predictor(store: &dyn ArtifactStore) -> Arc<dyn Predictor> {
    if !store.exists(keys::MODEL) {
        warn!(
            location = %store.describe(keys::MODEL),
            "Model artifact not found, using sum-threshold fallback"
        );
        return Arc::new(FallbackPredictor::MODEL_ABSENT);
    }
    match load_model(store) {
        Ok(model) => {
            info!(
                algorithm = %model.artifact().algorithm,
                features = model.artifact().feature_names.len(),
                "Loaded model artifact"
            );
            Arc::new(model)
        }
        Err(e) => {
            warn!(error = %e, "Model artifact could not be loaded, using constant fallback");
            Arc::new(FallbackPredictor::MODEL_UNREADABLE)
        }
    }
}
