//! Error types for the cardioflow-ml crate.

use thiserror::Error;

/// Top-level error type for pipeline stages, predictors and the artifact store.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Artifact missing: {key}")]
    ArtifactMissing { key: String },

    #[error("Schema missing: {0}")]
    SchemaMissing(String),

    #[error("Label column '{column}' not found")]
    LabelColumnMissing { column: String },

    #[error("Non-numeric value {value:?} in column '{column}' at row {row}")]
    FeatureType {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Predictor load error: {0}")]
    PredictorLoad(String),

    #[error("Prediction shape mismatch: predictor expects {expected} features, got {actual}")]
    PredictionShape { expected: usize, actual: usize },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
}

impl PipelineError {
    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::DataSource(msg.into())
    }

    pub fn artifact_missing(key: impl Into<String>) -> Self {
        Self::ArtifactMissing { key: key.into() }
    }

    pub fn schema_missing(msg: impl Into<String>) -> Self {
        Self::SchemaMissing(msg.into())
    }

    pub fn label_missing(column: impl Into<String>) -> Self {
        Self::LabelColumnMissing {
            column: column.into(),
        }
    }

    pub fn predictor_load(msg: impl Into<String>) -> Self {
        Self::PredictorLoad(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Whether this error means an upstream artifact has not been produced yet.
    pub fn is_missing_artifact(&self) -> bool {
        matches!(self, Self::ArtifactMissing { .. })
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
