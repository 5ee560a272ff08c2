//! # cardioflow-ml: heart-disease training pipeline and risk form
//!
//! Five stages turn a raw patient CSV into a scored classifier:
//! ingestion, validation, transformation, training and evaluation. Stages
//! talk to each other only through named artifacts in an [`ArtifactStore`],
//! so each can be re-run on its own.
//!
//! The [`serving`] module puts a loaded [`Predictor`] behind an HTML form.

pub mod algorithms;
pub mod config;
pub mod data;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod serving;
pub mod store;

pub use config::{ConfigOverrides, PipelineConfig, ValidationPolicy, load_config};
pub use error::{PipelineError, PipelineResult};
pub use inference::{FallbackPredictor, Predictor, select_predictor};
pub use pipeline::{
    DataIngestion, DataTransformation, DataValidation, ModelEvaluation, ModelTraining, Stage,
    run_stage,
};
pub use serving::AppContext;
pub use store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
