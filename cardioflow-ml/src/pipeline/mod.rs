//! The training pipeline: ingestion, validation, transformation, training and
//! evaluation.
//!
//! Stages exchange data only through an [`ArtifactStore`]. Each one can be run
//! on its own as long as its input artifacts exist, and each either writes its
//! complete output artifact or nothing. Ordering is left to the caller.

pub mod evaluation;
pub mod ingestion;
pub mod training;
pub mod transformation;
pub mod validation;

pub use evaluation::{EvaluationSummary, ModelEvaluation};
pub use ingestion::{DataIngestion, IngestionSummary};
pub use training::{ModelTraining, TrainingSummary};
pub use transformation::{DataTransformation, TransformSummary};
pub use validation::DataValidation;

use crate::data::DataTable;
use crate::error::PipelineError;
use crate::store::ArtifactStore;
use std::time::Instant;
use tracing::{error, info, info_span};

/// A single pipeline step.
pub trait Stage {
    type Output;

    /// Stage name used in logs.
    const NAME: &'static str;

    fn run(&self, store: &dyn ArtifactStore) -> Result<Self::Output, PipelineError>;
}

/// Run `stage` inside a tracing span, logging its outcome and duration.
pub fn run_stage<S: Stage>(stage: &S, store: &dyn ArtifactStore) -> Result<S::Output, PipelineError> {
    let span = info_span!("stage", name = S::NAME);
    let _guard = span.enter();

    let started = Instant::now();
    info!("Stage started");
    let result = stage.run(store);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => info!(elapsed_ms, "Stage completed"),
        Err(e) => error!(elapsed_ms, error = %e, "Stage failed"),
    }
    result
}

/// Read and parse a CSV artifact produced by an earlier stage.
pub(crate) fn read_table(store: &dyn ArtifactStore, key: &str) -> Result<DataTable, PipelineError> {
    let data = store.get(key)?;
    Ok(DataTable::from_csv_bytes(&data)?)
}
