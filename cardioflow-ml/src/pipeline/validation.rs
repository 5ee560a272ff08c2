//! Stage 2: check the raw snapshot against the declared schema.

use super::{Stage, read_table};
use crate::config::{PipelineConfig, ValidationPolicy};
use crate::data::{Schema, ValidationReport, validate_table};
use crate::error::PipelineError;
use crate::store::{ArtifactStore, keys};
use tracing::{info, warn};

/// Read-only comparison of [`keys::RAW_SNAPSHOT`] with [`keys::SCHEMA`].
///
/// Under [`ValidationPolicy::Advisory`] findings are logged and the stage
/// succeeds; only a missing snapshot or schema fails it.
#[derive(Debug, Clone, Default)]
pub struct DataValidation {
    pub policy: ValidationPolicy,
}

impl DataValidation {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.validation.policy)
    }
}

impl Stage for DataValidation {
    type Output = ValidationReport;
    const NAME: &'static str = "data_validation";

    fn run(&self, store: &dyn ArtifactStore) -> Result<ValidationReport, PipelineError> {
        let table = read_table(store, keys::RAW_SNAPSHOT)?;
        let schema = load_schema(store)?;

        let report = validate_table(&table, &schema);
        log_report(&report);

        report.enforce(self.policy)?;
        Ok(report)
    }
}

fn load_schema(store: &dyn ArtifactStore) -> Result<Schema, PipelineError> {
    let data = store.get(keys::SCHEMA).map_err(|e| match e {
        PipelineError::ArtifactMissing { key } => {
            PipelineError::schema_missing(format!("not found: {}", store.describe(&key)))
        }
        other => other,
    })?;
    let text = std::str::from_utf8(&data)
        .map_err(|e| PipelineError::schema_missing(format!("schema is not UTF-8: {e}")))?;
    Schema::from_yaml(text)
}

fn log_report(report: &ValidationReport) {
    if !report.missing_columns.is_empty() {
        warn!(columns = ?report.missing_columns, "Missing columns");
    }
    if !report.extra_columns.is_empty() {
        warn!(columns = ?report.extra_columns, "Extra columns");
    }
    if report.columns_match() {
        info!("Column names match schema");
    }

    let nulls = report.columns_with_nulls();
    if nulls.is_empty() {
        info!(rows = report.total_rows, "No missing values found");
    } else {
        for (column, count) in nulls {
            warn!(column, count, "Missing values detected");
        }
    }
}
