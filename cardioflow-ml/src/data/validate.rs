//! Structural validation of a dataset against a declared schema.

use crate::config::ValidationPolicy;
use crate::data::schema::Schema;
use crate::data::table::DataTable;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Findings of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_rows: usize,
    /// Schema columns absent from the dataset, in schema order.
    pub missing_columns: Vec<String>,
    /// Dataset columns absent from the schema, in dataset order.
    pub extra_columns: Vec<String>,
    /// Null cell count for every dataset column.
    pub null_counts: BTreeMap<String, usize>,
}

impl ValidationReport {
    /// Columns that contain at least one null, with their counts.
    pub fn columns_with_nulls(&self) -> Vec<(&str, usize)> {
        self.null_counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(c, n)| (c.as_str(), *n))
            .collect()
    }

    pub fn columns_match(&self) -> bool {
        self.missing_columns.is_empty() && self.extra_columns.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.columns_match() && self.null_counts.values().all(|n| *n == 0)
    }

    /// One-line description of every finding.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing_columns.is_empty() {
            parts.push(format!("missing columns: {:?}", self.missing_columns));
        }
        if !self.extra_columns.is_empty() {
            parts.push(format!("extra columns: {:?}", self.extra_columns));
        }
        let nulls = self.columns_with_nulls();
        if !nulls.is_empty() {
            parts.push(format!("null values: {nulls:?}"));
        }
        if parts.is_empty() {
            "columns match schema, no missing values".to_string()
        } else {
            parts.join("; ")
        }
    }

    /// Apply `policy` to this report.
    pub fn enforce(&self, policy: ValidationPolicy) -> Result<(), PipelineError> {
        match policy {
            ValidationPolicy::Advisory => Ok(()),
            ValidationPolicy::Strict if self.is_clean() => Ok(()),
            ValidationPolicy::Strict => Err(PipelineError::ValidationFailed(self.summary())),
        }
    }
}

/// Compare the dataset's columns with `schema` and count nulls per column.
pub fn validate_table(table: &DataTable, schema: &Schema) -> ValidationReport {
    let missing_columns = schema
        .columns
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .cloned()
        .collect();

    let extra_columns = table
        .columns
        .iter()
        .filter(|c| !schema.contains(c))
        .cloned()
        .collect();

    let null_counts = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let nulls = table.column_values(i).filter(|v| v.is_none()).count();
            (col.clone(), nulls)
        })
        .collect();

    ValidationReport {
        total_rows: table.row_count(),
        missing_columns,
        extra_columns,
        null_counts,
    }
}
