//! In-memory tabular dataset and numeric projections of it.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Cell text read as a missing value, matching the usual dataframe defaults.
pub const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A delimited-text dataset: a header row plus string cells.
///
/// Empty cells and [`NULL_TOKENS`] are nulls (`None`). Values are kept as text so a table can be
/// written back out without altering what was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Parse comma-delimited text with a header row.
    ///
    /// Rows whose field count differs from the header are rejected. Data
    /// cells are trimmed; header names are kept exactly as written.
    pub fn from_csv_bytes(data: &[u8]) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(data);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|cell| {
                    if NULL_TOKENS.contains(&cell) {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Serialize to comma-delimited text with a header row.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).and_then(|c| c.as_deref()))
    }

    /// Split off `label` from the remaining columns.
    ///
    /// The remaining columns keep their original order and are parsed as
    /// `f64`; the label cells are returned verbatim, aligned by row.
    pub fn split_label(
        &self,
        label: &str,
    ) -> Result<(FeatureMatrix, Vec<Option<String>>), PipelineError> {
        let label_idx = self
            .column_index(label)
            .ok_or_else(|| PipelineError::label_missing(label))?;

        let feature_idx: Vec<usize> = (0..self.columns.len()).filter(|&i| i != label_idx).collect();
        let columns = feature_idx.iter().map(|&i| self.columns[i].clone()).collect();

        let mut rows = Vec::with_capacity(self.rows.len());
        let mut labels = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let mut values = Vec::with_capacity(feature_idx.len());
            for &i in &feature_idx {
                let cell = row.get(i).and_then(|c| c.as_deref());
                values.push(parse_numeric(cell, &self.columns[i], row_idx)?);
            }
            rows.push(values);
            labels.push(row.get(label_idx).cloned().flatten());
        }

        Ok((FeatureMatrix { columns, rows }, labels))
    }
}

fn parse_numeric(cell: Option<&str>, column: &str, row: usize) -> Result<f64, PipelineError> {
    let text = cell.unwrap_or("");
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PipelineError::FeatureType {
            column: column.to_string(),
            row,
            value: text.to_string(),
        }),
    }
}

/// Parse binary label cells into `0`/`1`.
///
/// Accepts any numeric spelling of zero or one (`1`, `1.0`); anything else is
/// a [`PipelineError::FeatureType`].
pub fn parse_labels(labels: &[Option<String>], column: &str) -> Result<Vec<u8>, PipelineError> {
    labels
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let value = parse_numeric(cell.as_deref(), column, row)?;
            if value == 0.0 {
                Ok(0)
            } else if value == 1.0 {
                Ok(1)
            } else {
                Err(PipelineError::FeatureType {
                    column: column.to_string(),
                    row,
                    value: cell.clone().unwrap_or_default(),
                })
            }
        })
        .collect()
}

/// Numeric feature rows with named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, idx: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[idx]).collect()
    }

    /// Rows at the given indices, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Vec<Vec<f64>> {
        indices.iter().map(|&i| self.rows[i].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "age,chol,target\n63,233,1\n37,,0\n41,204,1\n";

    #[test]
    fn test_parse_csv_with_nulls() {
        let table = DataTable::from_csv_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["age", "chol", "target"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[1][1], None);
        assert_eq!(table.rows[2][0].as_deref(), Some("41"));
    }

    #[test]
    fn test_null_tokens_are_nulls() {
        let table =
            DataTable::from_csv_bytes(b"age,chol,target
63,NA,1
37,NaN,0
41, null ,1
50,N/A,0
")
                .unwrap();
        assert!(table.rows.iter().all(|row| row[1].is_none()));
        assert_eq!(table.rows[0][0].as_deref(), Some("63"));
    }

    #[test]
    fn test_header_names_are_not_trimmed() {
        let table = DataTable::from_csv_bytes(b" age,chol
 63 ,233
").unwrap();
        assert_eq!(table.columns, vec![" age", "chol"]);
        assert_eq!(table.column_index("age"), None);
        assert_eq!(table.rows[0][0].as_deref(), Some("63"));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = DataTable::from_csv_bytes(b"a,b\n1,2\n3\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_csv_roundtrip_preserves_cells() {
        let table = DataTable::from_csv_bytes(SAMPLE.as_bytes()).unwrap();
        let bytes = table.to_csv_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), SAMPLE);
    }

    #[test]
    fn test_split_label_keeps_order() {
        let table = DataTable::from_csv_bytes(b"target,age,sex\n1,63,1\n0,37,0\n").unwrap();
        let (features, labels) = table.split_label("target").unwrap();
        assert_eq!(features.columns, vec!["age", "sex"]);
        assert_eq!(features.rows, vec![vec![63.0, 1.0], vec![37.0, 0.0]]);
        assert_eq!(labels, vec![Some("1".to_string()), Some("0".to_string())]);
    }

    #[test]
    fn test_split_label_missing() {
        let table = DataTable::from_csv_bytes(b"age,sex\n63,1\n").unwrap();
        let err = table.split_label("target").unwrap_err();
        assert!(matches!(err, PipelineError::LabelColumnMissing { .. }));
    }

    #[test]
    fn test_split_label_rejects_text_and_nulls() {
        let table = DataTable::from_csv_bytes(SAMPLE.as_bytes()).unwrap();
        match table.split_label("target").unwrap_err() {
            PipelineError::FeatureType { column, row, value } => {
                assert_eq!(column, "chol");
                assert_eq!(row, 1);
                assert_eq!(value, "");
            }
            other => panic!("unexpected error: {other}"),
        }

        let table = DataTable::from_csv_bytes(b"age,target\nold,1\n").unwrap();
        assert!(matches!(
            table.split_label("target").unwrap_err(),
            PipelineError::FeatureType { .. }
        ));
    }

    #[test]
    fn test_parse_labels() {
        let labels = vec![Some("1".into()), Some("0.0".into()), Some("1.0".into())];
        assert_eq!(parse_labels(&labels, "target").unwrap(), vec![1, 0, 1]);

        let bad = vec![Some("2".into())];
        assert!(parse_labels(&bad, "target").is_err());
    }
}
