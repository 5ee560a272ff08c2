//! Declared column schema.
//!
//! The schema is a validation reference only: it names the columns a dataset
//! is expected to have and never drives type coercion.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The 13 feature columns, in the order the predictor consumes them.
pub const FEATURE_ORDER: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Expected set of column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<String>,
}

/// `COLUMNS` may be a plain list or a mapping of name to declared dtype.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColumnsSpec {
    List(Vec<String>),
    Mapping(serde_yaml::Mapping),
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(rename = "COLUMNS")]
    columns: Option<ColumnsSpec>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// The 13 features plus `label`.
    pub fn heart_disease(label: &str) -> Self {
        let mut columns: Vec<String> = FEATURE_ORDER.iter().map(|c| c.to_string()).collect();
        columns.push(label.to_string());
        Self { columns }
    }

    /// Parse a YAML document declaring the column set under `COLUMNS`.
    pub fn from_yaml(text: &str) -> Result<Self, PipelineError> {
        let doc: SchemaDocument = serde_yaml::from_str(text)?;
        let columns = match doc.columns {
            Some(ColumnsSpec::List(names)) => names,
            Some(ColumnsSpec::Mapping(map)) => map
                .into_iter()
                .map(|(k, _)| match k {
                    serde_yaml::Value::String(s) => Ok(s),
                    other => serde_yaml::to_string(&other)
                        .map(|s| s.trim().to_string())
                        .map_err(PipelineError::from),
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => {
                return Err(PipelineError::schema_missing(
                    "schema document has no COLUMNS key",
                ));
            }
        };
        Ok(Self { columns })
    }

    /// Render as a YAML document mapping each column to `number`.
    pub fn to_yaml(&self) -> Result<String, PipelineError> {
        let columns: BTreeMap<&str, &str> =
            self.columns.iter().map(|c| (c.as_str(), "number")).collect();
        let mut doc = BTreeMap::new();
        doc.insert("COLUMNS", columns);
        Ok(serde_yaml::to_string(&doc)?)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_list() {
        let schema = Schema::from_yaml("COLUMNS:\n  - age\n  - sex\n  - target\n").unwrap();
        assert_eq!(schema.columns, vec!["age", "sex", "target"]);
    }

    #[test]
    fn test_schema_from_mapping_keeps_document_order() {
        let schema =
            Schema::from_yaml("COLUMNS:\n  thal: int64\n  age: int64\n  oldpeak: float64\n")
                .unwrap();
        assert_eq!(schema.columns, vec!["thal", "age", "oldpeak"]);
    }

    #[test]
    fn test_schema_without_columns_key() {
        let err = Schema::from_yaml("TARGET: target\n").unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMissing(_)));
    }

    #[test]
    fn test_heart_disease_schema_roundtrip() {
        let schema = Schema::heart_disease("target");
        assert_eq!(schema.columns.len(), 14);
        let restored = Schema::from_yaml(&schema.to_yaml().unwrap()).unwrap();
        let mut expected = schema.columns.clone();
        expected.sort();
        assert_eq!(restored.columns, expected);
        assert!(restored.contains("target"));
    }
}
