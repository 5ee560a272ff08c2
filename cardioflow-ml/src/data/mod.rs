//! Tabular data primitives: parsing, schema validation, standardization.

pub mod schema;
pub mod table;
pub mod transform;
pub mod validate;

pub use schema::{FEATURE_ORDER, Schema};
pub use table::{DataTable, FeatureMatrix, parse_labels};
pub use transform::StandardScaler;
pub use validate::{ValidationReport, validate_table};
