//! Stage 1: copy the raw source into the raw snapshot artifact.

use super::Stage;
use crate::data::DataTable;
use crate::error::PipelineError;
use crate::store::{ArtifactStore, keys};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Reads [`keys::SOURCE_DATA`] and writes it unmodified to
/// [`keys::RAW_SNAPSHOT`].
///
/// The source is parsed only to confirm it is delimited text with a header;
/// the snapshot is the original bytes, so re-running on an unchanged source
/// produces a byte-identical artifact.
#[derive(Debug, Clone, Default)]
pub struct DataIngestion;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSummary {
    pub rows: usize,
    pub columns: usize,
}

impl Stage for DataIngestion {
    type Output = IngestionSummary;
    const NAME: &'static str = "data_ingestion";

    fn run(&self, store: &dyn ArtifactStore) -> Result<IngestionSummary, PipelineError> {
        let data = store.get(keys::SOURCE_DATA).map_err(|e| match e {
            PipelineError::ArtifactMissing { key } => PipelineError::data_source(format!(
                "source not found: {}",
                store.describe(&key)
            )),
            other => PipelineError::data_source(other.to_string()),
        })?;

        let table = DataTable::from_csv_bytes(&data)
            .map_err(|e| PipelineError::data_source(format!("unparseable source: {e}")))?;
        if table.columns.iter().all(|c| c.is_empty()) {
            return Err(PipelineError::data_source("source has no header row"));
        }

        store.put(keys::RAW_SNAPSHOT, &data)?;

        let summary = IngestionSummary {
            rows: table.row_count(),
            columns: table.column_count(),
        };
        info!(
            rows = summary.rows,
            columns = summary.columns,
            location = %store.describe(keys::RAW_SNAPSHOT),
            "Data ingested"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryArtifactStore;

    #[test]
    fn test_ingest_copies_source_unchanged() {
        let source = "age,sex,target\n63,1,1\n37, 0 ,0\n";
        let store = MemoryArtifactStore::new().with(keys::SOURCE_DATA, source);

        let summary = DataIngestion.run(&store).unwrap();
        assert_eq!(summary, IngestionSummary { rows: 2, columns: 3 });
        assert_eq!(store.get(keys::RAW_SNAPSHOT).unwrap(), source.as_bytes());
    }

    #[test]
    fn test_ingest_missing_source() {
        let store = MemoryArtifactStore::new();
        let err = DataIngestion.run(&store).unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));
        assert!(!store.exists(keys::RAW_SNAPSHOT));
    }

    #[test]
    fn test_ingest_unparseable_source_writes_nothing() {
        let store = MemoryArtifactStore::new().with(keys::SOURCE_DATA, "a,b\n1,2\n3,4,5\n");
        let err = DataIngestion.run(&store).unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));
        assert!(!store.exists(keys::RAW_SNAPSHOT));

        let empty = MemoryArtifactStore::new().with(keys::SOURCE_DATA, "");
        assert!(DataIngestion.run(&empty).is_err());
        assert!(!empty.exists(keys::RAW_SNAPSHOT));
    }
}
