use crate::model::{CSV_COLUMNS, ObservationRecord};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("file write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `records` to `path` with the fixed 29-column header. An existing
/// file at `path` is overwritten without confirmation.
pub fn write_csv(path: &Path, records: &[ObservationRecord]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.write_record(CSV_COLUMNS.iter().map(|column| record.get(column)))?;
    }
    writer.flush()?;
    Ok(())
}
