//! Reads feedback exports into normalized records.
//!
//! Header validation runs before any row is read; a missing required column
//! aborts the import. Rows whose timestamp cannot be read are dropped and counted.

mod normalizer;
mod parser;
mod schema;

pub use normalizer::normalize_header;
pub use schema::{CanonicalField, SchemaError, SchemaMapping};

use crate::workflows::feedback::FeedbackRecord;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Schema(SchemaError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read feedback export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid feedback CSV data: {}", err),
            ImportError::Schema(err) => write!(f, "feedback export has an unusable header: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Schema(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<SchemaError> for ImportError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

/// Records in source order plus the number of rows discarded for bad timestamps.
#[derive(Debug, Clone, Default)]
pub struct ImportedTable {
    pub records: Vec<FeedbackRecord>,
    pub dropped_rows: usize,
}

pub struct FeedbackImporter;

impl FeedbackImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ImportedTable, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ImportedTable, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = normalizer::decode_record(csv_reader.byte_headers()?);
        let mapping = SchemaMapping::from_headers(headers.iter())?;
        let mut table = ImportedTable::default();

        for (line, raw) in csv_reader.byte_records().enumerate() {
            let row = normalizer::decode_record(&raw?);
            match parser::parse_row(&row, &mapping) {
                Some(record) => table.records.push(record),
                None => {
                    debug!(row = line + 2, "dropping row with unreadable timestamp");
                    table.dropped_rows += 1;
                }
            }
        }

        info!(
            records = table.records.len(),
            dropped = table.dropped_rows,
            "feedback export imported"
        );
        Ok(table)
    }
}
