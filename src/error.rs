//! Library error type.
//!
//! Schema problems are fatal to the call that hits them. Data-quality gaps
//! (unparseable numbers, missing flags, orphan keys) never surface here; they
//! show up as absent values in the derived tables.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading tables or computing statistics.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// A required identifying column is absent from an input table.
    #[error("table '{table}' is missing required column(s) {missing:?}; found {present:?}")]
    Schema {
        table: String,
        missing: Vec<String>,
        present: Vec<String>,
    },

    /// One or more required dataset files do not exist.
    #[error("missing required dataset file(s): {}", format_paths(.0))]
    MissingFiles(Vec<PathBuf>),

    /// The CSV reader failed on a file as a whole (not a single record).
    #[error("failed to parse CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AtlasError {
    /// Returns true for the schema variant.
    pub fn is_schema(&self) -> bool {
        matches!(self, AtlasError::Schema { .. })
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
