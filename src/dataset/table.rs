//! In-memory CSV tables.
//!
//! Every cell is kept as a string so joins never depend on how a column
//! happened to be typed in the source file.

use crate::error::AtlasError;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// A named table with trimmed headers and rectangular rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from literal headers and rows.
    ///
    /// Rows are padded or truncated to the header width.
    pub fn new<H, R, C>(name: &str, headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim().to_string())
            .collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                normalize_row(
                    row.into_iter().map(|c| c.as_ref().trim().to_string()).collect(),
                    width,
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    /// Read a table from a CSV file.
    pub fn from_path(name: &str, path: &Path) -> Result<Self, AtlasError> {
        let file = std::fs::File::open(path).map_err(|source| AtlasError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(name, file).map_err(|source| AtlasError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse CSV from any reader.
    ///
    /// Records that fail to parse are skipped with a warning; only a header
    /// failure aborts.
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for (index, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    let row = record.iter().map(|s| s.to_string()).collect();
                    rows.push(normalize_row(row, width));
                }
                Err(e) => {
                    skipped += 1;
                    // +2: 1-based lines plus the header line
                    warn!("Skipping malformed row {} in '{}': {}", index + 2, name, e);
                }
            }
        }

        if skipped > 0 {
            info!(
                "Parsed '{}': {} rows kept, {} rows skipped",
                name,
                rows.len(),
                skipped
            );
        } else {
            debug!("Parsed '{}': {} rows", name, rows.len());
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fail with a schema error unless every named column is present.
    pub fn require(&self, columns: &[&str]) -> Result<(), AtlasError> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AtlasError::Schema {
                table: self.name.clone(),
                missing,
                present: self.headers.clone(),
            })
        }
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row { cells })
    }

    /// Rename source headers to canonical field names.
    ///
    /// For each canonical field, aliases are tried in order, first by exact
    /// match and then ignoring ASCII case. The first hit is renamed. A header
    /// already carrying the canonical name is left alone, and a header is
    /// never claimed by two fields.
    pub fn canonicalize(&mut self, aliases: &[(&str, &[String])]) {
        let mut claimed = vec![false; self.headers.len()];

        // Headers that are already canonical win over any alias.
        for (field, _) in aliases {
            if let Some(idx) = self.column(field) {
                claimed[idx] = true;
            }
        }

        for (field, candidates) in aliases {
            if self.column(field).is_some() {
                continue;
            }

            let hit = find_alias(&self.headers, &claimed, candidates);
            if let Some(idx) = hit {
                debug!(
                    "Table '{}': column '{}' -> '{}'",
                    self.name, self.headers[idx], field
                );
                self.headers[idx] = field.to_string();
                claimed[idx] = true;
            }
        }
    }
}

fn find_alias(headers: &[String], claimed: &[bool], candidates: &[String]) -> Option<usize> {
    let free = |idx: &usize| !claimed[*idx];

    for alias in candidates {
        if let Some(idx) = (0..headers.len()).filter(free).find(|&i| headers[i] == *alias) {
            return Some(idx);
        }
    }

    for alias in candidates {
        if let Some(idx) = (0..headers.len())
            .filter(free)
            .find(|&i| headers[i].eq_ignore_ascii_case(alias))
        {
            return Some(idx);
        }
    }

    None
}

/// Pad with empty cells or truncate so the row matches the header width.
fn normalize_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

/// A borrowed table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell at `idx`; blank cells read as `None`.
    pub fn get(&self, idx: usize) -> Option<&'a str> {
        self.cells
            .get(idx)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    /// Like [`Row::get`] but tolerant of an absent column.
    pub fn get_opt(&self, idx: Option<usize>) -> Option<&'a str> {
        idx.and_then(|i| self.get(i))
    }
}
