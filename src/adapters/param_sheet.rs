//! Parameter sheet adapter
//!
//! A parameter sheet is a CSV file with one row per subject. Rows are matched
//! to series files through their `file_name` column.

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::AnalysisError;
use crate::normalizer::RawSubjectParams;

/// Parsed parameter sheet
#[derive(Debug, Clone, Default)]
pub struct ParameterSheet {
    rows: Vec<RawSubjectParams>,
}

impl ParameterSheet {
    pub fn from_csv(raw: &str) -> Result<Self, AnalysisError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(raw.as_bytes());
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<RawSubjectParams>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[RawSubjectParams] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a series file.
    ///
    /// Names are compared by file stem, so `h01` and `data/h01.csv` both match
    /// a row whose `file_name` is `h01.csv`.
    pub fn for_file(&self, path: &Path) -> Result<&RawSubjectParams, AnalysisError> {
        let wanted = stem(path);
        self.rows
            .iter()
            .find(|row| {
                row.file_name
                    .as_deref()
                    .is_some_and(|name| stem(Path::new(name)) == wanted)
            })
            .ok_or_else(|| {
                AnalysisError::NotFound(format!("no parameter row for {}", path.display()))
            })
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
