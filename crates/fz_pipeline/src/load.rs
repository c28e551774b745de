//! LOAD stage: input file → `LoadedInput` (table + echo fields + digest).
//! - Format by extension; a workbook is read from the named sheet or the first one.
//! - The input digest is SHA-256 over the raw file bytes, not the decoded table.
//! - `validate_input` runs every input check of a real run without selecting.

use std::path::Path;

use fz_core::params::validate_domains;
use fz_core::SelectionParams;
use fz_io::hasher::sha256_file;
use fz_io::table::{load_table, RawTable};
use tracing::debug;

use crate::PipelineError;

/// Deterministic bundle consumed by the later stages.
#[derive(Debug, Clone, Default)]
pub struct LoadedInput {
    pub table: RawTable,
    /// File name without directories.
    pub file_name: Option<String>,
    pub sheet: Option<String>,
    pub sha256: Option<String>,
}

impl LoadedInput {
    /// In-memory table: no file name, no digest.
    pub fn from_table(table: RawTable) -> Self {
        Self { table, ..Self::default() }
    }
}

pub fn load_input(path: &Path, sheet: Option<&str>) -> Result<LoadedInput, PipelineError> {
    let table = load_table(path, sheet)?;
    let sha256 = sha256_file(path)?;
    debug!(sha256 = %sha256, "input digest");
    Ok(LoadedInput {
        table,
        file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        sheet: sheet.map(str::to_string),
        sha256: Some(sha256),
    })
}

/// Parameter domains and required columns. Returns the number of data rows.
pub fn validate_input(input: &LoadedInput, params: &SelectionParams) -> Result<usize, PipelineError> {
    validate_domains(params)?;
    let records = input.table.to_records(&params.columns)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CSV: &str = "Id,Specimen,Originator,RT-pvl Result,RT-mecA Result,RT-mecC Result\n\
                       1,Wound,LAB-1,Positive,Positive,\n\
                       2,Blood,LAB-2,Negative,Negative,\n";

    #[test]
    fn csv_input_with_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specimens.csv");
        fs::write(&path, CSV).unwrap();

        let input = load_input(&path, None).unwrap();
        assert_eq!(input.file_name.as_deref(), Some("specimens.csv"));
        assert_eq!(input.sha256.as_deref(), Some(fz_io::hasher::sha256_hex(CSV.as_bytes()).as_str()));
        assert_eq!(input.table.rows.len(), 2);
        assert_eq!(validate_input(&input, &SelectionParams::default()).unwrap(), 2);
    }

    #[test]
    fn input_errors_surface_as_input() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("specimens.txt");
        fs::write(&txt, CSV).unwrap();
        assert!(matches!(load_input(&txt, None), Err(PipelineError::Input(_))));

        let csv = dir.path().join("short.csv");
        fs::write(&csv, "Specimen,Originator\nWound,A\n").unwrap();
        let input = load_input(&csv, None).unwrap();
        let err = validate_input(&input, &SelectionParams::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Input(ref m) if m.contains("RT-pvl Result")), "{err}");

        let missing = dir.path().join("absent.csv");
        assert!(matches!(load_input(&missing, None), Err(PipelineError::Io(_))));
    }
}
