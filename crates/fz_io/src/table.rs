//! crates/fz_io/src/table.rs
//! Input table loading.
//!
//! Contract:
//! - Format is chosen by file extension (case-insensitive):
//!     * `csv`                          → bytes decoded after encoding detection
//!     * `xlsx` `xlsm` `xls` `xlsb` `ods` → first sheet, or the named one
//! - The first row is the header row; every later row is a data row.
//! - Rows that are entirely blank are skipped.
//! - Every row is padded/truncated to the header width. Cells are kept as text;
//!   whole-number floats print without a decimal part ("1234", not "1234.0").
//! - Required columns are resolved by exact header name.

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use fz_core::{ColumnMap, Record, RowId};
use tracing::{debug, info};

use crate::{IoError, IoResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Workbook,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> IoResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(TableFormat::Workbook),
            _ => Err(IoError::UnsupportedFormat(ext)),
        }
    }
}

/// Header row plus text cells, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table, normalising every row to the header width and
    /// dropping blank rows.
    pub fn new(headers: Vec<String>, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &str) -> IoResult<usize> {
        self.column_index(name).ok_or_else(|| IoError::MissingColumn(name.to_string()))
    }

    /// Typed records; `RowId` is the 0-based data-row index.
    /// Short rows read as blank cells and are padded to the header width.
    pub fn to_records(&self, columns: &ColumnMap) -> IoResult<Vec<Record>> {
        let specimen = self.require(&columns.specimen)?;
        let originator = self.require(&columns.originator)?;
        let pvl = self.require(&columns.pvl)?;
        let mec_a = self.require(&columns.mec_a)?;
        let mec_c = self.require(&columns.mec_c)?;
        let width = self.headers.len();

        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cell = move |c: usize| row.get(c).map_or("", String::as_str);
                let mut cells = row.clone();
                if cells.len() < width {
                    cells.resize(width, String::new());
                }
                Record::from_cells(
                    RowId(i),
                    cell(specimen),
                    cell(mec_a),
                    cell(mec_c),
                    cell(pvl),
                    cell(originator),
                    cells,
                )
            })
            .collect())
    }
}

/// Load `path`; `sheet` applies to workbooks only.
pub fn load_table(path: &Path, sheet: Option<&str>) -> IoResult<RawTable> {
    let table = match TableFormat::from_path(path)? {
        TableFormat::Csv => {
            let bytes = fs::read(path).map_err(IoError::Read)?;
            read_csv_bytes(&bytes)?
        }
        TableFormat::Workbook => read_workbook(path, sheet)?,
    };
    info!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "table loaded"
    );
    Ok(table)
}

// ---- CSV ----

/// Decode CSV bytes (BOM, then detected encoding) and parse them.
pub fn read_csv_bytes(bytes: &[u8]) -> IoResult<RawTable> {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    // `decode` sniffs a BOM first and falls back to the guess.
    let (text, used, had_errors) = encoding.decode(bytes);
    debug!(encoding = used.name(), had_errors, "csv decoded");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for rec in reader.records() {
        let rec = rec?;
        rows.push(rec.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(RawTable::new(headers, rows))
}

// ---- Workbooks ----

fn read_workbook(path: &Path, sheet: Option<&str>) -> IoResult<RawTable> {
    let mut wb = open_workbook_auto(path)?;
    let names = wb.sheet_names().to_vec();
    let name = match sheet {
        Some(s) => names
            .iter()
            .find(|n| n.as_str() == s)
            .cloned()
            .ok_or_else(|| IoError::MissingSheet(s.to_string()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| IoError::MissingSheet("<first sheet>".to_string()))?,
    };
    debug!(sheet = %name, available = names.len(), "reading sheet");

    let range = wb.worksheet_range(&name)?;
    let mut rows = range.rows().map(|r| r.iter().map(cell_text).collect::<Vec<String>>());
    let headers = rows.next().unwrap_or_default();
    Ok(RawTable::new(headers, rows))
}

/// Text of a workbook cell, as a spreadsheet user would read it.
pub fn cell_text(d: &Data) -> String {
    match d {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
