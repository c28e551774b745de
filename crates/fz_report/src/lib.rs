//! fz_report/src/lib.rs: Pure report model + sheet layout + XLSX renderer.
//!
//! Determinism rules:
//! - No I/O here. The renderer returns workbook bytes; callers persist them.
//! - Fixed section order (MSSA first) and stable row order within sections.
//! - Every selected record appears once; a repeat is an inconsistency, not data.

#![deny(unsafe_code)]

use core::fmt;

pub mod layout;
pub mod model;
#[cfg(feature = "render_xlsx")]
pub mod render_xlsx;

pub use layout::{layout, LayoutRow, RowRole, SheetLayout};
pub use model::{assemble, Annotation, ReportBuilder, ReportModel, ReportRow, ReportSection};
#[cfg(feature = "render_xlsx")]
pub use render_xlsx::render_xlsx;

/// Derived columns appended after the input columns.
pub const SPECIMEN_FINAL_COLUMN: &str = "Specimen Final";
pub const RESULTS_COLUMN: &str = "Results";

// ===== Errors =====
#[derive(Debug)]
pub enum ReportError {
    /// Model invariants violated (e.g. a record selected twice).
    Inconsistent(&'static str),
    /// Sheet exceeds spreadsheet row/column limits.
    Limit(&'static str),
    /// Workbook serialization failed.
    Xlsx(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Inconsistent(m) => write!(f, "inconsistent report: {m}"),
            ReportError::Limit(m) => write!(f, "sheet limit exceeded: {m}"),
            ReportError::Xlsx(m) => write!(f, "xlsx: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}

#[cfg(feature = "render_xlsx")]
impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Xlsx(e.to_string())
    }
}
