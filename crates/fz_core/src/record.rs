//! crates/fz_core/src/record.rs
//! Typed specimen row. Semantic fields are parsed once by the loader; every
//! input cell is also kept verbatim (in original column order) for output.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::category::PvlStatus;

/// 0-based data-row index in the input table (header row excluded).
/// Identity of a record for deduplication and digests.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub usize);

impl RowId {
    #[inline]
    pub fn index(self) -> usize { self.0 }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// One input row. Immutable after load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub row: RowId,
    /// Raw body-site value (e.g. "Wound", "Blood").
    pub specimen: String,
    /// mecA test read as "Positive"; anything else (missing included) is negative.
    pub mec_a_positive: bool,
    /// mecC test read as "Positive"; anything else (missing included) is negative.
    pub mec_c_positive: bool,
    /// `None` when the PVL cell is neither "Positive" nor "Negative".
    pub pvl: Option<PvlStatus>,
    pub originator: String,
    /// Full input row, original column order, original text.
    pub cells: Vec<String>,
}

/// Exact "Positive" test call.
#[inline]
pub fn is_positive_call(cell: &str) -> bool {
    cell == PvlStatus::POSITIVE
}

impl Record {
    /// Build a record from already-extracted semantic cells.
    pub fn from_cells(
        row: RowId,
        specimen: &str,
        mec_a: &str,
        mec_c: &str,
        pvl: &str,
        originator: &str,
        cells: Vec<String>,
    ) -> Self {
        Self {
            row,
            specimen: specimen.to_string(),
            mec_a_positive: is_positive_call(mec_a),
            mec_c_positive: is_positive_call(mec_c),
            pvl: PvlStatus::parse_cell(pvl),
            originator: originator.to_string(),
            cells,
        }
    }
}
