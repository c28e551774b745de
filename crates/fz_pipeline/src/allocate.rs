//! ALLOCATE stage: strata → quota allocation, with pool sizes for the summary.

use fz_algo::{Allocation, QuotaAllocator, Strata};
use fz_core::SelectionParams;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Pool sizes after stratification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrataCounts {
    pub must_include: usize,
    pub neg_ssti: usize,
    pub neg_blood: usize,
    pub mssa_pvl_positive: usize,
    pub mssa_pvl_negative: usize,
    /// SSTI/Blood records whose PVL cell could not be read.
    pub unplaced: usize,
    pub excluded_other: usize,
}

impl StrataCounts {
    pub fn of(s: &Strata<'_>) -> Self {
        Self {
            must_include: s.must_include.len(),
            neg_ssti: s.neg_ssti.len(),
            neg_blood: s.neg_blood.len(),
            mssa_pvl_positive: s.mssa_pos.len(),
            mssa_pvl_negative: s.mssa_neg.len(),
            unplaced: s.unplaced.len(),
            excluded_other: s.excluded_other,
        }
    }
}

pub fn allocate<'a>(strata: &Strata<'a>, params: &SelectionParams) -> Allocation<'a> {
    let c = StrataCounts::of(strata);
    info!(
        must_include = c.must_include,
        neg_ssti = c.neg_ssti,
        neg_blood = c.neg_blood,
        mssa_pvl_positive = c.mssa_pvl_positive,
        mssa_pvl_negative = c.mssa_pvl_negative,
        excluded_other = c.excluded_other,
        "strata"
    );
    if c.unplaced > 0 {
        warn!(count = c.unplaced, "records with an unreadable PVL result are not selectable");
    }
    QuotaAllocator::from_params(params).allocate(strata)
}
