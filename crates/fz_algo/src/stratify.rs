//! Stratification of classified records into the selection pools.
//!
//! Contract:
//! - Must-include: MRSA ∧ PVL Positive ∧ class ∈ {SSTI, Blood}. Never dropped.
//! - The remaining SSTI/Blood records with a known PVL are split into the four
//!   candidate pools the allocator draws from.
//! - SSTI/Blood records with an unreadable PVL belong to no pool (`unplaced`);
//!   class Other is `excluded_other`. Both are kept only for counting.
//! - Every pool preserves input order.

use fz_core::{Category, ClassifiedRecord, PvlStatus};

/// Partition of the input. Borrowed views; nothing is copied.
#[derive(Clone, Debug, Default)]
pub struct Strata<'a> {
    pub must_include: Vec<ClassifiedRecord<'a>>,
    pub neg_ssti: Vec<ClassifiedRecord<'a>>,
    pub neg_blood: Vec<ClassifiedRecord<'a>>,
    pub mssa_pos: Vec<ClassifiedRecord<'a>>,
    pub mssa_neg: Vec<ClassifiedRecord<'a>>,
    pub unplaced: Vec<ClassifiedRecord<'a>>,
    pub excluded_other: usize,
}

impl<'a> Strata<'a> {
    /// `M`, the size of the must-include set.
    #[inline]
    pub fn must_include_count(&self) -> usize {
        self.must_include.len()
    }

    /// `N − M`, signed. Negative when the must-include set alone exceeds the target.
    #[inline]
    pub fn remaining_needed(&self, target_total: u32) -> i64 {
        target_total as i64 - self.must_include.len() as i64
    }

    /// Records that take part in selection but are not must-include.
    pub fn remaining_pool_len(&self) -> usize {
        self.neg_ssti.len() + self.neg_blood.len() + self.mssa_pos.len() + self.mssa_neg.len()
    }
}

pub fn stratify<'a>(records: &[ClassifiedRecord<'a>]) -> Strata<'a> {
    let mut s = Strata::default();
    for &r in records {
        if !r.specimen_class.is_eligible() {
            s.excluded_other += 1;
            continue;
        }
        match r.category() {
            Some(Category::MrsaPvlPosSsti) | Some(Category::MrsaPvlPosBlood) => s.must_include.push(r),
            Some(Category::MrsaPvlNegSsti) => s.neg_ssti.push(r),
            Some(Category::MrsaPvlNegBlood) => s.neg_blood.push(r),
            Some(Category::Mssa) => match r.pvl() {
                Some(PvlStatus::Positive) => s.mssa_pos.push(r),
                _ => s.mssa_neg.push(r),
            },
            None => s.unplaced.push(r),
        }
    }
    s
}
