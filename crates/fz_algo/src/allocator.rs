//! Quota allocation with cascading shortfall completion.
//!
//! Contract:
//! - Initial quotas are ceiling shares of `remaining = N − M` (clamped at 0).
//! - Primary draws: MRSA PVL-negative SSTI and Blood at their quotas.
//! - Cross-completion runs in at most one direction:
//!     * SSTI short, Blood met → Blood absorbs the SSTI deficit (redraw Blood).
//!     * else Blood short, SSTI met → SSTI absorbs the Blood deficit (redraw SSTI).
//! - If SSTI + Blood exceed `max(remaining, 0)`, the excess is cut from the tail
//!   of the Blood draw, then the SSTI draw.
//! - MSSA fallback: if |selection| < N, MSSA PVL-positive first, then
//!   PVL-negative, up to N − |selection|.
//! - The must-include set is always kept whole. No record appears twice
//!   because every pool is disjoint and each pool is drawn from once.
//!
//! Determinism:
//! - All draws go through one `ProportionalSampler` (one seed per run).
//! - Integer math only.

use fz_core::rounding::ceil_pct;
use fz_core::{Category, ClassifiedRecord, SelectionParams, SpecimenClass};
use tracing::{info, warn};

use crate::sampler::ProportionalSampler;
use crate::stratify::Strata;

// ---- Quotas ----

/// Percentage split of the remaining quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaRatios {
    pub neg_ssti_pct: u8,
    pub neg_blood_pct: u8,
    pub mssa_pct: u8,
}

impl Default for QuotaRatios {
    fn default() -> Self {
        Self { neg_ssti_pct: 50, neg_blood_pct: 25, mssa_pct: 25 }
    }
}

impl From<&SelectionParams> for QuotaRatios {
    fn from(p: &SelectionParams) -> Self {
        Self {
            neg_ssti_pct: p.ssti_pct.as_u8(),
            neg_blood_pct: p.blood_pct.as_u8(),
            mssa_pct: p.mssa_pct.as_u8(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitialQuotas {
    pub neg_ssti: u32,
    pub neg_blood: u32,
    pub mssa: u32,
}

pub fn initial_quotas(remaining: i64, ratios: QuotaRatios) -> InitialQuotas {
    InitialQuotas {
        neg_ssti: ceil_pct(remaining, ratios.neg_ssti_pct),
        neg_blood: ceil_pct(remaining, ratios.neg_blood_pct),
        mssa: ceil_pct(remaining, ratios.mssa_pct),
    }
}

/// Which sibling absorbed a shortfall, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionEvent {
    None,
    /// SSTI came up short by `deficit`; Blood's quota was raised by it.
    BloodAbsorbedSsti { deficit: u32 },
    /// Blood came up short by `deficit`; SSTI's quota was raised by it.
    SstiAbsorbedBlood { deficit: u32 },
}

impl CompletionEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionEvent::None => "none",
            CompletionEvent::BloodAbsorbedSsti { .. } => "blood_absorbed_ssti",
            CompletionEvent::SstiAbsorbedBlood { .. } => "ssti_absorbed_blood",
        }
    }

    pub fn deficit(self) -> u32 {
        match self {
            CompletionEvent::None => 0,
            CompletionEvent::BloodAbsorbedSsti { deficit }
            | CompletionEvent::SstiAbsorbedBlood { deficit } => deficit,
        }
    }
}

/// Needed / found / added for one adjustable category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CategoryQuota {
    pub needed: u32,
    pub found: u32,
    pub added: u32,
}

impl CategoryQuota {
    #[inline]
    pub fn realized(&self) -> u32 {
        self.found + self.added
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuotaPlan {
    pub mssa: CategoryQuota,
    pub neg_ssti: CategoryQuota,
    pub neg_blood: CategoryQuota,
}

impl QuotaPlan {
    /// `None` for the must-include categories.
    pub fn get(&self, c: Category) -> Option<&CategoryQuota> {
        match c {
            Category::Mssa => Some(&self.mssa),
            Category::MrsaPvlNegSsti => Some(&self.neg_ssti),
            Category::MrsaPvlNegBlood => Some(&self.neg_blood),
            Category::MrsaPvlPosSsti | Category::MrsaPvlPosBlood => None,
        }
    }
}

// ---- Allocation result ----

#[derive(Clone, Debug)]
pub struct Allocation<'a> {
    pub target_total: u32,
    pub remaining_needed: i64,
    pub quotas: InitialQuotas,
    pub must_include: Vec<ClassifiedRecord<'a>>,
    pub neg_ssti: Vec<ClassifiedRecord<'a>>,
    pub neg_blood: Vec<ClassifiedRecord<'a>>,
    pub mssa_pos: Vec<ClassifiedRecord<'a>>,
    pub mssa_neg: Vec<ClassifiedRecord<'a>>,
    pub completion: CompletionEvent,
    /// Quota of the receiving category before it absorbed a deficit.
    pub neg_ssti_need_before_completion: Option<u32>,
    pub neg_blood_need_before_completion: Option<u32>,
    /// Set only when the MSSA fallback ran.
    pub mssa_need_before_completion: Option<u32>,
    /// MSSA draw size actually requested (0 when the fallback did not run).
    pub mssa_need_actual: u32,
    /// Records cut by the overshoot trim.
    pub trimmed: u32,
    pub plan: QuotaPlan,
}

impl<'a> Allocation<'a> {
    #[inline]
    pub fn mssa_fallback(&self) -> bool {
        self.mssa_need_before_completion.is_some()
    }

    pub fn selected_len(&self) -> usize {
        self.must_include.len()
            + self.neg_ssti.len()
            + self.neg_blood.len()
            + self.mssa_pos.len()
            + self.mssa_neg.len()
    }

    /// `N − |final|`, never negative.
    pub fn shortfall(&self) -> u32 {
        let len = u32::try_from(self.selected_len()).unwrap_or(u32::MAX);
        self.target_total.saturating_sub(len)
    }

    #[inline]
    pub fn must_include_exceeds_target(&self) -> bool {
        self.remaining_needed < 0
    }

    /// Final selection: must-include, SSTI, Blood, MSSA positive, MSSA negative.
    pub fn selection(&self) -> Vec<ClassifiedRecord<'a>> {
        let mut out = Vec::with_capacity(self.selected_len());
        out.extend_from_slice(&self.must_include);
        out.extend_from_slice(&self.neg_ssti);
        out.extend_from_slice(&self.neg_blood);
        out.extend_from_slice(&self.mssa_pos);
        out.extend_from_slice(&self.mssa_neg);
        out
    }

    /// Selected records of one category, in draw order.
    pub fn section(&self, c: Category) -> Vec<ClassifiedRecord<'a>> {
        let must = |class: SpecimenClass| -> Vec<ClassifiedRecord<'a>> {
            self.must_include.iter().copied().filter(|r| r.specimen_class == class).collect()
        };
        match c {
            Category::Mssa => self.mssa_pos.iter().chain(&self.mssa_neg).copied().collect(),
            Category::MrsaPvlPosSsti => must(SpecimenClass::Ssti),
            Category::MrsaPvlPosBlood => must(SpecimenClass::Blood),
            Category::MrsaPvlNegSsti => self.neg_ssti.clone(),
            Category::MrsaPvlNegBlood => self.neg_blood.clone(),
        }
    }

    /// Pre-completion quota of a category that received a completion boost.
    /// Data rows beyond it were added by completion.
    pub fn completion_boundary(&self, c: Category) -> Option<u32> {
        let q = match c {
            Category::Mssa => self.mssa_need_before_completion,
            Category::MrsaPvlNegSsti => self.neg_ssti_need_before_completion,
            Category::MrsaPvlNegBlood => self.neg_blood_need_before_completion,
            _ => None,
        }?;
        (q > 0).then_some(q)
    }
}

// ---- Allocator ----

#[derive(Clone, Copy, Debug)]
pub struct QuotaAllocator {
    target_total: u32,
    ratios: QuotaRatios,
    sampler: ProportionalSampler,
}

impl QuotaAllocator {
    pub fn new(target_total: u32, ratios: QuotaRatios, sampler: ProportionalSampler) -> Self {
        Self { target_total, ratios, sampler }
    }

    pub fn from_params(p: &SelectionParams) -> Self {
        Self::new(p.target_total, QuotaRatios::from(p), ProportionalSampler::new(p.seed))
    }

    pub fn allocate<'a>(&self, strata: &Strata<'a>) -> Allocation<'a> {
        let n = self.target_total;
        let remaining = strata.remaining_needed(n);
        let quotas = initial_quotas(remaining, self.ratios);
        info!(
            target = n,
            must_include = strata.must_include_count(),
            remaining,
            neg_ssti = quotas.neg_ssti,
            neg_blood = quotas.neg_blood,
            mssa = quotas.mssa,
            "initial quotas"
        );
        if remaining < 0 {
            warn!(must_include = strata.must_include_count(), target = n, "must-include set exceeds target");
        }

        // Primary draws.
        let mut ssti_need = quotas.neg_ssti;
        let mut blood_need = quotas.neg_blood;
        let mut ssti = self.sampler.sample(&strata.neg_ssti, ssti_need as i64);
        let mut blood = self.sampler.sample(&strata.neg_blood, blood_need as i64);
        let ssti_found = len_u32(&ssti);
        let blood_found = len_u32(&blood);
        info!(ssti_found, blood_found, "primary draws");

        // Cross-completion, one direction at most.
        let mut completion = CompletionEvent::None;
        let mut ssti_before = None;
        let mut blood_before = None;
        if ssti_found < ssti_need && blood_found >= blood_need {
            let deficit = ssti_need - ssti_found;
            blood_before = Some(blood_need);
            blood_need += deficit;
            blood = self.sampler.sample(&strata.neg_blood, blood_need as i64);
            completion = CompletionEvent::BloodAbsorbedSsti { deficit };
            warn!(deficit, new_quota = blood_need, drawn = blood.len(), "blood absorbs SSTI shortfall");
        } else if blood_found < blood_need && ssti_found >= ssti_need {
            let deficit = blood_need - blood_found;
            ssti_before = Some(ssti_need);
            ssti_need += deficit;
            ssti = self.sampler.sample(&strata.neg_ssti, ssti_need as i64);
            completion = CompletionEvent::SstiAbsorbedBlood { deficit };
            warn!(deficit, new_quota = ssti_need, drawn = ssti.len(), "SSTI absorbs blood shortfall");
        }

        // Ceiling quotas may overshoot the remaining budget.
        let budget = usize::try_from(remaining.max(0)).unwrap_or(usize::MAX);
        let mut trimmed = 0u32;
        while ssti.len() + blood.len() > budget {
            if blood.pop().is_none() {
                ssti.pop();
            }
            trimmed += 1;
        }
        if trimmed > 0 {
            info!(trimmed, "trimmed overshoot of ceiling quotas");
        }

        // MSSA fallback.
        let so_far = strata.must_include_count() + ssti.len() + blood.len();
        let mut mssa_pos = Vec::new();
        let mut mssa_neg = Vec::new();
        let mut mssa_before = None;
        let mut mssa_actual = 0u32;
        if so_far < n as usize {
            mssa_actual = n - so_far as u32;
            mssa_before = Some(quotas.mssa);
            mssa_pos = self.sampler.sample(&strata.mssa_pos, mssa_actual as i64);
            let rest = mssa_actual - len_u32(&mssa_pos);
            mssa_neg = self.sampler.sample(&strata.mssa_neg, rest as i64);
            info!(
                quota = quotas.mssa,
                actual = mssa_actual,
                pvl_positive = mssa_pos.len(),
                pvl_negative = mssa_neg.len(),
                "MSSA fallback"
            );
        }

        let mssa_final = len_u32(&mssa_pos) + len_u32(&mssa_neg);
        let plan = QuotaPlan {
            mssa: match mssa_before {
                Some(needed) => {
                    let found = needed.min(mssa_final);
                    CategoryQuota { needed, found, added: mssa_final - found }
                }
                None => CategoryQuota { needed: quotas.mssa, found: mssa_final, added: 0 },
            },
            neg_ssti: annotate(ssti_need, ssti_before, ssti_found, len_u32(&ssti)),
            neg_blood: annotate(blood_need, blood_before, blood_found, len_u32(&blood)),
        };

        let alloc = Allocation {
            target_total: n,
            remaining_needed: remaining,
            quotas,
            must_include: strata.must_include.clone(),
            neg_ssti: ssti,
            neg_blood: blood,
            mssa_pos,
            mssa_neg,
            completion,
            neg_ssti_need_before_completion: ssti_before,
            neg_blood_need_before_completion: blood_before,
            mssa_need_before_completion: mssa_before,
            mssa_need_actual: mssa_actual,
            trimmed,
            plan,
        };

        let shortfall = alloc.shortfall();
        if shortfall > 0 {
            warn!(shortfall, selected = alloc.selected_len(), target = n, "irrecoverable shortfall");
        } else {
            info!(selected = alloc.selected_len(), "selection complete");
        }
        alloc
    }
}

/// Receiver of a completion: found = primary draw, added = the rest.
/// Otherwise found = final count and added = 0.
fn annotate(quota: u32, before: Option<u32>, primary_found: u32, final_len: u32) -> CategoryQuota {
    match before {
        Some(needed) => {
            let found = primary_found.min(final_len);
            CategoryQuota { needed, found, added: final_len - found }
        }
        None => CategoryQuota { needed: quota, found: final_len, added: 0 },
    }
}

#[inline]
fn len_u32<T>(v: &[T]) -> u32 {
    u32::try_from(v.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stratify::stratify;
    use fz_core::{Classifier, Record, RowId};
    use std::collections::BTreeSet;

    struct Table(Vec<Record>);

    impl Table {
        fn new() -> Self {
            Table(Vec::new())
        }
        fn add(&mut self, n: usize, specimen: &str, mrsa: bool, pvl: &str, origin: &str) -> &mut Self {
            for _ in 0..n {
                let row = RowId(self.0.len());
                let mec = if mrsa { "Positive" } else { "Negative" };
                self.0.push(Record::from_cells(row, specimen, mec, "", pvl, origin, vec![]));
            }
            self
        }
    }

    fn run(t: &Table, target: u32) -> Allocation<'_> {
        let classified = Classifier::default().classify_all(&t.0);
        let strata = stratify(&classified);
        QuotaAllocator::new(target, QuotaRatios::default(), ProportionalSampler::default()).allocate(&strata)
    }

    fn distinct_rows(a: &Allocation<'_>) -> usize {
        a.selection().iter().map(|r| r.row()).collect::<BTreeSet<_>>().len()
    }

    #[test]
    fn quotas_for_remaining_25() {
        let q = initial_quotas(25, QuotaRatios::default());
        assert_eq!(q, InitialQuotas { neg_ssti: 13, neg_blood: 7, mssa: 7 });
        assert_eq!(initial_quotas(-3, QuotaRatios::default()), InitialQuotas::default());
    }

    #[test]
    fn ssti_absorbs_blood_shortfall() {
        // 100 records: 5 must-include, 4 neg Blood, 40 neg SSTI, 51 MSSA.
        let mut t = Table::new();
        t.add(5, "Wound", true, "Positive", "A")
            .add(4, "Blood", true, "Negative", "B")
            .add(25, "Wound", true, "Negative", "A")
            .add(15, "Skin", true, "Negative", "C")
            .add(30, "Abscess", false, "Positive", "A")
            .add(21, "Blood", false, "Negative", "D");
        assert_eq!(t.0.len(), 100);

        let a = run(&t, 30);
        assert_eq!(a.remaining_needed, 25);
        assert_eq!(a.quotas, InitialQuotas { neg_ssti: 13, neg_blood: 7, mssa: 7 });
        assert_eq!(a.completion, CompletionEvent::SstiAbsorbedBlood { deficit: 3 });
        assert_eq!(a.neg_ssti.len(), 16);
        assert_eq!(a.neg_blood.len(), 4);
        assert_eq!(a.plan.neg_ssti, CategoryQuota { needed: 13, found: 13, added: 3 });
        assert_eq!(a.plan.neg_blood, CategoryQuota { needed: 7, found: 4, added: 0 });
        assert_eq!(a.mssa_need_actual, 5);
        assert_eq!(a.plan.mssa, CategoryQuota { needed: 7, found: 5, added: 0 });
        assert_eq!(a.selected_len(), 30);
        assert_eq!(distinct_rows(&a), 30);
        assert_eq!(a.shortfall(), 0);
        assert_eq!(a.completion_boundary(Category::MrsaPvlNegSsti), Some(13));
        assert_eq!(a.completion_boundary(Category::MrsaPvlNegBlood), None);
    }

    #[test]
    fn blood_absorbs_ssti_shortfall() {
        let mut t = Table::new();
        t.add(2, "Wound", true, "Positive", "A")
            .add(3, "Wound", true, "Negative", "A")
            .add(20, "Blood", true, "Negative", "B")
            .add(10, "Wound", false, "Negative", "C");
        // N=20 → remaining 18 → quotas {9, 5, 5}
        let a = run(&t, 20);
        assert_eq!(a.completion, CompletionEvent::BloodAbsorbedSsti { deficit: 6 });
        assert_eq!(a.neg_blood.len(), 11);
        assert_eq!(a.plan.neg_blood, CategoryQuota { needed: 5, found: 5, added: 6 });
        assert_eq!(a.plan.neg_ssti, CategoryQuota { needed: 9, found: 3, added: 0 });
        assert_eq!(a.selected_len(), 20);
    }

    #[test]
    fn rounding_short_ssti_draw_triggers_blood_completion() {
        // N=8 → quotas {4, 2, 2}. Three equal originators round to 1 each: SSTI finds 3.
        let mut t = Table::new();
        t.add(4, "Wound", true, "Negative", "A")
            .add(4, "Wound", true, "Negative", "B")
            .add(4, "Wound", true, "Negative", "C")
            .add(10, "Blood", true, "Negative", "D");
        let a = run(&t, 8);
        assert_eq!(a.quotas, InitialQuotas { neg_ssti: 4, neg_blood: 2, mssa: 2 });
        assert_eq!(a.completion, CompletionEvent::BloodAbsorbedSsti { deficit: 1 });
        assert_eq!(a.neg_ssti.len(), 3);
        assert_eq!(a.neg_blood.len(), 3);
        assert_eq!(a.plan.neg_ssti, CategoryQuota { needed: 4, found: 3, added: 0 });
        assert_eq!(a.plan.neg_blood, CategoryQuota { needed: 2, found: 2, added: 1 });
        // No MSSA records to fall back on.
        assert_eq!(a.selected_len(), 6);
        assert_eq!(a.shortfall(), 2);
    }

    #[test]
    fn both_short_no_completion_and_shortfall_reported() {
        let mut t = Table::new();
        t.add(1, "Wound", true, "Positive", "A")
            .add(2, "Wound", true, "Negative", "A")
            .add(1, "Blood", true, "Negative", "B");
        let a = run(&t, 30);
        assert_eq!(a.completion, CompletionEvent::None);
        assert!(a.mssa_fallback());
        assert_eq!(a.plan.mssa, CategoryQuota { needed: 8, found: 0, added: 0 });
        assert_eq!(a.selected_len(), 4);
        assert_eq!(a.shortfall(), 26);
    }

    #[test]
    fn empty_pool_annotates_zero_found() {
        let mut t = Table::new();
        t.add(20, "Wound", true, "Negative", "A")
            .add(20, "Wound", false, "Positive", "A");
        // No Blood at all: remaining 10 → {5, 3, 3}; SSTI absorbs 3.
        let a = run(&t, 10);
        assert_eq!(a.plan.neg_blood, CategoryQuota { needed: 3, found: 0, added: 0 });
        assert_eq!(a.plan.neg_ssti, CategoryQuota { needed: 5, found: 5, added: 3 });
        assert_eq!(a.selected_len(), 10);
    }

    #[test]
    fn mssa_positive_before_negative() {
        let mut t = Table::new();
        t.add(3, "Wound", false, "Positive", "A")
            .add(10, "Wound", false, "Negative", "A");
        let a = run(&t, 8);
        assert_eq!(a.mssa_pos.len(), 3);
        assert_eq!(a.mssa_neg.len(), 5);
        // needed 2, final 8 → found 2, added 6
        assert_eq!(a.plan.mssa, CategoryQuota { needed: 2, found: 2, added: 6 });
        assert_eq!(a.completion_boundary(Category::Mssa), Some(2));
    }

    #[test]
    fn must_include_over_target_is_kept_whole() {
        let mut t = Table::new();
        t.add(6, "Blood", true, "Positive", "A")
            .add(5, "Wound", true, "Negative", "A")
            .add(5, "Wound", false, "Negative", "A");
        let a = run(&t, 4);
        assert!(a.must_include_exceeds_target());
        assert_eq!(a.quotas, InitialQuotas::default());
        assert_eq!(a.selected_len(), 6);
        assert_eq!(a.shortfall(), 0);
        assert!(!a.mssa_fallback());
        assert_eq!(a.section(Category::MrsaPvlPosBlood).len(), 6);
    }

    #[test]
    fn overshoot_is_trimmed_at_remaining_one() {
        let mut t = Table::new();
        t.add(2, "Wound", true, "Positive", "A")
            .add(5, "Wound", true, "Negative", "A")
            .add(5, "Blood", true, "Negative", "B");
        let a = run(&t, 3);
        assert_eq!(a.quotas, InitialQuotas { neg_ssti: 1, neg_blood: 1, mssa: 1 });
        assert_eq!(a.trimmed, 1);
        assert_eq!(a.neg_blood.len(), 0);
        assert_eq!(a.neg_ssti.len(), 1);
        assert_eq!(a.selected_len(), 3);
        assert_eq!(a.plan.neg_blood, CategoryQuota { needed: 1, found: 0, added: 0 });
    }

    #[test]
    fn deterministic_across_runs() {
        let mut t = Table::new();
        t.add(3, "Wound", true, "Positive", "A")
            .add(12, "Wound", true, "Negative", "A")
            .add(7, "Skin", true, "Negative", "B")
            .add(9, "Blood", true, "Negative", "C")
            .add(30, "Blood", false, "Positive", "D")
            .add(11, "Ear", false, "Negative", "E");
        let a = run(&t, 25);
        let b = run(&t, 25);
        let rows = |x: &Allocation<'_>| x.selection().iter().map(|r| r.row()).collect::<Vec<_>>();
        assert_eq!(rows(&a), rows(&b));
        assert_eq!(a.plan, b.plan);
    }
}
