//! crates/fz_core/src/classify.rs
//! Classifier: derives `SpecimenClass` and `ResultCall` from raw fields.
//!
//! Contract:
//! - Exact (case-sensitive) match against the SSTI site allow-list → SSTI.
//! - Exact "Blood" → Blood. Everything else → Other.
//! - MRSA iff mecA or mecC reads "Positive".
//! - Pure; the record is borrowed, never modified.

use std::collections::BTreeSet;

use crate::category::{Category, PvlStatus, ResultCall, SpecimenClass};
use crate::record::{Record, RowId};

/// Body sites reported as skin/soft-tissue infections.
pub const DEFAULT_SSTI_SITES: &[&str] = &[
    "Wound", "Abscess", "Surgery wound", "Skin", "Skin ulcer", "Ear",
    "Ear L", "Ear R", "Elbow", "Elbow L", "Elbow R", "Nose",
    "Lesion", "Eye", "Nasal wash", "Navel", "Perineum",
];

#[derive(Clone, Debug)]
pub struct Classifier {
    ssti_sites: BTreeSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_SSTI_SITES.iter().copied())
    }
}

impl Classifier {
    pub fn new<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { ssti_sites: sites.into_iter().map(Into::into).collect() }
    }

    pub fn specimen_class(&self, specimen: &str) -> SpecimenClass {
        if self.ssti_sites.contains(specimen) {
            SpecimenClass::Ssti
        } else if specimen == SpecimenClass::BLOOD {
            SpecimenClass::Blood
        } else {
            SpecimenClass::Other
        }
    }

    pub fn result_call(&self, r: &Record) -> ResultCall {
        if r.mec_a_positive || r.mec_c_positive { ResultCall::Mrsa } else { ResultCall::Mssa }
    }

    pub fn classify<'a>(&self, r: &'a Record) -> ClassifiedRecord<'a> {
        ClassifiedRecord {
            record: r,
            specimen_class: self.specimen_class(&r.specimen),
            result_call: self.result_call(r),
        }
    }

    pub fn classify_all<'a>(&self, records: &'a [Record]) -> Vec<ClassifiedRecord<'a>> {
        records.iter().map(|r| self.classify(r)).collect()
    }
}

/// Working copy of a record with its derived fields. Cheap to copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifiedRecord<'a> {
    pub record: &'a Record,
    pub specimen_class: SpecimenClass,
    pub result_call: ResultCall,
}

impl<'a> ClassifiedRecord<'a> {
    #[inline]
    pub fn row(&self) -> RowId { self.record.row }

    #[inline]
    pub fn originator(&self) -> &'a str { &self.record.originator }

    #[inline]
    pub fn pvl(&self) -> Option<PvlStatus> { self.record.pvl }

    #[inline]
    pub fn category(&self) -> Option<Category> {
        Category::of(self.result_call, self.record.pvl, self.specimen_class)
    }
}
