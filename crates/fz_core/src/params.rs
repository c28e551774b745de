//! crates/fz_core/src/params.rs
//! Selection parameters with safe defaults, plus domain validation.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid
//! parameter file. The CLI may override `target_total` and `seed`.

use serde::de::{Error as DeError, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use crate::classify::{Classifier, DEFAULT_SSTI_SITES};
use crate::errors::CoreError;

/// Default target sample size.
pub const DEFAULT_TARGET_TOTAL: u32 = 30;
/// Default sampling seed.
pub const DEFAULT_SEED: u64 = 42;

/// ------------ Newtypes with invariants (validated on de/ser) ------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pct(u8); // 0..=100

impl Pct {
    pub fn new(v: u8) -> Result<Self, CoreError> {
        if v <= 100 { Ok(Self(v)) } else { Err(CoreError::PctOutOfRange(v as u16)) }
    }
    pub fn as_u8(self) -> u8 { self.0 }
}

impl<'de> Deserialize<'de> for Pct {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = u8::deserialize(d)?;
        if v <= 100 { Ok(Pct(v)) }
        else { Err(D::Error::invalid_value(Unexpected::Unsigned(v as u64), &"0..=100")) }
    }
}

/// ------------ Column names of the input table ------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub specimen: String,
    pub originator: String,
    pub pvl: String,
    pub mec_a: String,
    pub mec_c: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            specimen: "Specimen".to_string(),
            originator: "Originator".to_string(),
            pvl: "RT-pvl Result".to_string(),
            mec_a: "RT-mecA Result".to_string(),
            mec_c: "RT-mecC Result".to_string(),
        }
    }
}

impl ColumnMap {
    /// (key, column name) pairs in a stable order.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("specimen", self.specimen.as_str()),
            ("originator", self.originator.as_str()),
            ("pvl", self.pvl.as_str()),
            ("mec_a", self.mec_a.as_str()),
            ("mec_c", self.mec_c.as_str()),
        ]
    }
}

/// ------------ Params ------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    /// Requested sample size `N`.
    pub target_total: u32,
    /// Seed shared by every sampling draw of a run.
    pub seed: u64,
    /// Share of the remaining quota for MRSA PVL-negative SSTI.
    pub ssti_pct: Pct,
    /// Share of the remaining quota for MRSA PVL-negative Blood.
    pub blood_pct: Pct,
    /// Share of the remaining quota for MSSA (before fallback).
    pub mssa_pct: Pct,
    pub columns: ColumnMap,
    pub ssti_sites: Vec<String>,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            target_total: DEFAULT_TARGET_TOTAL,
            seed: DEFAULT_SEED,
            ssti_pct: Pct(50),
            blood_pct: Pct(25),
            mssa_pct: Pct(25),
            columns: ColumnMap::default(),
            ssti_sites: DEFAULT_SSTI_SITES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SelectionParams {
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.ssti_sites.iter().cloned())
    }
}

/// Domain checks beyond what deserialization enforces.
pub fn validate_domains(p: &SelectionParams) -> Result<(), CoreError> {
    if p.target_total == 0 {
        return Err(CoreError::ZeroTarget);
    }
    let sum = p.ssti_pct.as_u8() as u16 + p.blood_pct.as_u8() as u16 + p.mssa_pct.as_u8() as u16;
    if sum != 100 {
        return Err(CoreError::RatioSum(sum));
    }
    for (key, name) in p.columns.entries() {
        if name.trim().is_empty() {
            return Err(CoreError::EmptyColumnName(key));
        }
    }
    if p.ssti_sites.is_empty() {
        return Err(CoreError::EmptySiteList);
    }
    Ok(())
}
