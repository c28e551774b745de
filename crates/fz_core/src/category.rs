//! crates/fz_core/src/category.rs
//! Derived domains and the five-bucket category taxonomy.

use core::fmt;

use serde::{Deserialize, Serialize};

/// PVL toxin-gene result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum PvlStatus {
    Positive,
    Negative,
}

impl PvlStatus {
    pub const POSITIVE: &'static str = "Positive";
    pub const NEGATIVE: &'static str = "Negative";

    /// Exact cell match; anything else is "not reported".
    pub fn parse_cell(s: &str) -> Option<Self> {
        match s {
            Self::POSITIVE => Some(Self::Positive),
            Self::NEGATIVE => Some(Self::Negative),
            _ => None,
        }
    }
}

/// MRSA if either mec test is positive, else MSSA.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ResultCall {
    Mrsa,
    Mssa,
}

impl ResultCall {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultCall::Mrsa => "MRSA",
            ResultCall::Mssa => "MSSA",
        }
    }
}

impl fmt::Display for ResultCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum SpecimenClass {
    Ssti,
    Blood,
    Other,
}

impl SpecimenClass {
    pub const BLOOD: &'static str = "Blood";

    pub fn as_str(self) -> &'static str {
        match self {
            SpecimenClass::Ssti => "SSTI",
            SpecimenClass::Blood => "Blood",
            SpecimenClass::Other => "Other",
        }
    }

    /// SSTI or Blood: the only classes that take part in selection.
    #[inline]
    pub fn is_eligible(self) -> bool {
        matches!(self, SpecimenClass::Ssti | SpecimenClass::Blood)
    }
}

impl fmt::Display for SpecimenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Mutually exclusive selection buckets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Mssa,
    MrsaPvlPosSsti,
    MrsaPvlPosBlood,
    MrsaPvlNegSsti,
    MrsaPvlNegBlood,
}

impl Category {
    /// Section order of the rendered report.
    pub const REPORT_ORDER: [Category; 5] = [
        Category::Mssa,
        Category::MrsaPvlPosSsti,
        Category::MrsaPvlPosBlood,
        Category::MrsaPvlNegSsti,
        Category::MrsaPvlNegBlood,
    ];

    /// Categories whose quota can move during allocation.
    pub const ADJUSTABLE: [Category; 3] = [
        Category::Mssa,
        Category::MrsaPvlNegSsti,
        Category::MrsaPvlNegBlood,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Mssa => "MSSA",
            Category::MrsaPvlPosSsti => "MRSA PVL POSITIVE SSTI",
            Category::MrsaPvlPosBlood => "MRSA PVL POSITIVE BLOOD",
            Category::MrsaPvlNegSsti => "MRSA PVL NEGATIVE SSTI",
            Category::MrsaPvlNegBlood => "MRSA PVL NEGATIVE BLOOD",
        }
    }

    #[inline]
    pub fn is_adjustable(self) -> bool {
        !self.is_must_include()
    }

    #[inline]
    pub fn is_must_include(self) -> bool {
        matches!(self, Category::MrsaPvlPosSsti | Category::MrsaPvlPosBlood)
    }

    /// Membership by (result, pvl, class). `None` for class Other or unknown PVL.
    pub fn of(result: ResultCall, pvl: Option<PvlStatus>, class: SpecimenClass) -> Option<Category> {
        let pvl = pvl?;
        match (result, pvl, class) {
            (_, _, SpecimenClass::Other) => None,
            (ResultCall::Mssa, _, _) => Some(Category::Mssa),
            (ResultCall::Mrsa, PvlStatus::Positive, SpecimenClass::Ssti) => Some(Category::MrsaPvlPosSsti),
            (ResultCall::Mrsa, PvlStatus::Positive, SpecimenClass::Blood) => Some(Category::MrsaPvlPosBlood),
            (ResultCall::Mrsa, PvlStatus::Negative, SpecimenClass::Ssti) => Some(Category::MrsaPvlNegSsti),
            (ResultCall::Mrsa, PvlStatus::Negative, SpecimenClass::Blood) => Some(Category::MrsaPvlNegBlood),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.title()) }
}
