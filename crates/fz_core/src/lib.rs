//! fz_core: Core types, parameters, classification, and deterministic sampling RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! workspace (`fz_io`, `fz_algo`, `fz_pipeline`, `fz_report`, `fz_cli`).
//!
//! - Typed specimen rows: `Record` (+ passthrough cells) and `ClassifiedRecord`
//! - Derived domains: `ResultCall`, `PvlStatus`, `SpecimenClass`, `Category`
//! - Selection parameters with safe defaults: `SelectionParams`, `Pct`, `ColumnMap`
//! - Integer-first quota helpers (ceil shares, half-even rounding)
//! - Seedable RNG (ChaCha20) for sampling draws only

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        PctOutOfRange(u16),
        RatioSum(u16),
        ZeroTarget,
        EmptyColumnName(&'static str),
        EmptySiteList,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::PctOutOfRange(v) => write!(f, "percentage out of range: {v}"),
                CoreError::RatioSum(s) => write!(f, "quota percentages must sum to 100 (got {s})"),
                CoreError::ZeroTarget => write!(f, "target total must be at least 1"),
                CoreError::EmptyColumnName(k) => write!(f, "empty column name: {k}"),
                CoreError::EmptySiteList => write!(f, "SSTI site list is empty"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod rounding {
    //! Integer-only share helpers. No floats anywhere in quota arithmetic.

    /// `ceil(n * pct / 100)` for a non-negative `n`; negative `n` clamps to 0.
    #[inline]
    pub fn ceil_pct(n: i64, pct: u8) -> u32 {
        if n <= 0 || pct == 0 {
            return 0;
        }
        let num = (n as u128) * (pct as u128);
        let q = num.div_ceil(100);
        u32::try_from(q).unwrap_or(u32::MAX)
    }

    /// Round `num / den` to the nearest integer, ties to even (`den > 0`).
    ///
    /// Exact counterpart of rounding a float share `num/den` half-to-even,
    /// without the float.
    #[inline]
    pub fn round_half_even(num: u128, den: u128) -> u128 {
        debug_assert!(den > 0, "denominator must be positive");
        let q = num / den;
        let r = num % den;
        match (2 * r).cmp(&den) {
            core::cmp::Ordering::Less => q,
            core::cmp::Ordering::Greater => q + 1,
            core::cmp::Ordering::Equal => {
                if q % 2 == 0 { q } else { q + 1 }
            }
        }
    }
}

pub mod category;
pub mod classify;
pub mod params;
pub mod record;
pub mod rng;

pub use category::{Category, PvlStatus, ResultCall, SpecimenClass};
pub use classify::{ClassifiedRecord, Classifier};
pub use params::{ColumnMap, Pct, SelectionParams};
pub use record::{Record, RowId};
