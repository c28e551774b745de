// crates/fz_algo/src/lib.rs
#![forbid(unsafe_code)]

// ----------------------------- Stratification ---------------------------------------

pub mod stratify;

pub use stratify::{stratify, Strata};

// ----------------------------- Sampling (public surface) ----------------------------

pub mod sampler;

pub use sampler::{group_in_frequency_order, proportional_targets, GroupKey, ProportionalSampler};

// ----------------------------- Allocation (public surface) --------------------------

pub mod allocator;

pub use allocator::{
    initial_quotas, Allocation, CategoryQuota, CompletionEvent, InitialQuotas, QuotaAllocator,
    QuotaPlan, QuotaRatios,
};
