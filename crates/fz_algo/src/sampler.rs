//! Proportional sampler: draw `count` records from a pool, spread across a
//! grouping field proportionally to each group's frequency.
//!
//! Contract:
//! - `count <= 0` or an empty pool → empty result; the pool is not inspected.
//! - Groups are visited by descending frequency; ties keep first appearance.
//! - Group target = max(1, round_half_even(size × count / |pool|)), capped at size.
//! - Draws are concatenated in group order and truncated to `count`.
//! - Rounding may leave the result below `count` even when the pool is larger;
//!   the allocator reads that as a shortfall.
//! - |result| ≤ count, no record twice, every record comes from the pool.
//!
//! Determinism:
//! - Each group is shuffled by a forward Fisher–Yates on a `SampleRng` restarted
//!   from the same seed, so a draw of k is a prefix of a draw of k' > k from the
//!   same group and results never depend on call order.
//! - Integer math only.

use std::collections::BTreeMap;

use fz_core::rng::SampleRng;
use fz_core::rounding::round_half_even;
use fz_core::ClassifiedRecord;
use tracing::debug;

/// Field the sampler spreads draws across.
pub trait GroupKey {
    fn group_key(&self) -> &str;
}

impl<'a> GroupKey for ClassifiedRecord<'a> {
    #[inline]
    fn group_key(&self) -> &str {
        self.originator()
    }
}

/// Split `pool` into groups ordered by descending size, ties by first appearance.
/// Each group keeps pool order.
pub fn group_in_frequency_order<T: GroupKey + Copy>(pool: &[T]) -> Vec<Vec<T>> {
    let mut slot: BTreeMap<&str, usize> = BTreeMap::new();
    let mut groups: Vec<Vec<T>> = Vec::new();
    for item in pool {
        let idx = *slot.entry(item.group_key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(*item);
    }
    // stable sort keeps first-appearance order among equal sizes
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups
}

/// Per-group draw sizes for `count` records out of `total`.
/// No non-empty group is assigned 0.
pub fn proportional_targets(sizes: &[usize], total: usize, count: u64) -> Vec<usize> {
    if total == 0 {
        return vec![0; sizes.len()];
    }
    sizes
        .iter()
        .map(|&size| {
            if size == 0 {
                return 0;
            }
            let share = round_half_even(size as u128 * count as u128, total as u128);
            let want = usize::try_from(share).unwrap_or(usize::MAX).max(1);
            want.min(size)
        })
        .collect()
}

/// Stateless between calls; the seed is the only configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProportionalSampler {
    seed: u64,
}

impl Default for ProportionalSampler {
    fn default() -> Self {
        Self::new(fz_core::params::DEFAULT_SEED)
    }
}

impl ProportionalSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sample<T: GroupKey + Copy>(&self, pool: &[T], count: i64) -> Vec<T> {
        if count <= 0 || pool.is_empty() {
            return Vec::new();
        }
        let count = usize::try_from(count).unwrap_or(usize::MAX);

        let mut groups = group_in_frequency_order(pool);
        let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        let targets = proportional_targets(&sizes, pool.len(), count as u64);

        for group in groups.iter_mut() {
            let mut rng = SampleRng::from_seed_u64(self.seed);
            rng.shuffle_in_place(group);
        }

        let mut out: Vec<T> = Vec::with_capacity(count.min(pool.len()));
        for (group, &take) in groups.iter().zip(&targets) {
            debug!(group = group[0].group_key(), size = group.len(), take, "group draw");
            out.extend_from_slice(&group[..take]);
        }
        out.truncate(count);
        out
    }
}
