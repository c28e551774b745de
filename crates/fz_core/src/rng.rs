// crates/fz_core/src/rng.rs
//
// Seeded RNG for sampling draws. ChaCha20 keyed from the run seed; no OS entropy,
// no floats. Ranges are unbiased (rejection sampling) and the shuffle is a forward
// Fisher–Yates, so the first k positions never depend on how long the slice is past k.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// ChaCha20 stream keyed by a 64-bit seed (`seed.to_le_bytes()` in key bytes 0..8, rest zero).
#[derive(Debug, Clone)]
pub struct SampleRng {
    rng: ChaCha20Rng,
}

impl SampleRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut key = [0u8; 32];
        key[..8].copy_from_slice(&seed.to_le_bytes());
        Self { rng: ChaCha20Rng::from_seed(key) }
    }

    /// Uniform value in `[0, n)`; `None` for `n == 0`.
    ///
    /// Draws below `2^64 mod n` are rejected so every residue is equally likely.
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let reject_below = n.wrapping_neg() % n;
        loop {
            let x = self.rng.next_u64();
            if x >= reject_below {
                return Some(x % n);
            }
        }
    }

    /// Uniform index in `[0, n)`; `None` for `n == 0`.
    #[inline]
    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        self.gen_range(n as u64).map(|v| v as usize)
    }

    /// In-place permutation: position `i` swaps with a uniform `j ∈ [i, len)`.
    pub fn shuffle_in_place<T>(&mut self, items: &mut [T]) {
        for i in 0..items.len().saturating_sub(1) {
            if let Some(j) = self.choose_index(items.len() - i) {
                items.swap(i, i + j);
            }
        }
    }
}

impl Default for SampleRng {
    fn default() -> Self {
        Self::from_seed_u64(crate::params::DEFAULT_SEED)
    }
}
