//! Deterministic utilities for reproducible training
//!
//! LCG-based randomness, seed derivation, integer square root and split
//! tie-breaking, so identical inputs produce identical pipelines.

use std::num::Wrapping;

/// Linear congruential generator with glibc constants.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<i64>,
}

impl LcgRng {
    const MULTIPLIER: i64 = 1103515245;
    const INCREMENT: i64 = 12345;
    const MODULUS: i64 = 1 << 31;

    pub fn new(seed: i64) -> Self {
        Self {
            state: Wrapping(seed.wrapping_abs() % Self::MODULUS),
        }
    }

    /// Next value in `[0, 2^31)`.
    pub fn next_i64(&mut self) -> i64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state.0 & (Self::MODULUS - 1)
    }

    /// Value in `[0, max)` taken from the high bits of the state.
    ///
    /// `max` must stay below 2^32.
    pub fn next_range(&mut self, max: i64) -> i64 {
        if max <= 0 {
            return 0;
        }
        (self.next_i64() * max) >> 31
    }

    /// Index in `[0, len)`.
    pub fn next_index(&mut self, len: usize) -> usize {
        self.next_range(len as i64) as usize
    }

    /// Fixed-point value uniformly drawn from `[low, high)`.
    pub fn next_between(&mut self, low: i64, high: i64) -> i64 {
        low + self.next_range(high - low)
    }

    /// In-place Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }

    /// `count` distinct indices from `0..len`, in draw order.
    pub fn sample_indices(&mut self, len: usize, count: usize) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..len).collect();
        let count = count.min(len);
        for i in 0..count {
            let j = i + self.next_index(len - i);
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool
    }

    /// `count` indices drawn with replacement from `population`.
    pub fn bootstrap(&mut self, population: &[usize], count: usize) -> Vec<usize> {
        (0..count)
            .map(|_| population[self.next_index(population.len())])
            .collect()
    }
}

/// Derive an independent child seed, e.g. one per bag or tree.
pub fn derive_seed(seed: u64, stream: u64) -> i64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;

    let mut h = seed.wrapping_add(PRIME1);
    h ^= stream.wrapping_mul(PRIME2);
    h = h.rotate_left(31).wrapping_mul(PRIME1);
    h ^= h >> 33;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 29;
    (h & (i64::MAX as u64)) as i64
}

/// Floor of the square root of a non-negative integer.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Newton iteration from an upper bound.
    let mut x = 1u128 << ((128 - n.leading_zeros()).div_ceil(2));
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Ordering for equal-gain splits: lowest (feature, threshold, node) wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold: i64,
    pub node_id: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold: i64, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            node_id,
        }
    }
}
