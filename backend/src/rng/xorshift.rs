//! xorshift64* random number generator
//!
//! Same seed → same sequence, so a scenario replays identically: same
//! household ages, same deaths, same job matches, same loan request order.

use serde::{Deserialize, Serialize};

/// Seeded xorshift64* generator
///
/// # Example
/// ```
/// use econosim_core_rs::RngManager;
///
/// let mut rng = RngManager::new(123);
/// let age = rng.range_inclusive(20, 65);
/// assert!((20..=65).contains(&age));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a generator from a seed (zero is remapped, xorshift needs a nonzero state)
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Next raw 64-bit value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform f64 in [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform integer in [min, max]; returns `min` when the range is empty
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = u64::from(max - min) + 1;
        min + (self.next_u64() % span) as u32
    }

    /// Bernoulli draw with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        self.next_f64() < p.min(1.0)
    }

    /// Fisher-Yates shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }

    /// Current internal state (checkpointing)
    pub fn state(&self) -> u64 {
        self.state
    }
}
