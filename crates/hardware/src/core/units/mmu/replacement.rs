//! TLB Victim Selection.
//!
//! When every TLB slot is occupied, a fill evicts a pseudo-randomly chosen entry. The
//! generator is a 64-bit xorshift seeded from configuration, so the eviction order is
//! reproducible for a given seed.

/// Seed used when the configured seed is zero (xorshift has a zero fixed point).
const FALLBACK_SEED: u64 = 123_456_789;

/// Deterministic pseudo-random victim picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomVictim {
    state: u64,
}

impl RandomVictim {
    /// Creates a picker with the given seed.
    pub const fn new(seed: u64) -> Self {
        Self { state: if seed == 0 { FALLBACK_SEED } else { seed } }
    }

    /// Picks a victim index in `0..slots`.
    ///
    /// # Arguments
    ///
    /// * `slots` - Number of candidate slots; must be non-zero.
    pub fn pick(&mut self, slots: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % slots.max(1) as u64) as usize
    }
}
