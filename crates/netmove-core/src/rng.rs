//! Deterministic random number generator
//!
//! xorshift64, so a seed reproduces the same sequence on every platform.
//! Used to drive network-condition emulation in tests and demos; the
//! movement step itself never draws random numbers.

/// A seeded xorshift64 generator
#[derive(Debug, Clone)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires a non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a value in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        // 53 high bits map exactly onto the f64 mantissa
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a value in [0, bound], 0 if bound is 0
    pub fn up_to(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound.saturating_add(1)
    }

    /// True with the given probability
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(12345)
    }
}
