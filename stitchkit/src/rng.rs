//! Seedable noise source for stitch resampling.
//!
//! Generators never reach for an ambient random source; the caller passes a
//! `&mut Rng` in, so the same seed always produces the same stitches.

/// A small deterministic pseudo-random number generator.
///
/// Linear congruential generator with 64-bit state. Statistical quality is
/// more than enough for jittering stitch lengths.
///
/// # Example
/// ```
/// use stitchkit::rng::Rng;
///
/// let mut rng = Rng::new(7);
/// let jitter = rng.jitter(0.3); // in [-0.3, 0.3)
/// assert!(jitter.abs() <= 0.3);
/// ```
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a generator from a seed.
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        // High bits have the longest period in an LCG.
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[-1, 1)`.
    #[inline]
    pub fn next_signed(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }

    /// Symmetric perturbation in `[-amount, amount)`. Zero amount draws nothing.
    #[inline]
    pub fn jitter(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 {
            0.0
        } else {
            self.next_signed() * amount
        }
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(0)
    }
}
