//! Deterministic pseudo-random source for the analog imperfection models.

/*
Linear Congruential Generator
=============================

Every stochastic effect in an oscillator (drift, jitter, hum phases, the
noise floor) draws from one of these. Each oscillator owns its own instance,
seeded at construction, so two oscillators running the same algorithm still
behave like two different pieces of hardware and every render is
reproducible from the seeds alone.

    state = 1664525 * state + 1013904223   (mod 2^32)
    value = top 24 bits of state / 2^24     -> [0, 1)

Only the top 24 bits are used: they fit an f32 mantissa exactly and the low
bits of an LCG have short periods.
*/

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;
const DEFAULT_SEED: u32 = 22_222;

#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.state = MULTIPLIER.wrapping_mul(self.state).wrapping_add(INCREMENT);
        (self.state >> 8) as f32 / 16_777_216.0
    }

    /// Uniform value in `[-1, 1)`.
    #[inline]
    pub fn bipolar(&mut self) -> f32 {
        self.next() * 2.0 - 1.0
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
