//! Low-level DSP primitives the voice is built from.
//!
//! Everything here is allocation-free and realtime-safe once constructed, so
//! it can live directly inside a voice struct and run on the audio thread.

/// Attack/decay/sustain/release envelope with exponential segments.
pub mod envelope;
/// Nonlinear zero-delay-feedback four-pole ladder.
pub mod filter;
/// Pink and brown noise shaped from a white source.
pub mod noise;
/// Band-limited oscillator with analog drift and drive.
pub mod oscillator;
/// Seeded pseudo-random source.
pub mod random;
/// Small shared building blocks: PolyBLEP, ADAA tanh, DC blocker, smoother.
pub mod shaping;

pub use envelope::EnvelopeState;
pub use oscillator::Waveform;
