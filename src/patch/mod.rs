//! The per-block parameter snapshot a voice renders from.
//!
//! The parameter layer resolves host values into one of these at each block
//! boundary and hands it to [`AnalogVoice::render_block`]. Nothing in here is
//! re-validated: ranges are the parameter layer's job.
//!
//! [`AnalogVoice::render_block`]: crate::synth::voice::AnalogVoice::render_block

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use crate::dsp::oscillator::{OscillatorParams, Waveform};

/// Stage times are exponential time constants in seconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeParams {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self::adsr(0.01, 0.1, 0.5, 0.2)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Base cutoff in Hz before envelope modulation.
    pub cutoff_hz: f32,
    /// 0..1.2; self-oscillates near 1.
    pub resonance: f32,
    /// Input drive 0..1.
    pub drive: f32,
    /// Filter envelope depth in octaves.
    pub env_amount: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff_hz: 1_000.0,
            resonance: 0.5,
            drive: 0.2,
            env_amount: 0.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub osc_a: OscillatorParams,
    pub osc_b: OscillatorParams,
    /// Block-constant pulse-width offsets for each oscillator.
    pub pwm_mod_a: f32,
    pub pwm_mod_b: f32,
    pub amp_env: EnvelopeParams,
    pub filter_env: EnvelopeParams,
    pub filter: FilterParams,
    pub mix_a: f32,
    pub mix_b: f32,
    /// Oscillator B detune in cents.
    pub detune_b: f32,
    /// Hz of oscillator B frequency per unit of oscillator A output.
    pub fm_ab: f32,
    /// Hz of oscillator A frequency per unit of oscillator B output.
    pub fm_ba: f32,
    /// Master output gain.
    pub amp: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            osc_a: OscillatorParams::default(),
            osc_b: OscillatorParams::default(),
            pwm_mod_a: 0.0,
            pwm_mod_b: 0.0,
            amp_env: EnvelopeParams::default(),
            filter_env: EnvelopeParams::default(),
            filter: FilterParams::default(),
            mix_a: 0.5,
            mix_b: 0.5,
            detune_b: 0.0,
            fm_ab: 0.0,
            fm_ba: 0.0,
            amp: 0.8,
        }
    }
}

impl VoiceParams {
    /// Same settings for both oscillators, with independent waveforms.
    pub fn with_oscillators(osc: OscillatorParams, wave_a: Waveform, wave_b: Waveform) -> Self {
        Self {
            osc_a: OscillatorParams {
                waveform: wave_a,
                ..osc
            },
            osc_b: OscillatorParams {
                waveform: wave_b,
                ..osc
            },
            ..Self::default()
        }
    }
}
