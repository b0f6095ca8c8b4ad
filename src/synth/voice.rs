use crate::{
    config::{ConfigError, VoiceConfig},
    dsp::{envelope::Envelope, filter::LadderFilter, oscillator::AnalogOscillator},
    patch::VoiceParams,
};

/*
Voice
=====

One sounding note: two analog oscillators cross-modulating each other, a
ladder filter swept by its own envelope, and an amplitude envelope that also
decides when the note is over.

Per sample
----------

    amp_env, filt_env  advance one step
    hz_a = note_hz            + fm_ba * last_b      (clamped >= 0)
    hz_b = note_hz * detune   + fm_ab * last_a      (clamped >= 0)
    a, b = osc_a(hz_a), osc_b(hz_b)                 → become last_a, last_b
    mix  = a * mix_a + b * mix_b
    fc   = cutoff * 2^(env_amount * filt_env)       (clamped 40 Hz .. 16 kHz)
    out += filter(mix) * amp * amp_env              → every channel

The cross-modulation reads the *previous* sample of the other oscillator,
so both can modulate each other without a zero-delay loop.

Lifetime
--------

A voice is active while its amplitude envelope is not Idle. When the
envelope goes idle inside a block the voice stops writing immediately and
`render_block` reports it finished; the remaining samples are left alone.
*/

const MOD_CUTOFF_MIN_HZ: f32 = 40.0;
const MOD_CUTOFF_MAX_HZ: f32 = 16_000.0;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// What a voice pool needs from a voice.
pub trait Voice: Send {
    /// (Re)initialise for a sample rate. Must run before the first render.
    fn prepare(&mut self, sample_rate: f32, block_size_hint: usize);

    fn start_note(&mut self, note: u8, velocity: f32);

    /// With `allow_tail_off` the release runs its course, otherwise the voice
    /// goes silent at once.
    fn stop_note(&mut self, allow_tail_off: bool);

    /// Add `num_samples` samples to every channel starting at `start_sample`.
    /// Returns whether the voice is still active afterwards.
    fn render_block(
        &mut self,
        outputs: &mut [&mut [f32]],
        start_sample: usize,
        num_samples: usize,
        params: &VoiceParams,
    ) -> bool;

    fn is_active(&self) -> bool;
}

pub struct AnalogVoice {
    sample_rate: f32,
    block_size_hint: usize,
    smoothing_ms: f32,

    note: u8,
    note_hz: f32,
    last_a: f32,
    last_b: f32,

    osc_a: AnalogOscillator,
    osc_b: AnalogOscillator,
    amp_env: Envelope,
    filter_env: Envelope,
    filter: LadderFilter,
}

impl AnalogVoice {
    /// Build a voice whose oscillators are seeded with `seed_a` / `seed_b`.
    /// Call [`Voice::prepare`] before rendering.
    pub fn new(seed_a: u32, seed_b: u32) -> Self {
        Self {
            sample_rate: 44_100.0,
            block_size_hint: 512,
            smoothing_ms: 5.0,
            note: 0,
            note_hz: 0.0,
            last_a: 0.0,
            last_b: 0.0,
            osc_a: AnalogOscillator::new(seed_a),
            osc_b: AnalogOscillator::new(seed_b),
            amp_env: Envelope::new(),
            filter_env: Envelope::new(),
            filter: LadderFilter::new(),
        }
    }

    /// Validate the config, build the voice and prepare it.
    pub fn from_config(config: &VoiceConfig) -> Result<Self, ConfigError> {
        config.validate().inspect_err(|err| {
            log::warn!("rejected voice config: {err}");
        })?;

        let mut voice = Self::new(config.seed_a, config.seed_b);
        voice.smoothing_ms = config.filter_smoothing_ms;
        voice.prepare(config.sample_rate, config.block_size_hint);
        Ok(voice)
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn note_hz(&self) -> f32 {
        self.note_hz
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size_hint(&self) -> usize {
        self.block_size_hint
    }

    /// Current amplitude envelope value including velocity.
    pub fn envelope_level(&self) -> f32 {
        self.amp_env.level() * self.amp_env.velocity()
    }

    pub fn amp_envelope(&self) -> &Envelope {
        &self.amp_env
    }

    pub fn filter_envelope(&self) -> &Envelope {
        &self.filter_env
    }

    pub fn filter(&self) -> &LadderFilter {
        &self.filter
    }

    pub fn oscillators(&self) -> (&AnalogOscillator, &AnalogOscillator) {
        (&self.osc_a, &self.osc_b)
    }
}

impl Voice for AnalogVoice {
    fn prepare(&mut self, sample_rate: f32, block_size_hint: usize) {
        self.sample_rate = sample_rate;
        self.block_size_hint = block_size_hint;
        self.osc_a.prepare(sample_rate);
        self.osc_b.prepare(sample_rate);
        self.filter.prepare(sample_rate, self.smoothing_ms);
        log::debug!(
            "voice prepared: {sample_rate} Hz, block hint {block_size_hint}, smoothing {} ms",
            self.smoothing_ms
        );
    }

    fn start_note(&mut self, note: u8, velocity: f32) {
        self.note = note;
        self.note_hz = midi_note_to_freq(note);
        // oscillators keep their phase and drift
        self.amp_env.note_on(velocity);
        self.filter_env.note_on(1.0);
    }

    fn stop_note(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            self.amp_env.note_off();
            self.filter_env.note_off();
        } else {
            self.amp_env.reset();
            self.filter_env.reset();
        }
    }

    fn render_block(
        &mut self,
        outputs: &mut [&mut [f32]],
        start_sample: usize,
        num_samples: usize,
        p: &VoiceParams,
    ) -> bool {
        if !self.is_active() {
            return false;
        }

        let shortest = outputs.iter().map(|ch| ch.len()).min().unwrap_or(0);
        let end = start_sample.saturating_add(num_samples).min(shortest);

        self.amp_env
            .set(p.amp_env.attack, p.amp_env.decay, p.amp_env.sustain, p.amp_env.release);
        self.filter_env.set(
            p.filter_env.attack,
            p.filter_env.decay,
            p.filter_env.sustain,
            p.filter_env.release,
        );
        let detune = (p.detune_b / 1200.0).exp2();
        let sr = self.sample_rate;

        for i in start_sample..end {
            let amp_level = self.amp_env.next_sample(sr);
            let filter_level = self.filter_env.next_sample(sr);

            let hz_a = (self.note_hz + p.fm_ba * self.last_b).max(0.0);
            let hz_b = (self.note_hz * detune + p.fm_ab * self.last_a).max(0.0);

            let a = self.osc_a.process(hz_a, p.pwm_mod_a, &p.osc_a);
            let b = self.osc_b.process(hz_b, p.pwm_mod_b, &p.osc_b);
            self.last_a = a;
            self.last_b = b;

            let mix = a * p.mix_a + b * p.mix_b;

            let cutoff = (p.filter.cutoff_hz * (p.filter.env_amount * filter_level).exp2())
                .clamp(MOD_CUTOFF_MIN_HZ, MOD_CUTOFF_MAX_HZ);
            self.filter.set_cutoff_hz(cutoff, p.filter.resonance, p.filter.drive);
            let y = self.filter.process_sample(mix);

            let out = y * p.amp * amp_level;
            for channel in outputs.iter_mut() {
                channel[i] += out;
            }

            if !self.amp_env.is_active() {
                return false;
            }
        }

        true
    }

    fn is_active(&self) -> bool {
        self.amp_env.is_active()
    }
}
