//! Benchmarks for a complete voice.
//!
//! Two oscillators, both envelopes and the ladder, rendered the way a host
//! would call them.

use std::hint::black_box;

use analog_voice::{
    dsp::oscillator::{OscillatorParams, Waveform},
    patch::{EnvelopeParams, FilterParams, VoiceParams},
    synth::{AnalogVoice, Voice},
};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    // Sustained pad: never releases during the benchmark
    let pad = VoiceParams {
        amp_env: EnvelopeParams::adsr(0.05, 0.3, 0.8, 0.5),
        detune_b: 7.0,
        ..VoiceParams::with_oscillators(OscillatorParams::default(), Waveform::Saw, Waveform::Saw)
    };

    // === ACID BASS ===
    // resonant ladder swept by its envelope, cross-modulated oscillators
    let acid = VoiceParams {
        filter: FilterParams {
            cutoff_hz: 300.0,
            resonance: 1.0,
            drive: 0.8,
            env_amount: 4.0,
        },
        filter_env: EnvelopeParams::adsr(0.002, 0.15, 0.2, 0.1),
        amp_env: EnvelopeParams::adsr(0.002, 0.2, 0.9, 0.1),
        fm_ab: 60.0,
        fm_ba: 30.0,
        ..VoiceParams::with_oscillators(
            OscillatorParams::default(),
            Waveform::Square,
            Waveform::Saw,
        )
    };

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, params) in [("pad", &pad), ("acid", &acid)] {
            let mut voice = AnalogVoice::new(1_234_567, 9_876_543);
            voice.prepare(SAMPLE_RATE, size);
            voice.start_note(45, 1.0);

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    voice.render_block(&mut [&mut buffer[..]], 0, size, black_box(params));
                })
            });
        }
    }

    group.finish();
}
