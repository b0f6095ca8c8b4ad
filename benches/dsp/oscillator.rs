//! Benchmarks for the analog oscillator.

use std::hint::black_box;

use analog_voice::dsp::oscillator::{AnalogOscillator, OscillatorParams, Waveform};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let cases = [
        ("saw", OscillatorParams::default()),
        (
            "square",
            OscillatorParams {
                waveform: Waveform::Square,
                ..OscillatorParams::default()
            },
        ),
        (
            "triangle",
            OscillatorParams {
                waveform: Waveform::Triangle,
                ..OscillatorParams::default()
            },
        ),
        (
            "saw_single_rate",
            OscillatorParams {
                oversample_2x: false,
                ..OscillatorParams::default()
            },
        ),
        ("saw_ideal", OscillatorParams::ideal(Waveform::Saw)),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, params) in &cases {
            let mut osc = AnalogOscillator::new(1_234_567);
            osc.prepare(SAMPLE_RATE);
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    for s in buffer.iter_mut() {
                        *s = osc.process(black_box(220.0), 0.0, params);
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
