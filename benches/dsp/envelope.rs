//! Benchmarks for the exponential ADSR.

use std::hint::black_box;

use analog_voice::dsp::envelope::Envelope;
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Retriggered every block so attack/decay stay in play
        let mut env = Envelope::adsr(0.005, 0.1, 0.6, 0.2);
        group.bench_with_input(BenchmarkId::new("retrigger", size), &size, |b, _| {
            b.iter(|| {
                env.note_on(1.0);
                env.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });

        // Parked in sustain
        let mut env = Envelope::adsr(0.001, 0.001, 0.6, 0.2);
        env.note_on(1.0);
        let mut warmup = vec![0.0f32; 4_800];
        env.render(&mut warmup, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
