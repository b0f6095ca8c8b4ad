//! Benchmarks for the nonlinear ladder filter.

use std::hint::black_box;

use analog_voice::dsp::filter::LadderFilter;
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Gentle settings: Newton converges from the warm start
        let mut filter = LadderFilter::new();
        filter.prepare(SAMPLE_RATE, 5.0);
        filter.set_cutoff_hz(1_000.0, 0.3, 0.1);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("ladder", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Near self-oscillation with full drive
        let mut filter = LadderFilter::new();
        filter.prepare(SAMPLE_RATE, 5.0);
        filter.set_cutoff_hz(2_500.0, 1.1, 1.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("ladder_resonant", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Cutoff target moving every block keeps the smoothers busy
        let mut filter = LadderFilter::new();
        filter.prepare(SAMPLE_RATE, 5.0);
        let mut buffer = input.clone();
        let mut toggle = false;
        group.bench_with_input(BenchmarkId::new("ladder_sweep", size), &size, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                let norm = if toggle { 0.2 } else { 0.8 };
                filter.set(norm, 0.6, 0.3);
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
