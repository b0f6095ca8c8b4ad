use std::f32::consts::PI;

use super::shaping::OnePole;

/*
Zero-Delay-Feedback Ladder
==========================

Four TPT (topology-preserving transform) one-pole lowpass stages in series,
with the last stage fed back to a saturating input stage:

              ┌──────────────────── k ←───────────────────┐
              ↓                                           │
    x ──→ (−) ──→ tanh(drive·) ──u──→ [LP1]→[LP2]→[LP3]→[LP4] ──→ y

Each stage is a trapezoidal integrator:

    v = (in - s) * G        G = g / (1 + g),   g = tan(π fc / fs)
    y = v + s
    s = y + v

Unrolling the cascade, the output is linear in the stage input u:

    y4 = A·u + B            A = G⁴
                            B = (1 - G)(G³ s1 + G² s2 + G s3 + s4)

B is what the ladder would output from its stored state alone. Because the
feedback taps y4 of the *current* sample, the input stage is an implicit
equation in u:

    u = tanh(d · (x - k (A u + B)))

which has no closed form. Per sample we solve it with Newton-Raphson on

    f(u)  = u - tanh(z),      z = d (x - k (A u + B))
    f'(u) = 1 + d k A sech²(z)

f' >= 1 everywhere, so two iterations from a decent seed are plenty. The seed
is last sample's solution when it is finite and close to the linearised
solution; after a parameter jump it may be nowhere near the new root, and
then a fresh estimate from the linear solution is used instead.

Parameters
----------

  cutoff      normalized 0..1, mapped exponentially from 20 Hz to 0.4·fs
  resonance   0..1.2, k = 4·res·(1 - 0.6G + 0.3G²); the polynomial keeps
              the self-oscillation threshold roughly constant across cutoff
  drive       0..1, input gain d = 1 + 3·drive

All three are smoothed per sample toward the values given to `set`.

Failure handling
----------------

A non-finite output returns silence for that sample and resets the filter:
the four stages and the warm start are cleared and the smoothed parameters
snap to their targets. A smoother that has gone NaN never recovers by
itself, so the snap is what lets valid targets take over again.
*/

/// Lowest cutoff of the normalized mapping.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff as a fraction of the sample rate.
pub const MAX_CUTOFF_RATIO: f32 = 0.40;

const NEWTON_ITERATIONS: usize = 2;
const NEWTON_EPSILON: f32 = 1e-9;
/// Largest distance between the previous solution and the linear estimate
/// for which the previous solution is still trusted as a seed.
const WARM_START_RADIUS: f32 = 0.5;

/// Map a normalized cutoff (0..1) to Hz for the given sample rate.
#[inline]
pub fn cutoff_from_normalized(norm: f32, sample_rate: f32) -> f32 {
    let max_hz = MAX_CUTOFF_RATIO * sample_rate;
    MIN_CUTOFF_HZ * (max_hz / MIN_CUTOFF_HZ).powf(norm.clamp(0.0, 1.0))
}

/// Inverse of [`cutoff_from_normalized`], clamped to 0..1.
#[inline]
pub fn normalized_from_cutoff(hz: f32, sample_rate: f32) -> f32 {
    let max_hz = MAX_CUTOFF_RATIO * sample_rate;
    let norm = (hz.max(MIN_CUTOFF_HZ) / MIN_CUTOFF_HZ).ln() / (max_hz / MIN_CUTOFF_HZ).ln();
    norm.clamp(0.0, 1.0)
}

pub struct LadderFilter {
    sample_rate: f32,
    smoothing_ms: f32,

    cutoff: OnePole,    // normalized
    resonance: OnePole, // 0..1.2
    drive: OnePole,     // 0..1

    stages: [f32; 4],
    u_prev: f32, // warm start for Newton
}

impl LadderFilter {
    pub fn new() -> Self {
        let sample_rate = 44_100.0;
        let mut filter = Self {
            sample_rate,
            smoothing_ms: 5.0,
            cutoff: OnePole::new(normalized_from_cutoff(1_000.0, sample_rate)),
            resonance: OnePole::new(0.5),
            drive: OnePole::new(0.2),
            stages: [0.0; 4],
            u_prev: 0.0,
        };
        filter.prepare(sample_rate, 5.0);
        filter
    }

    /// Set the sample rate and smoothing time, then reset.
    pub fn prepare(&mut self, sample_rate: f32, smoothing_ms: f32) {
        self.sample_rate = sample_rate;
        self.smoothing_ms = smoothing_ms;
        let tau = smoothing_ms * 0.001;
        self.cutoff.set_time(sample_rate, tau);
        self.resonance.set_time(sample_rate, tau);
        self.drive.set_time(sample_rate, tau);
        self.reset();
    }

    /// New targets; the working values glide toward them sample by sample.
    #[inline]
    pub fn set(&mut self, cutoff_normalized: f32, resonance: f32, drive: f32) {
        self.cutoff.set_target(cutoff_normalized);
        self.resonance.set_target(resonance);
        self.drive.set_target(drive);
    }

    /// Convenience for callers that think in Hz.
    #[inline]
    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32, resonance: f32, drive: f32) {
        let norm = normalized_from_cutoff(cutoff_hz, self.sample_rate);
        self.set(norm, resonance, drive);
    }

    /// Clear the ladder and warm start, and snap smoothed parameters to
    /// their current targets.
    pub fn reset(&mut self) {
        self.stages = [0.0; 4];
        self.u_prev = 0.0;
        self.cutoff.snap();
        self.resonance.snap();
        self.drive.snap();
    }

    pub fn process_sample(&mut self, x: f32) -> f32 {
        let norm = self.cutoff.next();
        let res = self.resonance.next();
        let drive = self.drive.next();

        let fc = cutoff_from_normalized(norm, self.sample_rate);
        let g = (PI * fc / self.sample_rate).tan();
        let big_g = g / (1.0 + g);
        let g2 = big_g * big_g;
        let g3 = g2 * big_g;
        let a = g2 * g2;

        let [s1, s2, s3, s4] = self.stages;
        let b = (1.0 - big_g) * (g3 * s1 + g2 * s2 + big_g * s3 + s4);
        let k = 4.0 * res * (1.0 - 0.6 * big_g + 0.3 * g2);
        let d = 1.0 + 3.0 * drive;

        let u_linear = d * (x - k * b) / (1.0 + d * k * a);
        let mut u = if self.u_prev.is_finite() && (self.u_prev - u_linear).abs() < WARM_START_RADIUS {
            self.u_prev
        } else {
            (d * (x - k * (a * u_linear + b))).tanh()
        };

        for _ in 0..NEWTON_ITERATIONS {
            let t = (d * (x - k * (a * u + b))).tanh();
            let f = u - t;
            let df = 1.0 + d * k * a * (1.0 - t * t);
            u -= f / (df + NEWTON_EPSILON);
        }

        let mut input = u;
        for s in self.stages.iter_mut() {
            let v = (input - *s) * big_g;
            let y = v + *s;
            *s = y + v;
            input = y;
        }
        let y = input;

        if !y.is_finite() || !u.is_finite() || self.stages.iter().any(|s| !s.is_finite()) {
            self.reset();
            return 0.0;
        }

        self.u_prev = u;
        y
    }

    /// Filter a buffer in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn smoothing_ms(&self) -> f32 {
        self.smoothing_ms
    }

    /// Current smoothed cutoff (normalized).
    pub fn cutoff_normalized(&self) -> f32 {
        self.cutoff.value()
    }

    /// Current smoothed cutoff in Hz.
    pub fn cutoff_hz(&self) -> f32 {
        cutoff_from_normalized(self.cutoff.value(), self.sample_rate)
    }

    pub fn resonance(&self) -> f32 {
        self.resonance.value()
    }

    pub fn drive(&self) -> f32 {
        self.drive.value()
    }
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new()
    }
}
