//! Antialiasing and conditioning helpers shared by the oscillator and filter.
//!
//! # PolyBLEP
//!
//! A naive sawtooth or square jumps instantly, which puts energy at every
//! harmonic and folds everything above Nyquist back into the audible band.
//! PolyBLEP subtracts a two-sample polynomial approximation of the
//! band-limited step residual around each discontinuity:
//!
//!   t < dt        (just after the jump):  2t' - t'^2 - 1,  t' = t / dt
//!   t > 1 - dt    (just before the jump): t'^2 + 2t' + 1,  t' = (t - 1) / dt
//!
//! # ADAA tanh
//!
//! Waveshaping a signal with `tanh` creates new harmonics that alias just
//! like a naive oscillator. First-order antiderivative antialiasing replaces
//! `tanh(x[n])` with the mean value of `tanh` over the segment between the
//! previous and the current input:
//!
//!   y[n] = (F(x[n]) - F(x[n-1])) / (x[n] - x[n-1]),   F(x) = ln(cosh(x))
//!
//! When the two inputs are nearly equal the quotient is 0/0, so the shaper
//! falls back to `tanh` of the midpoint, which is the limit of the quotient.

use std::f64::consts::LN_2;

/// Below this input step the ADAA quotient switches to the midpoint tangent.
pub const ADAA_EPSILON: f32 = 1e-6;

/// Band-limited step residual for phase `t` in `[0, 1)` and increment `dt`.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

/// `ln(cosh(x))` without overflowing for large `|x|`.
#[inline]
pub fn log_cosh(x: f64) -> f64 {
    let ax = x.abs();
    ax + (-2.0 * ax).exp().ln_1p() - LN_2
}

/// First-order ADAA `tanh` between the previous input `x_prev` and `x`.
///
/// The antiderivative difference is taken in f64: at small steps the two
/// `log_cosh` values agree in most of their f32 digits.
#[inline]
pub fn adaa_tanh(x: f32, x_prev: f32) -> f32 {
    let dx = x - x_prev;
    if dx.abs() > ADAA_EPSILON {
        ((log_cosh(x as f64) - log_cosh(x_prev as f64)) / dx as f64) as f32
    } else {
        (0.5 * (x + x_prev)).tanh()
    }
}

/// One-pole DC blocker: `y[n] = x[n] - x[n-1] + R * y[n-1]`.
#[derive(Debug, Clone)]
pub struct DcBlocker {
    r: f32,
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub fn new(r: f32) -> Self {
        Self { r, x1: 0.0, y1: 0.0 }
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = x - self.x1 + self.r * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// One-pole parameter smoother: `value = target + (value - target) * coef`.
///
/// `coef = exp(-1 / (sample_rate * tau))`; a zero time constant makes the
/// smoother transparent.
#[derive(Debug, Clone)]
pub struct OnePole {
    value: f32,
    target: f32,
    coef: f32,
}

impl OnePole {
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            target: initial,
            coef: 0.0,
        }
    }

    pub fn set_time(&mut self, sample_rate: f32, tau_seconds: f32) {
        self.coef = if tau_seconds > 0.0 && sample_rate > 0.0 {
            (-1.0 / (sample_rate * tau_seconds)).exp()
        } else {
            0.0
        };
    }

    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        self.value = self.target + (self.value - self.target) * self.coef;
        self.value
    }

    /// Jump straight to the target.
    pub fn snap(&mut self) {
        self.value = self.target;
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn coef(&self) -> f32 {
        self.coef
    }
}
