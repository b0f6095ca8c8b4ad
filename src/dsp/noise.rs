//! Colored-noise filters that turn white noise into pink and brown spectra.
//!
//! Both are one-sample-state filters fed by an external white source (see
//! [`Lcg`](super::random::Lcg)), so they stay deterministic and can share a
//! single white draw between several consumers.

/// Three leaky integrators plus a direct path: a -3 dB/octave approximation.
#[derive(Debug, Clone, Default)]
pub struct PinkNoise {
    b0: f32,
    b1: f32,
    b2: f32,
}

impl PinkNoise {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        self.b0 = 0.99765 * self.b0 + white * 0.099_046;
        self.b1 = 0.96300 * self.b1 + white * 0.296_516_4;
        self.b2 = 0.57000 * self.b2 + white * 1.052_691_3;
        (self.b0 + self.b1 + self.b2 + white * 0.1848) * 0.05
    }
}

/// Leaky integrator: -6 dB/octave, slowly wandering.
#[derive(Debug, Clone, Default)]
pub struct BrownNoise {
    y: f32,
}

impl BrownNoise {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        self.y = (self.y + white * 0.02) * 0.995;
        self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::random::Lcg;

    /// Mean absolute first difference: small for low-frequency-heavy signals.
    fn roughness(samples: &[f32]) -> f32 {
        let rms = (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
        let diff = samples.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f32>()
            / (samples.len() - 1) as f32;
        diff / rms
    }

    #[test]
    fn brown_step_response() {
        let mut brown = BrownNoise::new();
        // (0 + 1 * 0.02) * 0.995
        assert!((brown.process(1.0) - 0.0199).abs() < 1e-7);
    }

    #[test]
    fn pink_zero_in_zero_out() {
        let mut pink = PinkNoise::new();
        for _ in 0..16 {
            assert_eq!(pink.process(0.0), 0.0);
        }
    }

    #[test]
    fn outputs_stay_small_under_unit_input() {
        let mut rng = Lcg::new(3);
        let mut pink = PinkNoise::new();
        let mut brown = BrownNoise::new();
        for _ in 0..200_000 {
            let w = rng.bipolar();
            assert!(pink.process(w).abs() < 1.0);
            assert!(brown.process(w).abs() < 1.0);
        }
    }

    #[test]
    fn colored_noise_is_smoother_than_white() {
        let mut rng = Lcg::new(11);
        let mut pink = PinkNoise::new();
        let mut brown = BrownNoise::new();

        let white: Vec<f32> = (0..8192).map(|_| rng.bipolar()).collect();
        let pinked: Vec<f32> = white.iter().map(|&w| pink.process(w)).collect();
        let browned: Vec<f32> = white.iter().map(|&w| brown.process(w)).collect();

        let r_white = roughness(&white);
        let r_pink = roughness(&pinked);
        let r_brown = roughness(&browned);

        assert!(r_pink < r_white, "pink {r_pink} vs white {r_white}");
        assert!(r_brown < r_pink, "brown {r_brown} vs pink {r_pink}");
    }
}
