//! Offline rendering to WAV plus a quick spectral summary.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};
use rustfft::{num_complex::Complex, FftPlanner};

use analog_voice::{
    synth::{AnalogVoice, Voice},
    VoiceConfig, MAX_BLOCK_SIZE,
};

use super::NoteArgs;

pub fn run(args: &NoteArgs, path: &str, sample_rate: f32) -> EyreResult<()> {
    let config = VoiceConfig::default().with_sample_rate(sample_rate);
    let mut voice = AnalogVoice::from_config(&config).wrap_err("invalid voice configuration")?;
    let params = args.voice_params();

    let total = (args.seconds.max(0.0) * sample_rate) as usize;
    let gate = (args.gate.max(0.0) * sample_rate) as usize;
    if total == 0 {
        return Err(eyre!("nothing to render: --seconds must be positive"));
    }

    let mut rendered = vec![0.0f32; total];
    voice.start_note(args.note, args.velocity);

    let mut pos = 0;
    while pos < total {
        // split blocks at the gate so note-off lands on the exact sample
        let mut end = (pos + MAX_BLOCK_SIZE).min(total);
        if pos < gate && gate < end {
            end = gate;
        }
        if pos == gate {
            voice.stop_note(true);
        }
        voice.render_block(&mut [&mut rendered[..]], pos, end - pos, &params);
        pos = end;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer =
        WavWriter::create(path, spec).wrap_err_with(|| format!("failed to create {path}"))?;
    for &s in &rendered {
        writer.write_sample(s)?;
    }
    writer.finalize().wrap_err("failed to finalize WAV file")?;

    let peak = rendered.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let rms = (rendered.iter().map(|s| s * s).sum::<f32>() / total as f32).sqrt();
    let upper = upper_band_energy_ratio(&rendered);

    println!("Wrote {path} ({total} samples @ {sample_rate} Hz)");
    println!("  peak: {peak:.4}");
    println!("  rms:  {rms:.4}");
    println!("  energy above Nyquist/2: {:.3}%", upper * 100.0);
    Ok(())
}

/// Share of Hann-windowed spectral energy in the upper half of the band.
fn upper_band_energy_ratio(signal: &[f32]) -> f32 {
    let n = signal.len();
    if n < 2 {
        return 0.0;
    }
    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / (n - 1) as f32).cos();
            Complex::new(s * w, 0.0)
        })
        .collect();
    FftPlanner::<f32>::new()
        .plan_fft_forward(n)
        .process(&mut buffer);

    let bins = &buffer[..n / 2];
    let total: f32 = bins.iter().map(|c| c.norm_sqr()).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let upper: f32 = bins[bins.len() / 2..].iter().map(|c| c.norm_sqr()).sum();
    upper / total
}
