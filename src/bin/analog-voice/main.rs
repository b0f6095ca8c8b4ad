//! analog-voice - render or play a single analog-modeled voice
//!
//! Run with: cargo run -- render --out note.wav

mod play;
mod render;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use simple_logger::SimpleLogger;

use analog_voice::{
    dsp::oscillator::OscillatorParams,
    patch::{VoiceParams, Waveform},
};

#[derive(Parser)]
#[command(name = "analog-voice")]
#[command(about = "Analog-modeled synth voice", long_about = None)]
struct Cli {
    /// Log debug output from the voice
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one note offline to a WAV file
    Render {
        #[command(flatten)]
        note: NoteArgs,

        /// Output WAV file path
        #[arg(short, long, default_value = "note.wav")]
        out: String,

        /// Sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,
    },

    /// Play one note on the default output device
    Play {
        #[command(flatten)]
        note: NoteArgs,
    },
}

#[derive(clap::Args, Clone)]
struct NoteArgs {
    /// MIDI note number
    #[arg(short, long, default_value = "57")]
    note: u8,

    /// Note velocity 0.0-1.0
    #[arg(long, default_value = "0.9")]
    velocity: f32,

    /// Total length in seconds
    #[arg(short, long, default_value = "2.0")]
    seconds: f32,

    /// Seconds until note off
    #[arg(short, long, default_value = "1.0")]
    gate: f32,

    #[arg(short, long, value_enum, default_value = "saw")]
    waveform: WaveArg,

    /// Oscillator B detune in cents
    #[arg(long, default_value = "7.0")]
    detune: f32,

    /// Filter cutoff in Hz
    #[arg(long, default_value = "1200.0")]
    cutoff: f32,

    /// Filter resonance 0.0-1.2
    #[arg(long, default_value = "0.4")]
    resonance: f32,

    /// Filter envelope depth in octaves
    #[arg(long, default_value = "2.0")]
    env_amount: f32,
}

#[derive(ValueEnum, Clone, Copy)]
enum WaveArg {
    Saw,
    Square,
    Triangle,
}

impl From<WaveArg> for Waveform {
    fn from(arg: WaveArg) -> Self {
        match arg {
            WaveArg::Saw => Waveform::Saw,
            WaveArg::Square => Waveform::Square,
            WaveArg::Triangle => Waveform::Triangle,
        }
    }
}

impl NoteArgs {
    fn voice_params(&self) -> VoiceParams {
        let wave = Waveform::from(self.waveform);
        let mut params = VoiceParams::with_oscillators(OscillatorParams::default(), wave, wave);
        params.detune_b = self.detune;
        params.filter.cutoff_hz = self.cutoff;
        params.filter.resonance = self.resonance;
        params.filter.env_amount = self.env_amount;
        params
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .wrap_err("failed to install logger")?;

    match cli.command {
        Commands::Render {
            note,
            out,
            sample_rate,
        } => render::run(&note, &out, sample_rate as f32),
        Commands::Play { note } => play::run(&note),
    }
}
