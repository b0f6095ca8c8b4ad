pub mod config;
pub mod dsp;
pub mod patch; // Per-block parameter snapshots
pub mod synth; // Voice orchestration and audio-thread host

pub use config::{ConfigError, VoiceConfig};
pub use patch::VoiceParams;
pub use synth::{AnalogVoice, Voice};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1e-6;
