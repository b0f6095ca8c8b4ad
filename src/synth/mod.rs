// Voice orchestration and the audio-thread host that drives it.

pub mod host;
pub mod message;
pub mod voice;

pub use host::MonoSynth;
pub use message::{MessageReceiver, VoiceMessage};
pub use voice::{midi_note_to_freq, AnalogVoice, Voice};
