use crate::{
    patch::VoiceParams,
    synth::{
        message::{MessageReceiver, VoiceMessage},
        voice::{AnalogVoice, Voice},
    },
};

/// Owns one [`AnalogVoice`] on the audio thread and feeds it from a
/// control channel.
pub struct MonoSynth<R: MessageReceiver> {
    voice: AnalogVoice,
    params: VoiceParams,
    rx: R,
    frame_counter: u64,
}

impl<R: MessageReceiver> MonoSynth<R> {
    pub fn new(voice: AnalogVoice, params: VoiceParams, rx: R) -> Self {
        Self {
            voice,
            params,
            rx,
            frame_counter: 0,
        }
    }

    /// Drain pending messages, then overwrite `out` with the next block.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                VoiceMessage::NoteOn { note, velocity } => self.voice.start_note(note, velocity),
                VoiceMessage::NoteOff { allow_tail_off } => self.voice.stop_note(allow_tail_off),
                // later snapshots overwrite earlier ones
                VoiceMessage::Params(params) => self.params = params,
            }
        }

        out.fill(0.0);
        let len = out.len();
        self.voice.render_block(&mut [out], 0, len, &self.params);
        self.frame_counter += len as u64;
    }

    pub fn voice(&self) -> &AnalogVoice {
        &self.voice
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }
}
