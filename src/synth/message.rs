#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::patch::VoiceParams;

/// Control traffic from the UI or MIDI thread to the audio thread.
#[derive(Debug, Copy, Clone)]
pub enum VoiceMessage {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { allow_tail_off: bool },
    /// Replace the parameter snapshot used from the next block on.
    Params(VoiceParams),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        Consumer::pop(self).ok()
    }
}

/// Lock-free single-producer/single-consumer control channel.
#[cfg(feature = "rtrb")]
pub fn channel(capacity: usize) -> (Producer<VoiceMessage>, Consumer<VoiceMessage>) {
    RingBuffer::new(capacity)
}
