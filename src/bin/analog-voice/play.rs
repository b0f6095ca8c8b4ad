//! Live playback: the note is driven from this thread over the control ring.

use std::{thread, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use analog_voice::{
    synth::{message, AnalogVoice, MonoSynth, VoiceMessage},
    VoiceConfig, MAX_BLOCK_SIZE,
};

use super::NoteArgs;

const CONTROL_QUEUE: usize = 64;

pub fn run(args: &NoteArgs) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    log::info!("output: {sample_rate} Hz, {channels} channels");

    let voice_config = VoiceConfig::default().with_sample_rate(sample_rate);
    let voice = AnalogVoice::from_config(&voice_config).wrap_err("invalid voice configuration")?;

    let (mut tx, rx) = message::channel(CONTROL_QUEUE);
    let mut synth = MonoSynth::new(voice, args.voice_params(), rx);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames];
                    synth.render_block(block);

                    // mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames;
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let gate = args.gate.clamp(0.0, args.seconds.max(0.0));
    send(
        &mut tx,
        VoiceMessage::NoteOn {
            note: args.note,
            velocity: args.velocity,
        },
    );
    thread::sleep(Duration::from_secs_f32(gate));
    send(
        &mut tx,
        VoiceMessage::NoteOff {
            allow_tail_off: true,
        },
    );
    thread::sleep(Duration::from_secs_f32(args.seconds.max(0.0) - gate));

    Ok(())
}

fn send(tx: &mut rtrb::Producer<VoiceMessage>, msg: VoiceMessage) {
    if tx.push(msg).is_err() {
        log::warn!("control queue full, dropped {msg:?}");
    }
}
