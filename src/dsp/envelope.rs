use crate::MIN_TIME;

/*
ADSR Envelope Implementation
============================

This module implements an exponential ADSR envelope generator, the shape of
an RC network charging and discharging rather than a straight ramp.

Vocabulary
----------

  level       The envelope's raw output (0.0 to 1.0) before velocity scaling.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay or
              Release. A state machine governs transitions.

  gate        The note on/off signal. Gate high (note_on) triggers Attack.
              Gate low (note_off) triggers Release from wherever we are.

  time        Each stage time is the time constant (tau) of its exponential,
              not the time to reach the target. After one tau the level has
              covered ~63% of the distance, after ln(1000) ~ 6.9 tau 99.9%.

  velocity    Scalar latched at note_on. The returned value is
              level * velocity; the state machine only sees the raw level.


The Shape: Exponential Segments
-------------------------------

  Level
    1.0 ┐    .-.
        │   /   `-.__________
    S   │  /                 \
        │ |                   `.
    0.0 └─┴───────────────────────`-.__→ Time
        Attack Decay (holds at S) Release

Every stage moves toward a stage-specific target with the same step:

    k      = exp(-dt / max(MIN_TIME, stage_time)),   dt = 1 / sample_rate
    level  = target + (level - target) * k

    Attack   target 1.0
    Decay    target sustain level
    Release  target 0.0


The State Machine
-----------------

    ┌──────┐  note_on   ┌────────┐  level>0.999  ┌───────┐
    │ Idle │ ─────────→ │ Attack │ ────────────→ │ Decay │
    └──────┘            └────────┘   (snap 1.0)  └───────┘
        ↑                    │ note_off              │ note_off
        │                    ↓                       ↓
        │   level<1e-5  ┌─────────┐ ←────────────────┘
        └────────────── │ Release │
          (snap 0.0)    └─────────┘

There is no separate Sustain stage: Decay converges on the sustain level and
simply stays there until the gate drops. An exponential never quite reaches
its target, so Attack and Release exit on thresholds and snap to the exact
end value. That snap is what lets a voice report "finished" with a clean 0.0.

note_on does not reset the level. Retriggering a sounding voice starts the
new attack from wherever the previous note left off, so there is no click.
*/

const ATTACK_EXIT: f32 = 0.999;
const RELEASE_EXIT: f32 = 1e-5;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Rising toward 1.0
    Decay,   // Falling toward (then holding) the sustain level
    Release, // Gate went low, falling toward 0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    // ADSR targets (replaced by `set`, usually once per block)
    attack_time: f32,   // seconds (time constant)
    decay_time: f32,    // seconds (time constant)
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds (time constant)

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,
    velocity: f32, // latched at note_on
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.01, 0.1, 0.5, 0.2)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            attack_time: 0.0,
            decay_time: 0.0,
            sustain_level: 0.0,
            release_time: 0.0,
            stage: EnvelopeState::Idle,
            level: 0.0,
            velocity: 1.0,
        };
        env.set(attack, decay, sustain, release);
        env
    }

    /// Replace the stage targets. Takes effect on the next sample; the
    /// current stage and level are left alone.
    pub fn set(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack;
        self.decay_time = decay;
        self.sustain_level = sustain;
        self.release_time = release;
    }

    /// Gate high: enter Attack from the current level and latch velocity.
    pub fn note_on(&mut self, velocity: f32) {
        self.stage = EnvelopeState::Attack;
        self.velocity = velocity;
    }

    /// Gate low: start the release phase from the current level.
    pub fn note_off(&mut self) {
        if self.stage != EnvelopeState::Idle {
            self.stage = EnvelopeState::Release;
        }
    }

    /// Advance one sample and return `level * velocity`.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let dt = 1.0 / sample_rate;

        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level = step_toward(self.level, 1.0, self.attack_time, dt);
                if self.level > ATTACK_EXIT {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                // no exit: holds at the sustain level until note_off
                self.level = step_toward(self.level, self.sustain_level, self.decay_time, dt);
            }

            EnvelopeState::Release => {
                self.level = step_toward(self.level, 0.0, self.release_time, dt);
                if self.level < RELEASE_EXIT {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        self.level * self.velocity
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    /// Force the envelope back to idle (hard voice kill).
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Raw level (0.0 to 1.0), before velocity scaling.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn step_toward(level: f32, target: f32, stage_time: f32, dt: f32) -> f32 {
    let k = (-dt / stage_time.max(MIN_TIME)).exp();
    target + (level - target) * k
}
