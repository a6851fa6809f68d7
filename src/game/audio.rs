//! Audio collaborator.
//!
//! The game loop only ever talks to the [`Audio`] trait: it unlocks on the
//! first gesture, starts/stops the music with the run and fires short beeps on
//! jump and crash. [`WebAudio`] synthesizes everything with oscillators; the
//! background tune comes from [`MusicSequencer`], which is pure step logic and
//! is clocked from the frame loop rather than a JS interval.
//!
//! None of these calls may fail loudly: a browser that refuses an
//! `AudioContext` simply leaves the game silent.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorType};

const MASTER_GAIN: f32 = 0.9;
const MUSIC_GAIN: f32 = 0.22;
const SFX_GAIN: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Beep {
    Jump,
    Crash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sawtooth,
    Triangle,
}

/// Oscillator parameters for a one-shot effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub freq: f64,
    pub duration: f64,
    pub waveform: Waveform,
}

impl Beep {
    pub fn tone(self) -> Tone {
        match self {
            Beep::Jump => Tone { freq: 880.0, duration: 0.07, waveform: Waveform::Square },
            Beep::Crash => Tone { freq: 120.0, duration: 0.2, waveform: Waveform::Sawtooth },
        }
    }
}

pub trait Audio {
    /// Create / resume the output. Browsers only allow this inside a user gesture.
    fn unlock(&mut self);
    fn play(&mut self, now_ms: f64);
    fn stop(&mut self);
    fn set_mute(&mut self, muted: bool);
    fn beep(&mut self, beep: Beep);
    /// Called once per frame so time-driven output (music) can advance.
    fn update(&mut self, _now_ms: f64) {}
}

/// No-op backend for tests and for hosts without audio.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl Audio for SilentAudio {
    fn unlock(&mut self) {}
    fn play(&mut self, _now_ms: f64) {}
    fn stop(&mut self) {}
    fn set_mute(&mut self, _muted: bool) {}
    fn beep(&mut self, _beep: Beep) {}
}

// --- Music -------------------------------------------------------------------

/// Minor-ish scale degrees (semitones above the base note).
pub const SCALE: [i32; 7] = [0, 2, 3, 5, 7, 9, 10];
pub const BASE_NOTE: i32 = 57;
pub const STEP_MS: f64 = 280.0;
pub const STEPS_PER_CYCLE: u32 = 32;

pub fn midi_to_hz(note: i32) -> f64 {
    440.0 * 2f64.powf((note - 69) as f64 / 12.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub freq: f64,
    pub len: f64,
    pub vol: f64,
}

/// Step sequencer for the background loop: a lead note an octave above the
/// scale degree every step and a bass note an octave below on even steps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MusicSequencer {
    step: u32,
    next_at: Option<f64>,
}

impl MusicSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.next_at.is_some()
    }

    /// Restart from step 0; the first step sounds on the next `due` call.
    pub fn start(&mut self, now_ms: f64) {
        self.step = 0;
        self.next_at = Some(now_ms);
    }

    pub fn stop(&mut self) {
        self.next_at = None;
    }

    /// Notes for the current step if it is due. After a long gap only one step
    /// plays and the clock resyncs instead of bursting to catch up.
    pub fn due(&mut self, now_ms: f64) -> Vec<Note> {
        let Some(at) = self.next_at else { return Vec::new() };
        if now_ms < at {
            return Vec::new();
        }
        let notes = Self::notes_for_step(self.step);
        self.step = (self.step + 1) % STEPS_PER_CYCLE;
        let next = at + STEP_MS;
        self.next_at = Some(if next <= now_ms { now_ms + STEP_MS } else { next });
        notes
    }

    pub fn notes_for_step(step: u32) -> Vec<Note> {
        let deg = SCALE[step as usize % SCALE.len()];
        let mut notes = vec![Note { freq: midi_to_hz(BASE_NOTE + deg + 12), len: 0.22, vol: 0.18 }];
        if step % 2 == 0 {
            notes.push(Note { freq: midi_to_hz(BASE_NOTE + deg - 12), len: 0.28, vol: 0.12 });
        }
        notes
    }
}

// --- WebAudio backend --------------------------------------------------------

struct Graph {
    ctx: AudioContext,
    master: GainNode,
    music: GainNode,
    sfx: GainNode,
}

impl Graph {
    fn build() -> Result<Graph, wasm_bindgen::JsValue> {
        let ctx = AudioContext::new()?;
        let master = ctx.create_gain()?;
        master.gain().set_value(MASTER_GAIN);
        master.connect_with_audio_node(&ctx.destination())?;
        let music = ctx.create_gain()?;
        music.gain().set_value(MUSIC_GAIN);
        music.connect_with_audio_node(&master)?;
        let sfx = ctx.create_gain()?;
        sfx.gain().set_value(SFX_GAIN);
        sfx.connect_with_audio_node(&master)?;
        Ok(Graph { ctx, master, music, sfx })
    }

    /// One enveloped oscillator note routed into `bus`.
    fn voice(
        &self,
        bus: &GainNode,
        freq: f64,
        waveform: Waveform,
        peak: f64,
        attack: f64,
        len: f64,
        tail: f64,
    ) -> Result<(), wasm_bindgen::JsValue> {
        let t0 = self.ctx.current_time();
        let osc = self.ctx.create_oscillator()?;
        osc.set_type(match waveform {
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        });
        osc.frequency().set_value(freq as f32);
        let env = self.ctx.create_gain()?;
        env.gain().set_value(0.0);
        env.gain().linear_ramp_to_value_at_time(peak as f32, t0 + attack)?;
        env.gain().exponential_ramp_to_value_at_time(0.0001, t0 + len)?;
        osc.connect_with_audio_node(&env)?;
        env.connect_with_audio_node(bus)?;
        osc.start_with_when(t0)?;
        osc.stop_with_when(t0 + len + tail)?;
        Ok(())
    }
}

/// Oscillator-synthesized sound effects plus the sequencer tune.
#[derive(Default)]
pub struct WebAudio {
    graph: Option<Graph>,
    muted: bool,
    sequencer: MusicSequencer,
}

impl WebAudio {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_mute(&self) {
        if let Some(g) = &self.graph {
            g.master.gain().set_value(if self.muted { 0.0 } else { MASTER_GAIN });
        }
    }
}

impl Audio for WebAudio {
    fn unlock(&mut self) {
        if let Some(g) = &self.graph {
            if g.ctx.state() == AudioContextState::Suspended {
                if let Err(e) = g.ctx.resume() {
                    log::debug!("audio resume failed: {:?}", e);
                }
            }
            return;
        }
        match Graph::build() {
            Ok(g) => {
                self.graph = Some(g);
                self.apply_mute();
                log::debug!("audio context created");
            }
            Err(e) => log::warn!("audio unavailable: {:?}", e),
        }
    }

    fn play(&mut self, now_ms: f64) {
        if self.graph.is_some() {
            self.sequencer.start(now_ms);
        }
    }

    fn stop(&mut self) {
        self.sequencer.stop();
    }

    fn set_mute(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_mute();
    }

    fn beep(&mut self, beep: Beep) {
        let Some(g) = &self.graph else { return };
        let tone = beep.tone();
        if let Err(e) = g.voice(&g.sfx, tone.freq, tone.waveform, 0.6, 0.01, tone.duration, 0.02) {
            log::debug!("beep failed: {:?}", e);
        }
    }

    fn update(&mut self, now_ms: f64) {
        let Some(g) = &self.graph else { return };
        for note in self.sequencer.due(now_ms) {
            if let Err(e) = g.voice(&g.music, note.freq, Waveform::Triangle, note.vol, 0.02, note.len, 0.05) {
                log::debug!("music note failed: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midi_a4_is_440() {
        assert!((midi_to_hz(69) - 440.0).abs() < 1e-9);
        assert!((midi_to_hz(81) - 880.0).abs() < 1e-9);
        assert!((midi_to_hz(57) - 220.0).abs() < 1e-9);
    }

    #[test]
    fn sequencer_steps_on_schedule() {
        let mut s = MusicSequencer::new();
        assert!(s.due(0.0).is_empty());
        s.start(1000.0);
        let first = s.due(1000.0);
        assert_eq!(first.len(), 2); // step 0 has bass
        assert!((first[0].freq - midi_to_hz(69)).abs() < 1e-9);
        assert!(s.due(1100.0).is_empty());
        let second = s.due(1280.0);
        assert_eq!(second.len(), 1);
        assert!((second[0].freq - midi_to_hz(57 + 2 + 12)).abs() < 1e-9);
    }

    #[test]
    fn sequencer_resyncs_after_gap() {
        let mut s = MusicSequencer::new();
        s.start(0.0);
        s.due(0.0);
        assert_eq!(s.due(10_000.0).len(), 1);
        // no burst of queued steps
        assert!(s.due(10_001.0).is_empty());
        assert!(!s.due(10_280.0).is_empty());
    }

    #[test]
    fn sequencer_cycles_and_stops() {
        let mut s = MusicSequencer::new();
        s.start(0.0);
        for i in 0..STEPS_PER_CYCLE {
            assert!(!s.due(i as f64 * STEP_MS).is_empty());
        }
        // back at step 0: bass again
        assert_eq!(s.due(STEPS_PER_CYCLE as f64 * STEP_MS).len(), 2);
        s.stop();
        assert!(!s.is_playing());
        assert!(s.due(1e9).is_empty());
    }

    #[test]
    fn beep_tones() {
        assert_eq!(Beep::Jump.tone().freq, 880.0);
        assert_eq!(Beep::Crash.tone().waveform, Waveform::Sawtooth);
    }
}
