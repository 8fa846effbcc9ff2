//! Web Audio cue player
//!
//! Procedurally generated blips, no sound files. Failures to build a node
//! just drop the cue.

use std::cell::Cell;

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::services::{AudioService, Cue};

pub struct WebAudio {
    ctx: Option<AudioContext>,
    volume: Cell<f32>,
    muted: Cell<bool>,
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudio {
    pub fn new() -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: Cell::new(0.8),
            muted: Cell::new(false),
        }
    }

    /// Resume after a user gesture
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.set(volume.clamp(0.0, 1.0));
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.set(muted);
    }

    fn effective_volume(&self) -> f32 {
        if self.muted.get() { 0.0 } else { self.volume.get() }
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// One enveloped tone sweeping `from` → `to` Hz, starting `delay` s from now
    fn tone(
        &self,
        ctx: &AudioContext,
        vol: f32,
        (from, to): (f32, f32),
        osc_type: OscillatorType,
        delay: f64,
        length: f64,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
            return;
        };
        let t = ctx.current_time() + delay;

        gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + length)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        if (to - from).abs() > f32::EPSILON {
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + length)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + length + 0.05).ok();
    }

    fn arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], step: f64) {
        for (i, &note) in notes.iter().enumerate() {
            self.tone(
                ctx,
                vol,
                (note, note),
                OscillatorType::Triangle,
                i as f64 * step,
                step * 1.5,
            );
        }
    }
}

impl AudioService for WebAudio {
    fn play(&self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        use OscillatorType::{Sawtooth, Sine, Square, Triangle};
        match cue {
            Cue::Click => self.tone(ctx, vol * 0.3, (800.0, 800.0), Sine, 0.0, 0.05),
            Cue::Correct => self.arpeggio(ctx, vol * 0.35, &[523.0, 659.0, 784.0], 0.07),
            Cue::Wrong => self.tone(ctx, vol * 0.35, (220.0, 110.0), Square, 0.0, 0.25),
            Cue::Laser => self.tone(ctx, vol * 0.25, (1200.0, 300.0), Square, 0.0, 0.12),
            Cue::Explosion => self.tone(ctx, vol * 0.5, (160.0, 40.0), Sawtooth, 0.0, 0.35),
            Cue::LifeLost => self.tone(ctx, vol * 0.45, (440.0, 90.0), Triangle, 0.0, 0.5),
            Cue::PowerUp => self.arpeggio(ctx, vol * 0.3, &[660.0, 880.0, 1320.0], 0.05),
            Cue::Attack => self.tone(ctx, vol * 0.4, (300.0, 900.0), Sawtooth, 0.0, 0.18),
            Cue::SuperAttack => {
                self.tone(ctx, vol * 0.5, (200.0, 1600.0), Sawtooth, 0.0, 0.4);
                self.tone(ctx, vol * 0.3, (100.0, 50.0), Sine, 0.3, 0.5);
            }
            Cue::Victory => {
                self.arpeggio(ctx, vol * 0.4, &[523.0, 659.0, 784.0, 1047.0], 0.12)
            }
            Cue::GameOver => self.arpeggio(ctx, vol * 0.4, &[392.0, 330.0, 262.0, 196.0], 0.2),
        }
    }
}
