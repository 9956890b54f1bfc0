//! Sound effect dispatch
//!
//! The game only has one sound, the bump. Playback is fire-and-forget: the
//! manager applies volume and mute, then hands the effect to a sink.

use std::io::Write;

use crate::config::AudioConfig;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hit a wall, a block or the paddle
    Bump,
}

impl SoundEffect {
    /// The sound a simulation event should make, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Bump(_) => Some(SoundEffect::Bump),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Bump => "bump",
        }
    }
}

/// Output device. `play` must return immediately.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Logs each effect instead of playing it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("Play `{}` at {:.2}", effect.name(), volume);
    }
}

/// Rings the terminal bell on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct BellSink;

impl AudioSink for BellSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(LogSink), &AudioConfig::default())
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>, config: &AudioConfig) -> Self {
        Self {
            sink,
            master_volume: config.master_volume.clamp(0.0, 1.0),
            sfx_volume: config.sfx_volume.clamp(0.0, 1.0),
            muted: config.muted,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play whatever sounds a batch of tick events calls for
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }
}
