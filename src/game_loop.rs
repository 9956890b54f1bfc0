//! Frame loop controller
//!
//! Idle -> Running -> Stopped. Each frame polls input, runs one simulation
//! tick, plays its sounds and renders the result. Single-threaded; input
//! from other threads arrives through the [`InputReader`] queue.

use std::time::{Duration, Instant};

use crate::assets::{AssetLoader, AssetManifest, preload};
use crate::audio::AudioManager;
use crate::config::GameConfig;
use crate::error::{EngineError, Result};
use crate::input::InputReader;
use crate::render::{BallAnimation, Frame, NullRenderer, Renderer};
use crate::sim::{GameEvent, GamePhase, GameState, Outcome, tick};

/// Paces the loop. Returns the wall time since the previous frame.
pub trait FrameClock {
    fn wait_next_frame(&mut self) -> Duration;
}

/// Sleeps until the next frame deadline (display-rate pacing)
#[derive(Debug, Clone)]
pub struct FixedRateClock {
    interval: Duration,
    next: Option<Instant>,
    last: Instant,
}

impl FixedRateClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
            last: Instant::now(),
        }
    }
}

impl FrameClock for FixedRateClock {
    fn wait_next_frame(&mut self) -> Duration {
        let now = Instant::now();
        let deadline = self.next.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }

        let now = Instant::now();
        // Fell behind: don't try to catch up with a burst of frames
        self.next = Some((deadline + self.interval).max(now));
        let dt = now - self.last;
        self.last = now;
        dt
    }
}

/// Never sleeps; every frame is exactly `step` long
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    step: Duration,
    pub frames: u64,
}

impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self { step, frames: 0 }
    }
}

impl FrameClock for ManualClock {
    fn wait_next_frame(&mut self) -> Duration {
        self.frames += 1;
        self.step
    }
}

/// One game session from asset loading to the final score
pub struct GameLoop {
    state: GameState,
    input: InputReader,
    audio: AudioManager,
    renderer: Box<dyn Renderer>,
    clock: Box<dyn FrameClock>,
    animation: BallAnimation,
    manifest: AssetManifest,
    asset_timeout: Duration,
    autoplay: bool,
}

impl GameLoop {
    /// Validate the config and set up an idle session. Renders nothing and
    /// logs sounds until a renderer or audio manager is supplied.
    pub fn new(config: &GameConfig, seed: u64, input: InputReader) -> Result<Self> {
        let state = GameState::new(config, seed)?;
        log::info!("Session created with seed {seed}");
        Ok(Self {
            state,
            input,
            audio: AudioManager::default(),
            renderer: Box::new(NullRenderer),
            clock: Box::new(FixedRateClock::new(config.timing.frame_interval())),
            animation: BallAnimation::new(config.timing.animation_interval()),
            manifest: AssetManifest::standard(),
            asset_timeout: config.timing.asset_timeout(),
            autoplay: config.autoplay,
        })
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_audio(mut self, audio: AudioManager) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn FrameClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_manifest(mut self, manifest: AssetManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<()> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.phase.as_str(),
            })
        }
    }

    /// Wait for every asset, build the block grid and start running
    pub fn start(&mut self, loader: &dyn AssetLoader) -> Result<()> {
        self.expect_phase(GamePhase::Idle)?;
        preload(loader, &self.manifest, self.asset_timeout)?;
        self.state.begin();
        self.render();
        Ok(())
    }

    /// Run exactly one input -> simulate -> sound -> render cycle
    pub fn step(&mut self) -> Result<Option<Outcome>> {
        self.expect_phase(GamePhase::Running)?;

        let input = self.input.poll(self.autoplay);
        let events = tick(&mut self.state, &input);

        let mut outcome = None;
        for event in &events {
            match event {
                GameEvent::Launched { .. } => self.animation.start(),
                GameEvent::Finished(o) => outcome = Some(*o),
                _ => {}
            }
        }
        self.audio.play_events(&events);
        self.render();

        log::trace!(
            "Frame {}: ball {:?}, {} events",
            self.state.time_ticks,
            self.state.ball.pos,
            events.len()
        );
        Ok(outcome)
    }

    /// Step on the clock's cadence until the session ends
    pub fn run(&mut self) -> Result<Outcome> {
        self.expect_phase(GamePhase::Running)?;
        loop {
            let dt = self.clock.wait_next_frame();
            self.animation.advance(dt);
            if let Some(outcome) = self.step()? {
                return Ok(outcome);
            }
        }
    }

    fn render(&mut self) {
        let frame = Frame::new(&self.state, self.animation.frame());
        if let Err(e) = self.renderer.render(&frame) {
            log::warn!("Render error: {e}");
        }
    }
}
