//! Game state and core simulation types
//!
//! Everything a session needs lives in [`GameState`]; nothing is global.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, touch_offset};
use crate::config::{GameConfig, GridConfig, WorldConfig};
use crate::error::Result;

/// Session lifecycle. `Stopped` is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, assets not yet loaded and no blocks built
    Idle,
    /// Frames are being simulated
    Running,
    /// Won or lost
    Stopped,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Stopped => "stopped",
        }
    }
}

/// Whether the ball rides on the paddle or flies on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddleBallLink {
    /// Resting on the paddle, carried by it, zero velocity
    Attached,
    /// Launched
    Detached,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every block destroyed
    Won { score: u32 },
    /// Ball fell past the bottom of the world
    Lost { score: u32 },
}

impl Outcome {
    pub fn score(&self) -> u32 {
        match *self {
            Outcome::Won { score } | Outcome::Lost { score } => score,
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Won { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won { score } => write!(f, "You win! :) Your score: {score}"),
            Outcome::Lost { score } => write!(f, "Game over! Your score: {score}"),
        }
    }
}

/// What the ball bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpSource {
    Wall,
    Block,
    Paddle,
}

/// Side effects of a tick, consumed by audio and the loop controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Play the bump sound
    Bump(BumpSource),
    /// Block at this index (creation order) was deactivated
    BlockDestroyed { index: usize },
    /// Ball left the paddle with this horizontal velocity
    Launched { dx: f32 },
    /// Terminal condition reached
    Finished(Outcome),
}

/// Paddle steering intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Displacement per frame
    pub vel: Vec2,
    /// Fixed magnitude used for every reflection
    pub speed: f32,
}

impl Ball {
    pub fn new(pos: Vec2, size: Vec2, speed: f32) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            speed,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Where the ball will be after one more frame
    pub fn next_pos(&self) -> Vec2 {
        self.pos + self.vel
    }

    pub fn next_bounds(&self) -> Aabb {
        Aabb::new(self.next_pos(), self.size)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    /// Give the ball its launch velocity: straight up at full speed with a
    /// whole-unit horizontal component in `[-speed, speed]`
    pub fn launch(&mut self, rng: &mut impl Rng) -> f32 {
        let bound = self.speed.floor() as i32;
        let dx = rng.random_range(-bound..=bound) as f32;
        self.vel = Vec2::new(dx, -self.speed);
        dx
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal displacement this frame: `-speed`, `0` or `speed`
    pub dx: f32,
    pub speed: f32,
}

impl Paddle {
    pub fn new(pos: Vec2, size: Vec2, speed: f32) -> Self {
        Self {
            pos,
            size,
            dx: 0.0,
            speed,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn next_bounds(&self) -> Aabb {
        Aabb::new(self.pos + Vec2::new(self.dx, 0.0), self.size)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    /// Normalized contact position, -1 at the left edge to +1 at the right
    pub fn touch_offset(&self, contact_x: f32) -> f32 {
        touch_offset(self.pos.x, self.size.x, contact_x)
    }

    pub fn steer(&mut self, direction: Option<Direction>) {
        self.dx = direction.map_or(0.0, |d| d.sign() * self.speed);
    }

    pub fn stop(&mut self) {
        self.dx = 0.0;
    }
}

/// A destructible block. Once deactivated it stays that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub pos: Vec2,
    pub size: Vec2,
    active: bool,
}

impl Block {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the launch RNG was created from
    pub seed: u64,
    rng: Pcg32,
    pub world: WorldConfig,
    grid: GridConfig,
    pub ball: Ball,
    pub paddle: Paddle,
    pub link: PaddleBallLink,
    /// Row-major, in creation order
    pub blocks: Vec<Block>,
    /// Blocks destroyed so far
    pub score: u32,
    pub phase: GamePhase,
    pub outcome: Option<Outcome>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Create an idle session with the ball resting on the paddle
    pub fn new(config: &GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;

        let ball = Ball::new(
            Vec2::new(config.ball.x, config.ball.y),
            Vec2::new(config.ball.width, config.ball.height),
            config.ball.speed,
        );
        let paddle = Paddle::new(
            Vec2::new(config.paddle.x, config.paddle.y),
            Vec2::new(config.paddle.width, config.paddle.height),
            config.paddle.speed,
        );

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            world: config.world,
            grid: config.grid,
            ball,
            paddle,
            link: PaddleBallLink::Attached,
            blocks: Vec::new(),
            score: 0,
            phase: GamePhase::Idle,
            outcome: None,
            time_ticks: 0,
        })
    }

    /// Build the block grid and start simulating. Only valid while idle.
    pub fn begin(&mut self) {
        if self.phase != GamePhase::Idle {
            log::warn!("Ignoring begin() while {}", self.phase.as_str());
            return;
        }
        self.build_grid();
        self.phase = GamePhase::Running;
    }

    fn build_grid(&mut self) {
        let grid = self.grid;
        let size = Vec2::new(grid.block_width, grid.block_height);
        self.blocks = (0..grid.rows)
            .flat_map(|row| (0..grid.cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                let pos = Vec2::new(
                    grid.origin_x + col as f32 * grid.stride_x,
                    grid.origin_y + row as f32 * grid.stride_y,
                );
                Block::new(pos, size)
            })
            .collect();
        log::info!("Built {}x{} block grid ({} blocks)", grid.rows, grid.cols, self.blocks.len());
    }

    pub fn total_blocks(&self) -> u32 {
        self.blocks.len() as u32
    }

    pub fn active_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.is_active())
    }

    pub fn is_attached(&self) -> bool {
        self.link == PaddleBallLink::Attached
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Launch the ball if it is still on the paddle. Returns the launch
    /// event, or `None` when the ball is already free.
    pub fn fire(&mut self) -> Option<GameEvent> {
        if self.link != PaddleBallLink::Attached {
            return None;
        }
        let dx = self.ball.launch(&mut self.rng);
        self.link = PaddleBallLink::Detached;
        log::info!("Ball launched (dx = {dx})");
        Some(GameEvent::Launched { dx })
    }

    /// Record a terminal condition and stop the session for good
    pub fn finish(&mut self, outcome: Outcome) -> GameEvent {
        self.phase = GamePhase::Stopped;
        self.outcome = Some(outcome);
        log::info!("{outcome}");
        GameEvent::Finished(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(&GameConfig::default(), 42).unwrap()
    }

    #[test]
    fn test_new_session_is_idle_and_attached() {
        let state = state();
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.is_attached());
        assert!(state.blocks.is_empty());
        assert_eq!(state.ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_begin_builds_row_major_grid() {
        let mut state = state();
        state.begin();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.total_blocks(), 32);
        assert_eq!(state.blocks[0].pos, Vec2::new(65.0, 35.0));
        assert_eq!(state.blocks[1].pos, Vec2::new(129.0, 35.0));
        assert_eq!(state.blocks[8].pos, Vec2::new(65.0, 59.0));
        assert_eq!(state.blocks[31].pos, Vec2::new(65.0 + 7.0 * 64.0, 35.0 + 3.0 * 24.0));
    }

    #[test]
    fn test_begin_twice_keeps_grid() {
        let mut state = state();
        state.begin();
        state.blocks[0].deactivate();
        state.begin();
        assert!(!state.blocks[0].is_active());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.grid.cols = 0;
        assert!(GameState::new(&config, 1).is_err());
    }

    #[test]
    fn test_fire_launches_once() {
        let mut state = state();
        let event = state.fire();
        assert!(matches!(event, Some(GameEvent::Launched { .. })));
        assert_eq!(state.link, PaddleBallLink::Detached);
        assert_eq!(state.ball.vel.y, -state.ball.speed);
        assert!(state.ball.vel.x.abs() <= state.ball.speed);
        assert_eq!(state.ball.vel.x.fract(), 0.0);

        let vel = state.ball.vel;
        assert!(state.fire().is_none());
        assert_eq!(state.ball.vel, vel);
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(Outcome::Won { score: 32 }.to_string(), "You win! :) Your score: 32");
        assert_eq!(Outcome::Lost { score: 5 }.to_string(), "Game over! Your score: 5");
    }

    #[test]
    fn test_steer() {
        let mut paddle = Paddle::new(Vec2::ZERO, Vec2::new(100.0, 14.0), 6.0);
        paddle.steer(Some(Direction::Left));
        assert_eq!(paddle.dx, -6.0);
        paddle.steer(Some(Direction::Right));
        assert_eq!(paddle.dx, 6.0);
        paddle.steer(None);
        assert_eq!(paddle.dx, 0.0);
    }
}
