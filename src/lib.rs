//! Brick Breaker - a classic paddle, ball and block-grid arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, scoring)
//! - `game_loop`: Frame loop tying input, simulation, audio and rendering
//! - `input`: Keyboard events folded into per-tick intent
//! - `assets`: One-shot preload barrier for sprites and sounds
//! - `audio`: Bump sound dispatch
//! - `render`: Frame snapshots and renderers
//! - `config`: Data-driven session configuration

pub mod assets;
pub mod audio;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod render;
pub mod sim;

pub use config::GameConfig;
pub use error::{EngineError, Result};
pub use game_loop::GameLoop;

/// Game configuration constants
pub mod consts {
    /// World dimensions
    pub const WORLD_WIDTH: f32 = 640.0;
    pub const WORLD_HEIGHT: f32 = 360.0;

    /// Ball defaults - starts resting on the paddle, centered
    pub const BALL_X: f32 = 320.0;
    pub const BALL_Y: f32 = 280.0;
    pub const BALL_SIZE: f32 = 20.0;
    /// Per-frame displacement along each axis once launched
    pub const BALL_SPEED: f32 = 3.0;

    /// Paddle defaults
    pub const PADDLE_X: f32 = 280.0;
    pub const PADDLE_Y: f32 = 300.0;
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 14.0;
    pub const PADDLE_SPEED: f32 = 6.0;

    /// Block grid defaults
    pub const BLOCK_ROWS: u32 = 4;
    pub const BLOCK_COLS: u32 = 8;
    pub const BLOCK_WIDTH: f32 = 60.0;
    pub const BLOCK_HEIGHT: f32 = 20.0;
    pub const BLOCK_STRIDE_X: f32 = 64.0;
    pub const BLOCK_STRIDE_Y: f32 = 24.0;
    pub const GRID_ORIGIN_X: f32 = 65.0;
    pub const GRID_ORIGIN_Y: f32 = 35.0;

    /// Display-synchronized frame cadence (60 Hz)
    pub const FRAME_INTERVAL_MS: u64 = 16;
    /// Ball sprite animation
    pub const BALL_ANIMATION_FRAMES: u8 = 4;
    pub const BALL_ANIMATION_INTERVAL_MS: u64 = 100;

    /// How long session start waits for every asset before giving up
    pub const ASSET_TIMEOUT_MS: u64 = 10_000;
}
