//! Session configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! classic layout in [`crate::consts`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, Result};

/// Playfield size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }
}

/// Ball start position, size and speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            x: BALL_X,
            y: BALL_Y,
            width: BALL_SIZE,
            height: BALL_SIZE,
            speed: BALL_SPEED,
        }
    }
}

/// Paddle start position, size and speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            x: PADDLE_X,
            y: PADDLE_Y,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
        }
    }
}

/// Block grid layout. Block (row, col) sits at
/// `origin + (col * stride_x, row * stride_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub stride_x: f32,
    pub stride_y: f32,
    pub block_width: f32,
    pub block_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: BLOCK_ROWS,
            cols: BLOCK_COLS,
            origin_x: GRID_ORIGIN_X,
            origin_y: GRID_ORIGIN_Y,
            stride_x: BLOCK_STRIDE_X,
            stride_y: BLOCK_STRIDE_Y,
            block_width: BLOCK_WIDTH,
            block_height: BLOCK_HEIGHT,
        }
    }
}

impl GridConfig {
    pub fn block_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Bottom-right corner of the last block
    fn extent(&self) -> (f32, f32) {
        let cols = self.cols.saturating_sub(1) as f32;
        let rows = self.rows.saturating_sub(1) as f32;
        (
            self.origin_x + cols * self.stride_x + self.block_width,
            self.origin_y + rows * self.stride_y + self.block_height,
        )
    }
}

/// Wall-clock cadences (none of these affect physics)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub frame_interval_ms: u64,
    pub animation_interval_ms: u64,
    pub asset_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: FRAME_INTERVAL_MS,
            animation_interval_ms: BALL_ANIMATION_INTERVAL_MS,
            asset_timeout_ms: ASSET_TIMEOUT_MS,
        }
    }
}

impl TimingConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_millis(self.asset_timeout_ms)
    }
}

/// Audio preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub ball: BallConfig,
    pub paddle: PaddleConfig,
    pub grid: GridConfig,
    pub timing: TimingConfig,
    pub audio: AudioConfig,
    /// RNG seed for launch angles; `None` lets the caller pick one
    pub seed: Option<u64>,
    /// Let the paddle play itself
    pub autoplay: bool,
}

impl GameConfig {
    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject layouts the simulation cannot run
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        positive("world.width", world.width)?;
        positive("world.height", world.height)?;

        positive("ball.width", self.ball.width)?;
        positive("ball.height", self.ball.height)?;
        positive("ball.speed", self.ball.speed)?;
        if self.ball.speed < 1.0 {
            return Err(EngineError::invalid(
                "ball.speed",
                "must be at least 1 so a launch has a whole-unit horizontal range",
            ));
        }
        fits("ball", self.ball.x, self.ball.y, self.ball.width, self.ball.height, world)?;

        positive("paddle.width", self.paddle.width)?;
        positive("paddle.height", self.paddle.height)?;
        positive("paddle.speed", self.paddle.speed)?;
        fits(
            "paddle",
            self.paddle.x,
            self.paddle.y,
            self.paddle.width,
            self.paddle.height,
            world,
        )?;

        let grid = &self.grid;
        if grid.rows == 0 {
            return Err(EngineError::invalid("grid.rows", "must be at least 1"));
        }
        if grid.cols == 0 {
            return Err(EngineError::invalid("grid.cols", "must be at least 1"));
        }
        positive("grid.block_width", grid.block_width)?;
        positive("grid.block_height", grid.block_height)?;
        non_negative("grid.stride_x", grid.stride_x)?;
        non_negative("grid.stride_y", grid.stride_y)?;
        let (right, bottom) = grid.extent();
        if grid.origin_x < 0.0
            || grid.origin_y < 0.0
            || right > world.width
            || bottom > world.height
        {
            return Err(EngineError::invalid(
                "grid",
                format!(
                    "blocks span ({}, {})..({right}, {bottom}), outside the {}x{} world",
                    grid.origin_x, grid.origin_y, world.width, world.height
                ),
            ));
        }

        if self.timing.frame_interval_ms == 0 {
            return Err(EngineError::invalid("timing.frame_interval_ms", "must be non-zero"));
        }
        if self.timing.animation_interval_ms == 0 {
            return Err(EngineError::invalid("timing.animation_interval_ms", "must be non-zero"));
        }

        unit("audio.master_volume", self.audio.master_volume)?;
        unit("audio.sfx_volume", self.audio.sfx_volume)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must not be negative, got {value}")))
    }
}

fn unit(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be within 0.0..=1.0, got {value}")))
    }
}

fn fits(field: &'static str, x: f32, y: f32, w: f32, h: f32, world: &WorldConfig) -> Result<()> {
    let inside = x.is_finite()
        && y.is_finite()
        && x >= 0.0
        && y >= 0.0
        && x + w <= world.width
        && y + h <= world.height;
    if inside {
        Ok(())
    } else {
        Err(EngineError::invalid(
            field,
            format!(
                "{w}x{h} at ({x}, {y}) does not fit the {}x{} world",
                world.width, world.height
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.block_count(), 32);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "grid": { "rows": 2 }, "seed": 7 }"#).unwrap();
        assert_eq!(config.grid.rows, 2);
        assert_eq!(config.grid.cols, BLOCK_COLS);
        assert_eq!(config.ball.speed, BALL_SPEED);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_zero_rows_rejected() {
        let err = GameConfig::from_json(r#"{ "grid": { "rows": 0 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { field: "grid.rows", .. }));
    }

    #[test]
    fn test_zero_paddle_speed_rejected() {
        let mut config = GameConfig::default();
        config.paddle.speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { field: "paddle.speed", .. })
        ));
    }

    #[test]
    fn test_grid_outside_world_rejected() {
        let mut config = GameConfig::default();
        config.grid.cols = 20;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { field: "grid", .. })
        ));
    }

    #[test]
    fn test_paddle_outside_world_rejected() {
        let mut config = GameConfig::default();
        config.paddle.x = 600.0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { field: "paddle", .. })
        ));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_volume_range() {
        let mut config = GameConfig::default();
        config.audio.sfx_volume = 1.5;
        assert!(config.validate().is_err());
    }
}
