//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-frame displacement, no delta time
//! - Seeded RNG only
//! - Stable iteration order (blocks in creation order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod motion;
pub mod resolve;
pub mod state;
pub mod tick;

pub use collision::{Aabb, BoundsBreach, ball_collides, overlaps, touch_offset};
pub use motion::integrate;
pub use resolve::resolve;
pub use state::{
    Ball, Block, BumpSource, Direction, GameEvent, GamePhase, GameState, Outcome, Paddle,
    PaddleBallLink,
};
pub use tick::{TickInput, tick};
