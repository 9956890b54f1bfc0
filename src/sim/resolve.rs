//! Collision response
//!
//! Each resolver runs a predictive check and, on contact, rewrites velocity
//! and position, emits bump events and, for terminal contacts, stops the
//! session.

use super::collision::{ball_bounds_breach, ball_collides, paddle_bounds_breach};
use super::state::{Ball, BumpSource, GameEvent, GameState, Outcome, PaddleBallLink};

/// Reverse vertical direction, keeping magnitude
#[inline]
pub fn reflect_vertical(ball: &mut Ball) {
    ball.vel.y = -ball.vel.y;
}

/// Bounce the ball off the side and top walls. Falling through the bottom
/// ends the session; the ball is left where it is.
pub fn resolve_ball_bounds(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<Outcome> {
    let world = state.world;
    let breach = ball_bounds_breach(&state.ball, &world);
    let ball = &mut state.ball;

    if breach.left {
        ball.pos.x = 0.0;
        ball.vel.x = ball.speed;
        events.push(GameEvent::Bump(BumpSource::Wall));
    }
    if breach.right {
        ball.pos.x = world.width - ball.size.x;
        ball.vel.x = -ball.speed;
        events.push(GameEvent::Bump(BumpSource::Wall));
    }
    if breach.top {
        ball.pos.y = 0.0;
        ball.vel.y = ball.speed;
        events.push(GameEvent::Bump(BumpSource::Wall));
    }
    if breach.bottom {
        let outcome = Outcome::Lost { score: state.score };
        events.push(state.finish(outcome));
        return Some(outcome);
    }
    None
}

/// Keep the paddle between the side walls, halting it on contact. An
/// attached ball is shifted by the same correction so it stays seated.
pub fn resolve_paddle_bounds(state: &mut GameState) {
    let world = state.world;
    let breach = paddle_bounds_breach(&state.paddle, &world);
    if !breach.any() {
        return;
    }

    let paddle = &mut state.paddle;
    let before = paddle.pos.x;
    if breach.left {
        paddle.pos.x = 0.0;
        paddle.stop();
    }
    if breach.right {
        paddle.pos.x = world.width - paddle.size.x;
        paddle.stop();
    }
    if state.link == PaddleBallLink::Attached {
        state.ball.pos.x += paddle.pos.x - before;
    }
}

/// Destroy the first active block (creation order) the ball is about to
/// enter and bounce off it. At most one block is resolved per frame even if
/// the ball overlaps several. Destroying the last block wins the session.
pub fn resolve_blocks(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<Outcome> {
    let ball = &state.ball;
    let index = state
        .blocks
        .iter()
        .position(|block| block.is_active() && ball_collides(ball, &block.bounds()))?;

    state.blocks[index].deactivate();
    reflect_vertical(&mut state.ball);
    state.score += 1;
    log::debug!("Block {index} destroyed, score {}/{}", state.score, state.total_blocks());
    events.push(GameEvent::BlockDestroyed { index });
    events.push(GameEvent::Bump(BumpSource::Block));

    if state.score >= state.total_blocks() {
        let outcome = Outcome::Won { score: state.score };
        events.push(state.finish(outcome));
        return Some(outcome);
    }
    None
}

/// Bounce a falling ball off the paddle. The rebound angle follows where it
/// touched: center sends it straight up, the edges send it off sideways.
pub fn resolve_paddle_bounce(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !ball_collides(&state.ball, &state.paddle.bounds()) {
        return;
    }

    let world = state.world;
    let paddle = &state.paddle;
    let ball = &mut state.ball;
    if paddle.dx != 0.0 {
        // The walls were resolved already; a push must not undo them
        ball.pos.x = (ball.pos.x + paddle.dx).clamp(0.0, world.width - ball.size.x);
    }
    // Already heading up: let it slide off instead of re-triggering
    if ball.vel.y <= 0.0 {
        return;
    }

    ball.vel.y = -ball.speed;
    ball.vel.x = ball.speed * paddle.touch_offset(ball.center_x());
    events.push(GameEvent::Bump(BumpSource::Paddle));
}

/// Run every resolver in order: walls, paddle walls, blocks, paddle.
/// Returns the outcome if the frame ended the session.
pub fn resolve(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<Outcome> {
    let free = state.link == PaddleBallLink::Detached;

    if free {
        if let Some(outcome) = resolve_ball_bounds(state, events) {
            return Some(outcome);
        }
    }
    resolve_paddle_bounds(state);
    if free {
        if let Some(outcome) = resolve_blocks(state, events) {
            return Some(outcome);
        }
        resolve_paddle_bounce(state, events);
    }
    None
}
