//! Per-frame motion integration
//!
//! Velocities are fixed displacements per frame; there is no delta time.

use super::state::{Ball, GameState, Paddle, PaddleBallLink};

/// Move the paddle by its velocity, dragging an attached ball along
pub fn move_paddle(paddle: &mut Paddle, ball: &mut Ball, link: PaddleBallLink) {
    if paddle.dx != 0.0 {
        paddle.pos.x += paddle.dx;
        if link == PaddleBallLink::Attached {
            ball.pos.x += paddle.dx;
        }
    }
}

/// Move the ball by its velocity
pub fn move_ball(ball: &mut Ball) {
    if ball.vel.x != 0.0 {
        ball.pos.x += ball.vel.x;
    }
    if ball.vel.y != 0.0 {
        ball.pos.y += ball.vel.y;
    }
}

/// Advance paddle then ball by one frame
pub fn integrate(state: &mut GameState) {
    move_paddle(&mut state.paddle, &mut state.ball, state.link);
    move_ball(&mut state.ball);
}
