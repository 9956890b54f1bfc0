//! One simulation frame
//!
//! Reads the tick's input, integrates motion, then detects and resolves
//! collisions against the positions the next frame would reach.

use super::motion::integrate;
use super::resolve::resolve;
use super::state::{Direction, GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held movement key, if any
    pub direction: Option<Direction>,
    /// Launch the ball (one-shot)
    pub fire: bool,
    /// Idle/demo mode - the paddle plays itself
    pub idle_mode: bool,
}

/// Steer toward the ball with a slowly wandering aim point so rebounds
/// don't settle into a vertical loop, and launch as soon as possible
fn autopilot(state: &GameState) -> TickInput {
    let paddle = &state.paddle;
    let time_factor = state.time_ticks as f32 * 0.01;
    let wander = (time_factor.sin() * 0.3 + (time_factor * 0.7).sin() * 0.15) * paddle.size.x;

    let target = state.ball.center_x() + state.ball.vel.x - wander;
    let delta = target - paddle.center_x();
    let direction = if delta < -paddle.speed {
        Some(Direction::Left)
    } else if delta > paddle.speed {
        Some(Direction::Right)
    } else {
        None
    };

    TickInput {
        direction,
        fire: state.is_attached(),
        idle_mode: true,
    }
}

/// Advance the game state by one frame. Does nothing unless the session is
/// running; returns the events the frame produced.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if !state.is_running() {
        return events;
    }

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        *input
    };

    state.time_ticks += 1;

    state.paddle.steer(input.direction);
    if input.fire {
        events.extend(state.fire());
    }

    integrate(state);
    if let Some(outcome) = resolve(state, &mut events) {
        log::trace!("Tick {} ended the session: {outcome:?}", state.time_ticks);
    }
    events
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::{GamePhase, Outcome, PaddleBallLink};

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(&GameConfig::default(), seed).unwrap();
        state.begin();
        state
    }

    #[test]
    fn test_idle_session_does_not_tick() {
        let mut state = GameState::new(&GameConfig::default(), 1).unwrap();
        let events = tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, 0);
        assert!(state.is_attached());
    }

    #[test]
    fn test_attached_ball_follows_paddle() {
        let mut state = running(1);
        let input = TickInput {
            direction: Some(Direction::Left),
            ..Default::default()
        };
        for _ in 0..5 {
            tick(&mut state, &input);
        }
        assert_eq!(state.paddle.pos.x, 250.0);
        assert_eq!(state.ball.pos.x, 290.0);
        assert_eq!(state.ball.pos.y, 280.0);
    }

    #[test]
    fn test_fire_then_ball_moves_up() {
        let mut state = running(1);
        let events = tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        assert!(matches!(events[0], GameEvent::Launched { .. }));
        assert_eq!(state.link, PaddleBallLink::Detached);
        assert_eq!(state.ball.pos.y, 277.0);
    }

    #[test]
    fn test_fire_while_free_is_noop() {
        let mut state = running(1);
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire);
        let vel = state.ball.vel;

        let events = tick(&mut state, &fire);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Launched { .. })));
        assert_eq!(state.ball.vel, vel);
    }

    #[test]
    fn test_loss_stops_integration() {
        let mut state = running(1);
        state.link = PaddleBallLink::Detached;
        state.ball.pos = Vec2::new(10.0, 335.0);
        state.ball.vel = Vec2::new(0.0, 3.0);

        let events = tick(&mut state, &TickInput::default());
        assert!(events.contains(&GameEvent::Finished(Outcome::Lost { score: 0 })));
        assert_eq!(state.phase, GamePhase::Stopped);

        let pos = state.ball.pos;
        let ticks = state.time_ticks;
        assert!(tick(&mut state, &TickInput::default()).is_empty());
        assert_eq!(state.ball.pos, pos);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_paddle_cannot_push_ball_through_wall() {
        let mut state = running(1);
        state.link = PaddleBallLink::Detached;
        state.paddle.pos.x = 16.0;
        state.ball.pos = Vec2::new(2.0, 279.0);
        state.ball.vel = Vec2::new(0.0, 3.0);

        let input = TickInput {
            direction: Some(Direction::Left),
            ..Default::default()
        };
        let events = tick(&mut state, &input);
        assert_eq!(state.paddle.pos.x, 10.0);
        assert_eq!(state.ball.pos.x, 0.0);
        assert_eq!(state.ball.vel.y, -3.0);
        assert!(events.contains(&GameEvent::Bump(crate::sim::BumpSource::Paddle)));

        tick(&mut state, &input);
        assert!(state.ball.bounds().left() >= 0.0);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = running(99999);
        let mut state2 = running(99999);

        let inputs = [
            TickInput {
                direction: Some(Direction::Right),
                ..Default::default()
            },
            TickInput {
                fire: true,
                ..Default::default()
            },
            TickInput {
                direction: Some(Direction::Left),
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, input);
                tick(&mut state2, input);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.ball.pos, state2.ball.pos);
        assert_eq!(state1.ball.vel, state2.ball.vel);
        assert_eq!(state1.score, state2.score);
    }

    #[test]
    fn test_autopilot_launches_and_plays() {
        let mut state = running(5);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.link, PaddleBallLink::Detached);

        for _ in 0..2_000 {
            if !state.is_running() {
                break;
            }
            tick(&mut state, &input);
        }
        assert!(state.score > 0);
    }
}
