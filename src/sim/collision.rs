//! Axis-aligned collision detection
//!
//! Every check is predictive: the moving box is tested at the position it
//! will occupy after its pending velocity is applied, so a ball never gets
//! a frame inside a block or wall before it reacts.

use glam::Vec2;

use super::state::{Ball, Paddle};
use crate::config::WorldConfig;

/// Axis-aligned rectangle, y growing downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Rectangle from its top-left corner and size
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }
}

/// Does `moving` (already placed at its next position) overlap `target`?
#[inline]
pub fn overlaps(moving: &Aabb, target: &Aabb) -> bool {
    moving.overlaps(target)
}

/// Predictive ball check against any obstacle
pub fn ball_collides(ball: &Ball, target: &Aabb) -> bool {
    overlaps(&ball.next_bounds(), target)
}

/// Normalized contact position along a paddle.
///
/// Maps `paddle_x..=paddle_x + width` linearly onto `-1.0..=1.0`; contacts
/// past either edge (a ball clipping a corner) are clamped.
pub fn touch_offset(paddle_x: f32, width: f32, contact_x: f32) -> f32 {
    let from_right = paddle_x + width - contact_x;
    let from_left = width - from_right;
    (from_left * 2.0 / width - 1.0).clamp(-1.0, 1.0)
}

/// Which world edges a box would cross
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundsBreach {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl BoundsBreach {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Ball's next position against the world rectangle. The side and top
/// edges must be crossed; reaching the bottom edge is enough to fall out.
pub fn ball_bounds_breach(ball: &Ball, world: &WorldConfig) -> BoundsBreach {
    let next = ball.next_bounds();
    BoundsBreach {
        left: next.left() < 0.0,
        right: next.right() > world.width,
        top: next.top() < 0.0,
        bottom: next.bottom() >= world.height,
    }
}

/// Paddle's next position against the side walls. Touching counts.
pub fn paddle_bounds_breach(paddle: &Paddle, world: &WorldConfig) -> BoundsBreach {
    let next = paddle.next_bounds();
    BoundsBreach {
        left: next.left() <= 0.0,
        right: next.right() >= world.width,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldConfig {
        WorldConfig {
            width: 640.0,
            height: 360.0,
        }
    }

    fn paddle() -> Paddle {
        Paddle::new(Vec2::new(280.0, 300.0), Vec2::new(100.0, 14.0), 6.0)
    }

    #[test]
    fn test_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let right = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        let below = Aabb::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0));
        assert!(!overlaps(&a, &right));
        assert!(!overlaps(&a, &below));
    }

    #[test]
    fn test_ball_check_uses_next_position() {
        let mut ball = Ball::new(Vec2::new(0.0, 0.0), Vec2::new(20.0, 20.0), 3.0);
        let target = Aabb::new(Vec2::new(22.0, 0.0), Vec2::new(10.0, 20.0));
        assert!(!ball_collides(&ball, &target));
        ball.vel = Vec2::new(3.0, 0.0);
        assert!(ball_collides(&ball, &target));
    }

    #[test]
    fn test_touch_offset_edges_and_center() {
        let p = paddle();
        assert!((p.touch_offset(280.0) + 1.0).abs() < 1e-6);
        assert!((p.touch_offset(380.0) - 1.0).abs() < 1e-6);
        assert!(p.touch_offset(330.0).abs() < 1e-6);
        assert!((p.touch_offset(305.0) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_touch_offset_clamped_past_edges() {
        let p = paddle();
        assert_eq!(p.touch_offset(250.0), -1.0);
        assert_eq!(p.touch_offset(400.0), 1.0);
    }

    #[test]
    fn test_ball_breach_each_edge() {
        let w = world();
        let mut ball = Ball::new(Vec2::new(-2.0, 100.0), Vec2::new(20.0, 20.0), 3.0);
        ball.vel = Vec2::new(-3.0, 0.0);
        assert_eq!(
            ball_bounds_breach(&ball, &w),
            BoundsBreach {
                left: true,
                ..Default::default()
            }
        );

        ball.pos = Vec2::new(619.0, 100.0);
        ball.vel = Vec2::new(3.0, 0.0);
        assert!(ball_bounds_breach(&ball, &w).right);

        ball.pos = Vec2::new(100.0, 1.0);
        ball.vel = Vec2::new(0.0, -3.0);
        assert!(ball_bounds_breach(&ball, &w).top);

        ball.pos = Vec2::new(100.0, 337.0);
        ball.vel = Vec2::new(0.0, 3.0);
        assert!(ball_bounds_breach(&ball, &w).bottom);
    }

    #[test]
    fn test_ball_inside_world_no_breach() {
        let mut ball = Ball::new(Vec2::new(300.0, 200.0), Vec2::new(20.0, 20.0), 3.0);
        ball.vel = Vec2::new(3.0, -3.0);
        assert!(!ball_bounds_breach(&ball, &world()).any());
    }

    #[test]
    fn test_paddle_breach_counts_touching() {
        let w = world();
        let mut p = paddle();
        p.pos.x = 6.0;
        p.dx = -6.0;
        assert!(paddle_bounds_breach(&p, &w).left);

        p.pos.x = 534.0;
        p.dx = 6.0;
        assert!(paddle_bounds_breach(&p, &w).right);

        p.pos.x = 300.0;
        assert!(!paddle_bounds_breach(&p, &w).any());
    }
}
