//! Ball and axis-aligned box shared by the court games

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A ball entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }

    /// Move by one tick of velocity
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }
}

/// Axis-aligned box, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Grow every side by `amount`
    pub fn expand(&self, amount: f32) -> Rect {
        Rect {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    /// Box test of the ball's bounding square against this rect
    pub fn overlaps_ball(&self, ball: &Ball) -> bool {
        self.expand(ball.radius).contains(ball.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_includes_radius() {
        let rect = Rect::from_center(Vec2::new(10.0, 10.0), Vec2::new(4.0, 4.0));
        let touching = Ball::new(Vec2::new(14.5, 10.0), Vec2::ZERO, 3.0);
        let clear = Ball::new(Vec2::new(15.5, 10.0), Vec2::ZERO, 3.0);
        assert!(rect.overlaps_ball(&touching));
        assert!(!rect.overlaps_ball(&clear));
    }

    #[test]
    fn test_advance_moves_by_velocity() {
        let mut ball = Ball::new(Vec2::new(1.0, 2.0), Vec2::new(0.5, -1.0), 1.0);
        ball.advance();
        assert_eq!(ball.pos, Vec2::new(1.5, 1.0));
    }
}
