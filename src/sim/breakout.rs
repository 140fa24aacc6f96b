//! Breakout: paddle, ball, and a grid of bricks
//!
//! Court coordinates: origin top-left, y grows downward. Row 0 is the top row
//! of bricks and is worth the most.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::PaddleIntent;
use super::ball::{Ball, Rect};
use super::engine::{Contact, EndReason, Engine, Outcome};
use crate::consts::PHYSICS_INTERVAL_MS;

/// Breakout tuning parameters. Speeds are units per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutTuning {
    pub width: f32,
    pub height: f32,
    pub rows: u32,
    pub cols: u32,
    pub brick_height: f32,
    pub brick_gap: f32,
    /// Distance from the top wall to the first brick row
    pub brick_top: f32,
    /// How many top rows need two hits
    pub tough_rows: u32,
    /// Points per row step: row `r` is worth `row_points * (rows - r)`
    pub row_points: u64,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Distance from the bottom wall to the paddle's top edge
    pub paddle_lift: f32,
    pub paddle_speed: f32,
    pub ball_radius: f32,
    /// Vertical speed, kept constant through every bounce
    pub ball_speed: f32,
    /// Horizontal speed imparted by a hit at the very paddle edge
    pub max_deflection: f32,
    /// Smallest horizontal speed after a paddle hit
    pub min_horizontal: f32,
    pub lives: u32,
}

impl Default for BreakoutTuning {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 400.0,
            rows: 5,
            cols: 8,
            brick_height: 16.0,
            brick_gap: 4.0,
            brick_top: 40.0,
            tough_rows: 1,
            row_points: 10,
            paddle_width: 72.0,
            paddle_height: 10.0,
            paddle_lift: 30.0,
            paddle_speed: 7.0,
            ball_radius: 5.0,
            ball_speed: 4.5,
            max_deflection: 4.5,
            min_horizontal: 0.75,
            lives: 3,
        }
    }
}

impl BreakoutTuning {
    fn is_valid(&self) -> bool {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        positive(self.width)
            && positive(self.height)
            && self.rows > 0
            && self.cols > 0
            && positive(self.brick_height)
            && self.brick_gap.is_finite()
            && self.brick_gap >= 0.0
            && positive(self.brick_width())
            && self.brick_top >= 0.0
            && self.bricks_bottom() + 2.0 * self.ball_radius < self.paddle_top()
            && positive(self.paddle_width)
            && self.width > self.paddle_width
            && positive(self.paddle_height)
            && positive(self.paddle_lift)
            && self.paddle_speed.is_finite()
            && self.paddle_speed >= 0.0
            && positive(self.ball_radius)
            && positive(self.ball_speed)
            && self.max_deflection.is_finite()
            && (0.0..=self.max_deflection).contains(&self.min_horizontal)
            && self.lives > 0
    }

    fn brick_width(&self) -> f32 {
        (self.width - self.brick_gap * (self.cols as f32 + 1.0)) / self.cols as f32
    }

    /// Lower edge of the bottom brick row
    fn bricks_bottom(&self) -> f32 {
        self.brick_top + self.rows as f32 * (self.brick_height + self.brick_gap) - self.brick_gap
    }

    fn paddle_top(&self) -> f32 {
        self.height - self.paddle_lift
    }

    /// Points for destroying a brick in `row`
    pub fn brick_value(&self, row: u32) -> u64 {
        self.row_points * u64::from(self.rows - row)
    }

    /// Sum of every brick's value
    pub fn total_value(&self) -> u64 {
        (0..self.rows).map(|row| self.brick_value(row)).sum::<u64>() * u64::from(self.cols)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brick {
    pub row: u32,
    pub col: u32,
    pub rect: Rect,
    pub alive: bool,
    pub hit_points: u8,
    pub value: u64,
}

#[derive(Debug, Clone)]
pub struct Breakout {
    tuning: BreakoutTuning,
    /// Paddle center x
    paddle_x: f32,
    intent: PaddleIntent,
    ball: Ball,
    bricks: Vec<Brick>,
    score: u64,
    lives: u32,
}

/// Renderer view of a breakout game
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutSnapshot {
    pub width: f32,
    pub height: f32,
    pub paddle: Rect,
    pub ball: Ball,
    pub bricks: Vec<Brick>,
    pub score: u64,
    pub lives: u32,
}

impl Breakout {
    pub fn new(tuning: BreakoutTuning) -> Self {
        let tuning = if tuning.is_valid() {
            tuning
        } else {
            log::warn!("Invalid breakout court {tuning:?}, using defaults");
            BreakoutTuning::default()
        };
        Self {
            paddle_x: tuning.width / 2.0,
            intent: PaddleIntent::Hold,
            ball: Ball::new(Vec2::ZERO, Vec2::ZERO, tuning.ball_radius),
            bricks: Vec::new(),
            score: 0,
            lives: tuning.lives,
            tuning,
        }
    }

    pub fn tuning(&self) -> &BreakoutTuning {
        &self.tuning
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    fn paddle_rect(&self) -> Rect {
        let t = &self.tuning;
        Rect::new(
            Vec2::new(self.paddle_x - t.paddle_width / 2.0, t.paddle_top()),
            Vec2::new(self.paddle_x + t.paddle_width / 2.0, t.paddle_top() + t.paddle_height),
        )
    }

    fn build_bricks(&mut self) {
        let t = &self.tuning;
        let brick_width = t.brick_width();

        self.bricks = (0..t.rows)
            .flat_map(|row| (0..t.cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                let min = Vec2::new(
                    t.brick_gap + col as f32 * (brick_width + t.brick_gap),
                    t.brick_top + row as f32 * (t.brick_height + t.brick_gap),
                );
                Brick {
                    row,
                    col,
                    rect: Rect::new(min, min + Vec2::new(brick_width, t.brick_height)),
                    alive: true,
                    hit_points: if row < t.tough_rows { 2 } else { 1 },
                    value: t.brick_value(row),
                }
            })
            .collect();
    }

    /// New ball above the paddle heading up at a random slant
    fn serve(&mut self, rng: &mut Pcg32) {
        let t = &self.tuning;
        let slant = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball = Ball::new(
            Vec2::new(self.paddle_x, t.paddle_top() - 4.0 * t.ball_radius),
            Vec2::new(slant * t.ball_speed * 0.6, -t.ball_speed),
            t.ball_radius,
        );
    }

    fn bounce_off_walls(&mut self, out: &mut Vec<Outcome>) {
        let r = self.ball.radius;
        let width = self.tuning.width;
        let ball = &mut self.ball;
        let mut hit = false;

        if ball.pos.x - r <= 0.0 && ball.vel.x < 0.0 {
            ball.pos.x = r;
            ball.vel.x = -ball.vel.x;
            hit = true;
        } else if ball.pos.x + r >= width && ball.vel.x > 0.0 {
            ball.pos.x = width - r;
            ball.vel.x = -ball.vel.x;
            hit = true;
        }
        if ball.pos.y - r <= 0.0 && ball.vel.y < 0.0 {
            ball.pos.y = r;
            ball.vel.y = -ball.vel.y;
            hit = true;
        }

        if hit {
            out.push(Outcome::Contact(Contact::Wall));
        }
    }

    /// Hit at most one brick: the overlapping one nearest to where the ball
    /// came from, so a corner overlap never counts twice.
    fn hit_brick(&mut self, prev: Vec2, out: &mut Vec<Outcome>) {
        let ball = self.ball;
        let nearest = self
            .bricks
            .iter()
            .enumerate()
            .filter(|(_, brick)| brick.alive && brick.rect.overlaps_ball(&ball))
            .min_by(|(_, a), (_, b)| {
                let da = a.rect.center().distance_squared(prev);
                let db = b.rect.center().distance_squared(prev);
                da.total_cmp(&db)
            })
            .map(|(i, _)| i);

        let Some(index) = nearest else { return };

        // Reflect the component perpendicular to the face we came through
        let bounds = self.bricks[index].rect.expand(ball.radius);
        let from_side = prev.x < bounds.min.x || prev.x > bounds.max.x;
        let from_cap = prev.y < bounds.min.y || prev.y > bounds.max.y;
        if from_side && !from_cap {
            self.ball.vel.x = -self.ball.vel.x;
            self.ball.pos.x = prev.x;
        } else {
            self.ball.vel.y = -self.ball.vel.y;
            self.ball.pos.y = prev.y;
        }

        let brick = &mut self.bricks[index];
        brick.hit_points = brick.hit_points.saturating_sub(1);
        if brick.hit_points > 0 {
            out.push(Outcome::Contact(Contact::Brick));
            return;
        }

        brick.alive = false;
        let value = brick.value;
        self.score += value;
        out.push(Outcome::Contact(Contact::BrickDestroyed));
        out.push(Outcome::Scored {
            side: None,
            score: self.score,
            delta: value,
        });
    }

    fn bounce_off_paddle(&mut self, out: &mut Vec<Outcome>) {
        if self.ball.vel.y <= 0.0 || !self.paddle_rect().overlaps_ball(&self.ball) {
            return;
        }
        let t = &self.tuning;
        let half = t.paddle_width / 2.0;
        let offset = ((self.ball.pos.x - self.paddle_x) / half).clamp(-1.0, 1.0);

        let mut vx = offset * t.max_deflection;
        if vx.abs() < t.min_horizontal {
            // Dead-center hits keep drifting the way they came in
            let sign = if offset != 0.0 {
                offset.signum()
            } else if self.ball.vel.x != 0.0 {
                self.ball.vel.x.signum()
            } else {
                1.0
            };
            vx = sign * t.min_horizontal;
        }

        self.ball.vel = Vec2::new(vx, -self.ball.vel.y.abs());
        self.ball.pos.y = t.paddle_top() - self.ball.radius;
        out.push(Outcome::Contact(Contact::Paddle));
    }
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new(BreakoutTuning::default())
    }
}

impl Engine for Breakout {
    type Command = PaddleIntent;
    type Snapshot = BreakoutSnapshot;

    const GAME_ID: &'static str = "breakout";
    const BASE_INTERVAL_MS: f64 = PHYSICS_INTERVAL_MS;

    fn command(&mut self, intent: PaddleIntent) {
        self.intent = intent;
    }

    fn tick(&mut self, rng: &mut Pcg32, out: &mut Vec<Outcome>) {
        let half = self.tuning.paddle_width / 2.0;
        self.paddle_x = (self.paddle_x + self.intent.sign() * self.tuning.paddle_speed)
            .clamp(half, self.tuning.width - half);

        let prev = self.ball.pos;
        self.ball.advance();
        self.bounce_off_walls(out);

        self.hit_brick(prev, out);
        if self.bricks_left() == 0 {
            out.push(Outcome::Terminated {
                reason: EndReason::Cleared,
                final_score: self.score,
            });
            return;
        }

        self.bounce_off_paddle(out);

        if self.ball.pos.y - self.ball.radius > self.tuning.height {
            self.lives = self.lives.saturating_sub(1);
            out.push(Outcome::LifeLost { lives: self.lives });
            if self.lives == 0 {
                out.push(Outcome::Terminated {
                    reason: EndReason::NoLives,
                    final_score: self.score,
                });
                return;
            }
            self.serve(rng);
        }
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        self.paddle_x = self.tuning.width / 2.0;
        self.intent = PaddleIntent::Hold;
        self.score = 0;
        self.lives = self.tuning.lives;
        self.build_bricks();
        self.serve(rng);
    }

    fn snapshot(&self) -> BreakoutSnapshot {
        BreakoutSnapshot {
            width: self.tuning.width,
            height: self.tuning.height,
            paddle: self.paddle_rect(),
            ball: self.ball,
            bricks: self.bricks.clone(),
            score: self.score,
            lives: self.lives,
        }
    }

    fn score(&self) -> u64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;

    use super::*;
    use crate::events::{EventData, EventKind, GameEvent};
    use crate::settings::{GameConfig, SurfaceHandle};
    use crate::sim::{Game, GamePhase};

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn breakout() -> Breakout {
        let mut breakout = Breakout::default();
        breakout.reset(&mut rng());
        breakout
    }

    fn tick(breakout: &mut Breakout, rng: &mut Pcg32) -> Vec<Outcome> {
        let mut out = Vec::new();
        breakout.tick(rng, &mut out);
        out
    }

    /// Aim the ball straight up into `index` from just below it
    fn aim_at(breakout: &mut Breakout, index: usize) {
        let rect = breakout.bricks[index].rect;
        let speed = breakout.tuning.ball_speed;
        breakout.ball.pos = Vec2::new(rect.center().x, rect.max.y + breakout.ball.radius + 1.0);
        breakout.ball.vel = Vec2::new(0.0, -speed);
    }

    /// Send the ball off the bottom, far from the paddle
    fn drop_ball(breakout: &mut Breakout) {
        breakout.paddle_x = breakout.tuning.width - breakout.tuning.paddle_width / 2.0;
        breakout.ball.pos = Vec2::new(20.0, breakout.tuning.height + 1.0);
        breakout.ball.vel = Vec2::new(0.0, breakout.tuning.ball_speed);
    }

    #[test]
    fn test_layout_and_values() {
        let breakout = breakout();
        let t = breakout.tuning();
        assert_eq!(breakout.bricks().len(), (t.rows * t.cols) as usize);
        assert_eq!(breakout.bricks()[0].value, 50);
        assert_eq!(breakout.bricks().last().unwrap().value, 10);
        assert_eq!(breakout.bricks()[0].hit_points, 2);
        assert_eq!(breakout.bricks().last().unwrap().hit_points, 1);
        assert!(breakout.bricks().iter().all(|b| b.rect.max.x <= t.width));
    }

    #[test]
    fn test_invalid_geometry_falls_back_to_defaults() {
        let broken = [
            BreakoutTuning {
                brick_gap: 100.0,
                ..Default::default()
            },
            BreakoutTuning {
                brick_gap: -2.0,
                ..Default::default()
            },
            BreakoutTuning {
                rows: 30,
                ..Default::default()
            },
            BreakoutTuning {
                paddle_width: 0.0,
                ..Default::default()
            },
            BreakoutTuning {
                paddle_speed: -1.0,
                ..Default::default()
            },
        ];

        for tuning in broken {
            let breakout = Breakout::new(tuning);
            assert_eq!(breakout.tuning(), &BreakoutTuning::default());
        }

        let breakout = breakout();
        for brick in breakout.bricks() {
            assert!(brick.rect.min.x >= 0.0 && brick.rect.max.x > brick.rect.min.x);
            assert!(brick.rect.max.y < breakout.tuning().paddle_top());
        }
    }

    #[test]
    fn test_brick_from_below_flips_vertical() {
        let mut rng = rng();
        let mut breakout = breakout();
        let index = breakout.bricks.len() - 1;
        aim_at(&mut breakout, index);

        let out = tick(&mut breakout, &mut rng);
        assert!(out.contains(&Outcome::Contact(Contact::BrickDestroyed)));
        assert!(breakout.ball.vel.y > 0.0);
        assert!(!breakout.bricks[index].alive);
        assert_eq!(breakout.score(), 10);
    }

    #[test]
    fn test_brick_from_side_flips_horizontal() {
        let mut rng = rng();
        let mut breakout = breakout();
        let index = breakout.bricks.len() - 1;
        // Remove the left neighbour so only this brick's side face is in reach
        breakout.bricks[index - 1].alive = false;
        let rect = breakout.bricks[index].rect;
        breakout.ball.pos = Vec2::new(rect.min.x - breakout.ball.radius - 1.0, rect.center().y);
        breakout.ball.vel = Vec2::new(3.0, 0.0);

        tick(&mut breakout, &mut rng);
        assert_eq!(breakout.ball.vel, Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_tough_brick_needs_two_hits() {
        let mut rng = rng();
        let mut breakout = breakout();
        // Clear the rows below so the top-left brick is reachable
        for brick in breakout.bricks.iter_mut().filter(|b| b.row > 0) {
            brick.alive = false;
        }

        aim_at(&mut breakout, 0);
        let out = tick(&mut breakout, &mut rng);
        assert_eq!(out, vec![Outcome::Contact(Contact::Brick)]);
        assert!(breakout.bricks[0].alive);
        assert_eq!(breakout.score(), 0);

        aim_at(&mut breakout, 0);
        tick(&mut breakout, &mut rng);
        assert!(!breakout.bricks[0].alive);
        assert_eq!(breakout.score(), 50);
    }

    #[test]
    fn test_one_brick_per_tick_on_corner_overlap() {
        let mut rng = rng();
        let mut breakout = breakout();
        // Straddle the gap between two bottom-row bricks
        let last = breakout.bricks.len() - 1;
        let left = breakout.bricks[last - 1].rect;
        let x = left.max.x + breakout.tuning.brick_gap / 2.0;
        breakout.ball.pos = Vec2::new(x, left.max.y + breakout.ball.radius + 1.0);
        breakout.ball.vel = Vec2::new(0.0, -breakout.tuning.ball_speed);

        let out = tick(&mut breakout, &mut rng);
        let destroyed = out
            .iter()
            .filter(|o| **o == Outcome::Contact(Contact::BrickDestroyed))
            .count();
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn test_clearing_all_bricks_scores_total_and_ends() {
        let mut rng = rng();
        let mut breakout = breakout();
        let expected = breakout.tuning.total_value();

        let mut last = Vec::new();
        for index in (0..breakout.bricks.len()).rev() {
            while breakout.bricks[index].alive {
                aim_at(&mut breakout, index);
                last = tick(&mut breakout, &mut rng);
            }
        }

        assert_eq!(breakout.score(), expected);
        assert_eq!(
            last.last(),
            Some(&Outcome::Terminated {
                reason: EndReason::Cleared,
                final_score: expected,
            })
        );
    }

    #[test]
    fn test_paddle_offset_sets_horizontal_speed() {
        let mut rng = rng();
        let mut breakout = breakout();
        let top = breakout.tuning.paddle_top();
        let right_edge = breakout.paddle_x + breakout.tuning.paddle_width / 2.0 - 1.0;
        breakout.ball.pos = Vec2::new(right_edge, top - 6.0);
        breakout.ball.vel = Vec2::new(0.0, 4.5);

        let out = tick(&mut breakout, &mut rng);
        assert!(out.contains(&Outcome::Contact(Contact::Paddle)));
        assert!(breakout.ball.vel.y < 0.0);
        assert!(breakout.ball.vel.x > 4.0, "Edge hit angles the ball outward");

        // Dead center still drifts sideways
        breakout.ball.pos = Vec2::new(breakout.paddle_x, top - 6.0);
        breakout.ball.vel = Vec2::new(0.0, 4.5);
        tick(&mut breakout, &mut rng);
        assert_eq!(breakout.ball.vel.x.abs(), breakout.tuning.min_horizontal);
    }

    #[test]
    fn test_side_walls_reflect() {
        let mut rng = rng();
        let mut breakout = breakout();
        breakout.ball.pos = Vec2::new(3.0, 300.0);
        breakout.ball.vel = Vec2::new(-2.0, 1.0);
        let out = tick(&mut breakout, &mut rng);
        assert_eq!(out, vec![Outcome::Contact(Contact::Wall)]);
        assert_eq!(breakout.ball.vel.x, 2.0);
    }

    #[test]
    fn test_miss_costs_a_life_and_reserves() {
        let mut rng = rng();
        let mut breakout = breakout();
        drop_ball(&mut breakout);

        let out = tick(&mut breakout, &mut rng);
        assert_eq!(out, vec![Outcome::LifeLost { lives: 2 }]);
        assert!(breakout.ball.vel.y < 0.0, "Fresh serve heads up");
    }

    #[test]
    fn test_paddle_clamped() {
        let mut rng = rng();
        let mut breakout = breakout();
        breakout.command(PaddleIntent::Negative);
        for _ in 0..100 {
            tick(&mut breakout, &mut rng);
            if breakout.lives() < 3 {
                break;
            }
        }
        assert!(breakout.paddle_x >= breakout.tuning.paddle_width / 2.0);
    }

    #[test]
    fn test_three_misses_end_with_no_lives() {
        let mut game = Game::with_seed(
            SurfaceHandle::default(),
            GameConfig::default(),
            Breakout::default(),
            99,
        );
        let log: Rc<RefCell<Vec<GameEvent>>> = Rc::default();
        for kind in EventKind::ALL {
            let log = log.clone();
            game.on(kind, move |event| log.borrow_mut().push(event.clone()));
        }

        game.start();
        for _ in 0..3 {
            drop_ball(game.engine_mut());
            assert!(game.step());
        }
        assert!(!game.step(), "No tick after the last life");

        let events = log.borrow();
        let lives: Vec<u32> = events
            .iter()
            .filter_map(|e| match e.data {
                EventData::LifeLost { lives } => Some(lives),
                _ => None,
            })
            .collect();
        assert_eq!(lives, vec![2, 1, 0]);
        assert!(events.iter().all(|e| e.kind() != EventKind::ScoreUpdate));

        let tail: Vec<_> = events.iter().rev().take(2).map(|e| e.data.clone()).collect();
        assert_eq!(tail[0], EventData::GameFinished { final_score: 0 });
        assert_eq!(
            tail[1],
            EventData::GameOver {
                reason: "no-lives".to_string(),
                final_score: 0,
            }
        );
        assert_eq!(game.phase(), GamePhase::Finished);
    }
}
