//! Pong: ball/paddle reflection, scoring and the AI opponent
//!
//! Court coordinates: origin top-left, y grows downward. The player paddle is
//! on the left, the opponent (AI or second human) on the right.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::PaddleIntent;
use super::ball::{Ball, Rect};
use super::engine::{Contact, EndReason, Engine, Outcome, Side};
use crate::consts::PHYSICS_INTERVAL_MS;

/// Who controls the right paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PongMode {
    /// Player vs AI
    #[default]
    #[serde(rename = "pvai")]
    PlayerVsAi,
    /// Two humans
    #[serde(rename = "pvp")]
    PlayerVsPlayer,
    /// Right side is a wall; each return scores, no match end
    #[serde(rename = "practice")]
    Practice,
}

impl PongMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PongMode::PlayerVsAi => "pvai",
            PongMode::PlayerVsPlayer => "pvp",
            PongMode::Practice => "practice",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pvai" => Some(PongMode::PlayerVsAi),
            "pvp" => Some(PongMode::PlayerVsPlayer),
            "practice" => Some(PongMode::Practice),
            _ => None,
        }
    }
}

/// Pong tuning parameters. Speeds are units per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PongTuning {
    pub width: f32,
    pub height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Gap between court edge and paddle center
    pub paddle_inset: f32,
    pub paddle_speed: f32,
    /// AI paddle max speed; below ball speed so it can be beaten
    pub ai_speed: f32,
    pub ball_radius: f32,
    /// Horizontal speed of a fresh serve
    pub serve_speed: f32,
    /// Vertical speed imparted by a hit at the very paddle edge
    pub max_deflection: f32,
    /// Smallest vertical speed after a paddle hit, so returns never go flat
    pub min_deflection: f32,
    /// Horizontal speed multiplier per paddle hit
    pub speedup: f32,
    pub max_ball_speed: f32,
    pub win_score: u64,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            paddle_width: 12.0,
            paddle_height: 80.0,
            paddle_inset: 24.0,
            paddle_speed: 7.0,
            ai_speed: 4.5,
            ball_radius: 7.0,
            serve_speed: 6.0,
            max_deflection: 6.0,
            min_deflection: 0.75,
            speedup: 1.04,
            max_ball_speed: 14.0,
            win_score: 11,
        }
    }
}

impl PongTuning {
    fn is_valid(&self) -> bool {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        positive(self.width)
            && positive(self.height)
            && self.height > self.paddle_height
            && positive(self.paddle_width)
            && positive(self.paddle_height)
            && self.paddle_speed.is_finite()
            && self.paddle_speed >= 0.0
            && positive(self.ai_speed)
            && positive(self.ball_radius)
            && positive(self.serve_speed)
            && self.max_deflection.is_finite()
            && (0.0..=self.max_deflection).contains(&self.min_deflection)
            && self.speedup.is_finite()
            && self.speedup >= 1.0
            && self.max_ball_speed.is_finite()
            && self.max_ball_speed >= self.serve_speed
            && self.win_score > 0
    }
}

/// A paddle; `y` is its center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip)]
    pub intent: PaddleIntent,
}

impl Paddle {
    fn rect(&self) -> Rect {
        Rect::from_center(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }

    fn clamp_to(&mut self, court_height: f32) {
        let half = self.height / 2.0;
        self.y = self.y.clamp(half, court_height - half);
    }
}

/// Input for one paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongCommand {
    pub side: Side,
    pub intent: PaddleIntent,
}

#[derive(Debug, Clone)]
pub struct Pong {
    tuning: PongTuning,
    mode: PongMode,
    left: Paddle,
    right: Paddle,
    ball: Ball,
    player_score: u64,
    opponent_score: u64,
}

/// Renderer view of a pong game
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PongSnapshot {
    pub width: f32,
    pub height: f32,
    pub mode: PongMode,
    pub left: Paddle,
    /// Absent in practice mode
    pub right: Option<Paddle>,
    pub ball: Ball,
    pub player_score: u64,
    pub opponent_score: u64,
}

impl Pong {
    pub fn new(mode: PongMode, tuning: PongTuning) -> Self {
        let tuning = if tuning.is_valid() {
            tuning
        } else {
            log::warn!("Invalid pong court {tuning:?}, using defaults");
            PongTuning::default()
        };
        let paddle = |x| Paddle {
            x,
            y: tuning.height / 2.0,
            width: tuning.paddle_width,
            height: tuning.paddle_height,
            intent: PaddleIntent::Hold,
        };
        Self {
            left: paddle(tuning.paddle_inset),
            right: paddle(tuning.width - tuning.paddle_inset),
            ball: Ball::new(
                Vec2::new(tuning.width, tuning.height) / 2.0,
                Vec2::ZERO,
                tuning.ball_radius,
            ),
            mode,
            tuning,
            player_score: 0,
            opponent_score: 0,
        }
    }

    pub fn mode(&self) -> PongMode {
        self.mode
    }

    pub fn tuning(&self) -> &PongTuning {
        &self.tuning
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Player => &self.left,
            Side::Opponent => &self.right,
        }
    }

    pub fn score_of(&self, side: Side) -> u64 {
        match side {
            Side::Player => self.player_score,
            Side::Opponent => self.opponent_score,
        }
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.tuning.width, self.tuning.height) / 2.0
    }

    /// Put the ball at center court heading toward `toward`
    fn serve(&mut self, toward: Side, rng: &mut Pcg32) {
        let vx = match toward {
            Side::Player => -self.tuning.serve_speed,
            Side::Opponent => self.tuning.serve_speed,
        };
        let vy = rng.random_range(-0.5..=0.5) * self.tuning.serve_speed;
        self.ball.pos = self.center();
        self.ball.vel = Vec2::new(vx, vy);
    }

    fn move_paddles(&mut self) {
        let speed = self.tuning.paddle_speed;
        self.left.y += self.left.intent.sign() * speed;
        self.left.clamp_to(self.tuning.height);

        match self.mode {
            PongMode::PlayerVsAi => self.track_ball(),
            PongMode::PlayerVsPlayer => self.right.y += self.right.intent.sign() * speed,
            PongMode::Practice => {}
        }
        self.right.clamp_to(self.tuning.height);
    }

    /// AI: chase the ball's current height, never faster than `ai_speed`
    fn track_ball(&mut self) {
        let max_step = self.tuning.ai_speed;
        let delta = (self.ball.pos.y - self.right.y).clamp(-max_step, max_step);
        self.right.y += delta;
    }

    fn bounce_off_walls(&mut self, out: &mut Vec<Outcome>) {
        let r = self.ball.radius;
        let ball = &mut self.ball;

        // Only flip when heading into the wall so a contact flips exactly once
        if ball.pos.y - r <= 0.0 && ball.vel.y < 0.0 {
            ball.pos.y = r;
            ball.vel.y = -ball.vel.y;
            out.push(Outcome::Contact(Contact::Wall));
        } else if ball.pos.y + r >= self.tuning.height && ball.vel.y > 0.0 {
            ball.pos.y = self.tuning.height - r;
            ball.vel.y = -ball.vel.y;
            out.push(Outcome::Contact(Contact::Wall));
        }

        if self.mode == PongMode::Practice
            && ball.pos.x + r >= self.tuning.width
            && ball.vel.x > 0.0
        {
            ball.pos.x = self.tuning.width - r;
            ball.vel.x = -ball.vel.x;
            out.push(Outcome::Contact(Contact::Wall));
        }
    }

    /// Returns the side whose paddle returned the ball, if any
    fn bounce_off_paddles(&mut self, out: &mut Vec<Outcome>) -> Option<Side> {
        let side = if self.ball.vel.x < 0.0 {
            Side::Player
        } else if self.ball.vel.x > 0.0 && self.mode != PongMode::Practice {
            Side::Opponent
        } else {
            return None;
        };

        let paddle = *self.paddle(side);
        if !paddle.rect().overlaps_ball(&self.ball) {
            return None;
        }

        // -1 at the top edge, +1 at the bottom edge
        let offset = ((self.ball.pos.y - paddle.y) / (paddle.height / 2.0)).clamp(-1.0, 1.0);
        let speed_x =
            (self.ball.vel.x.abs() * self.tuning.speedup).min(self.tuning.max_ball_speed);
        let push_out = paddle.width / 2.0 + self.ball.radius;

        let mut vy = offset * self.tuning.max_deflection;
        if vy.abs() < self.tuning.min_deflection {
            // Center hits keep the incoming slant, or go down if there was none
            let sign = if offset != 0.0 {
                offset.signum()
            } else if self.ball.vel.y != 0.0 {
                self.ball.vel.y.signum()
            } else {
                1.0
            };
            vy = sign * self.tuning.min_deflection;
        }

        let (vx, x) = match side {
            Side::Player => (speed_x, paddle.x + push_out),
            Side::Opponent => (-speed_x, paddle.x - push_out),
        };
        self.ball.vel = Vec2::new(vx, vy);
        self.ball.pos.x = x;
        out.push(Outcome::Contact(Contact::Paddle));
        Some(side)
    }

    fn award_point(&mut self, side: Side, rng: &mut Pcg32, out: &mut Vec<Outcome>) {
        let score = match side {
            Side::Player => {
                self.player_score += 1;
                self.player_score
            }
            Side::Opponent => {
                self.opponent_score += 1;
                self.opponent_score
            }
        };
        out.push(Outcome::Scored {
            side: Some(side),
            score,
            delta: 1,
        });

        if self.mode != PongMode::Practice && score >= self.tuning.win_score {
            let reason = match side {
                Side::Player => EndReason::PlayerWins,
                Side::Opponent => EndReason::OpponentWins,
            };
            out.push(Outcome::Terminated {
                reason,
                final_score: self.player_score,
            });
        }
    }
}

impl Default for Pong {
    fn default() -> Self {
        Self::new(PongMode::default(), PongTuning::default())
    }
}

impl Engine for Pong {
    type Command = PongCommand;
    type Snapshot = PongSnapshot;

    const GAME_ID: &'static str = "pong";
    const BASE_INTERVAL_MS: f64 = PHYSICS_INTERVAL_MS;

    fn command(&mut self, command: PongCommand) {
        match (command.side, self.mode) {
            (Side::Player, _) => self.left.intent = command.intent,
            (Side::Opponent, PongMode::PlayerVsPlayer) => self.right.intent = command.intent,
            // AI or wall owns the right side
            (Side::Opponent, _) => {}
        }
    }

    fn tick(&mut self, rng: &mut Pcg32, out: &mut Vec<Outcome>) {
        self.move_paddles();
        self.ball.advance();
        self.bounce_off_walls(out);

        let returned_by = self.bounce_off_paddles(out);
        if self.mode == PongMode::Practice && returned_by == Some(Side::Player) {
            self.player_score += 1;
            out.push(Outcome::Scored {
                side: Some(Side::Player),
                score: self.player_score,
                delta: 1,
            });
        }

        let r = self.ball.radius;
        let conceded = if self.ball.pos.x + r < 0.0 {
            Some(Side::Player)
        } else if self.ball.pos.x - r > self.tuning.width {
            Some(Side::Opponent)
        } else {
            None
        };

        if let Some(conceded) = conceded {
            if self.mode != PongMode::Practice {
                self.award_point(conceded.other(), rng, out);
            }
            self.serve(conceded, rng);
        }
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        let mid = self.tuning.height / 2.0;
        for paddle in [&mut self.left, &mut self.right] {
            paddle.y = mid;
            paddle.intent = PaddleIntent::Hold;
        }
        self.player_score = 0;
        self.opponent_score = 0;

        let toward = if self.mode == PongMode::Practice || rng.random_bool(0.5) {
            Side::Player
        } else {
            Side::Opponent
        };
        self.serve(toward, rng);
    }

    fn snapshot(&self) -> PongSnapshot {
        PongSnapshot {
            width: self.tuning.width,
            height: self.tuning.height,
            mode: self.mode,
            left: self.left,
            right: (self.mode != PongMode::Practice).then_some(self.right),
            ball: self.ball,
            player_score: self.player_score,
            opponent_score: self.opponent_score,
        }
    }

    fn score(&self) -> u64 {
        self.player_score
    }
}
