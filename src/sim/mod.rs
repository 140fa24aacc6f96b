//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Entities mutate only inside a tick while running
//! - No rendering or platform dependencies

pub mod ball;
pub mod breakout;
pub mod engine;
pub mod game_loop;
pub mod phase;
pub mod pong;
pub mod runtime;
pub mod snake;

pub use ball::{Ball, Rect};
pub use breakout::{Breakout, BreakoutSnapshot, BreakoutTuning, Brick};
pub use engine::{Contact, EndReason, Engine, Outcome, Side};
pub use game_loop::{FixedStepLoop, LoopState};
pub use phase::{GamePhase, LifecycleAction};
pub use pong::{Paddle, Pong, PongCommand, PongMode, PongSnapshot, PongTuning};
pub use runtime::{ControlHandle, Game, GameSnapshot};
pub use snake::{Cell, Direction, Snake, SnakeSnapshot, SnakeTuning};

/// Paddle movement intent: -1 (up/left), 0 (hold), +1 (down/right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaddleIntent {
    Negative,
    #[default]
    Hold,
    Positive,
}

impl PaddleIntent {
    pub fn sign(self) -> f32 {
        match self {
            PaddleIntent::Negative => -1.0,
            PaddleIntent::Hold => 0.0,
            PaddleIntent::Positive => 1.0,
        }
    }
}
