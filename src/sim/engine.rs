//! Capability set every game engine provides to the runtime

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Which side of a two-player court
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Left paddle, always human-controlled
    Player,
    /// Right paddle, AI or second human
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Why a game ended. Carried as a string in `gameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Snake head left the grid
    Wall,
    /// Snake head ran into its own body
    Collision,
    /// Snake covers every cell
    Filled,
    PlayerWins,
    OpponentWins,
    NoLives,
    /// Every brick destroyed
    Cleared,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Wall => "wall",
            EndReason::Collision => "collision",
            EndReason::Filled => "filled",
            EndReason::PlayerWins => "player-wins",
            EndReason::OpponentWins => "opponent-wins",
            EndReason::NoLives => "no-lives",
            EndReason::Cleared => "cleared",
        }
    }
}

/// Something a surface got hit by this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Wall,
    Paddle,
    /// Brick hit but still standing
    Brick,
    BrickDestroyed,
    Food,
}

/// What happened during one tick, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Contact(Contact),
    Scored {
        side: Option<Side>,
        score: u64,
        delta: u64,
    },
    LifeLost {
        lives: u32,
    },
    /// Always the last outcome of a tick
    Terminated {
        reason: EndReason,
        final_score: u64,
    },
}

/// A single game's simulation.
///
/// `tick` is only called while the game is running; nothing else mutates
/// entities except `reset`.
pub trait Engine {
    /// Input intent accepted between ticks
    type Command;
    /// Read-only entity view for the renderer
    type Snapshot: Clone + std::fmt::Debug + PartialEq + Serialize;

    /// Reported as `gameId` on every event
    const GAME_ID: &'static str;
    /// Step duration at animation speed 1.0
    const BASE_INTERVAL_MS: f64;

    /// Queue an input intent; it takes effect on the next tick
    fn command(&mut self, command: Self::Command);

    /// Advance one fixed step, appending outcomes to `out`
    fn tick(&mut self, rng: &mut Pcg32, out: &mut Vec<Outcome>);

    /// Back to the initial layout with scores cleared
    fn reset(&mut self, rng: &mut Pcg32);

    fn snapshot(&self) -> Self::Snapshot;

    /// Headline score reported as `finalScore`
    fn score(&self) -> u64;
}
