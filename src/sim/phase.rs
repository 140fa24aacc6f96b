//! Lifecycle state machine
//!
//! Every (phase, action) pair is defined: either a transition or `None`.

use serde::{Deserialize, Serialize};

/// Current lifecycle phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// Constructed or stopped; entities in their initial layout
    #[default]
    Idle,
    /// Loop is ticking
    Running,
    /// Loop suspended, entities frozen
    Paused,
    /// Terminal condition reached; only `stop` leaves this phase
    Finished,
}

/// Host-requested lifecycle actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleAction {
    Start,
    Pause,
    Resume,
    Stop,
    /// Raised by the simulation, never by the host
    Terminate,
}

impl GamePhase {
    pub const ALL: [GamePhase; 4] = [
        GamePhase::Idle,
        GamePhase::Running,
        GamePhase::Paused,
        GamePhase::Finished,
    ];

    /// Target phase for `action`, or `None` if the action is not legal here
    pub fn transition(self, action: LifecycleAction) -> Option<GamePhase> {
        use GamePhase::*;
        use LifecycleAction::*;

        match (self, action) {
            (Idle, Start) => Some(Running),
            (Running, Pause) => Some(Paused),
            (Paused, Resume) => Some(Running),
            (Running | Paused | Finished, Stop) => Some(Idle),
            (Running, Terminate) => Some(Finished),
            _ => None,
        }
    }

    pub fn is_running(self) -> bool {
        self == GamePhase::Running
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::Finished => "finished",
        }
    }
}
