//! One value that can be any of the three games
//!
//! Embedders that pick the game at runtime (the wasm class, the demo binary)
//! hold an `ArcadeGame` instead of being generic over the engine.

use serde::{Deserialize, Serialize};

use crate::audio::SoundCue;
use crate::events::{EventKind, GameEvent};
use crate::settings::{GameConfig, SurfaceHandle};
use crate::sim::{
    Breakout, ControlHandle, Direction, Game, GamePhase, PaddleIntent, Pong, PongCommand,
    PongMode, Side, Snake,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameKind {
    Snake,
    Pong,
    Breakout,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Snake, GameKind::Pong, GameKind::Breakout];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::Pong => "pong",
            GameKind::Breakout => "breakout",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// Input for whichever game is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ArcadeCommand {
    /// Snake heading
    Steer { direction: Direction },
    /// Pong paddle for one side; Breakout takes the player side only
    Paddle { side: Side, intent: PaddleIntent },
}

pub enum ArcadeGame {
    Snake(Game<Snake>),
    Pong(Game<Pong>),
    Breakout(Game<Breakout>),
}

/// Forward a call to the wrapped game, whatever its engine
macro_rules! dispatch {
    ($self:expr, $game:ident => $body:expr) => {
        match $self {
            ArcadeGame::Snake($game) => $body,
            ArcadeGame::Pong($game) => $body,
            ArcadeGame::Breakout($game) => $body,
        }
    };
}

impl ArcadeGame {
    /// Build a game with default tuning. `mode` only matters for Pong.
    pub fn new(kind: GameKind, surface: SurfaceHandle, config: GameConfig, mode: PongMode) -> Self {
        Self::with_seed(kind, surface, config, mode, rand::random())
    }

    pub fn with_seed(
        kind: GameKind,
        surface: SurfaceHandle,
        config: GameConfig,
        mode: PongMode,
        seed: u64,
    ) -> Self {
        match kind {
            GameKind::Snake => {
                ArcadeGame::Snake(Game::with_seed(surface, config, Snake::default(), seed))
            }
            GameKind::Pong => ArcadeGame::Pong(Game::with_seed(
                surface,
                config,
                Pong::new(mode, Default::default()),
                seed,
            )),
            GameKind::Breakout => {
                ArcadeGame::Breakout(Game::with_seed(surface, config, Breakout::default(), seed))
            }
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            ArcadeGame::Snake(_) => GameKind::Snake,
            ArcadeGame::Pong(_) => GameKind::Pong,
            ArcadeGame::Breakout(_) => GameKind::Breakout,
        }
    }

    pub fn start(&mut self) -> bool {
        dispatch!(self, game => game.start())
    }

    pub fn stop(&mut self) -> bool {
        dispatch!(self, game => game.stop())
    }

    pub fn pause(&mut self) -> bool {
        dispatch!(self, game => game.pause())
    }

    pub fn resume(&mut self) -> bool {
        dispatch!(self, game => game.resume())
    }

    pub fn mute(&mut self) -> bool {
        dispatch!(self, game => game.mute())
    }

    pub fn unmute(&mut self) -> bool {
        dispatch!(self, game => game.unmute())
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        dispatch!(self, game => game.set_player_name(name))
    }

    /// Returns false if the command does not apply to this game
    pub fn command(&mut self, command: ArcadeCommand) -> bool {
        match (self, command) {
            (ArcadeGame::Snake(game), ArcadeCommand::Steer { direction }) => {
                game.command(direction);
                true
            }
            (ArcadeGame::Pong(game), ArcadeCommand::Paddle { side, intent }) => {
                game.command(PongCommand { side, intent });
                true
            }
            (
                ArcadeGame::Breakout(game),
                ArcadeCommand::Paddle {
                    side: Side::Player,
                    intent,
                },
            ) => {
                game.command(intent);
                true
            }
            (game, command) => {
                log::trace!("{} ignores {:?}", game.kind().as_str(), command);
                false
            }
        }
    }

    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&GameEvent) + 'static) {
        dispatch!(self, game => game.on(kind, callback))
    }

    pub fn control_handle(&self) -> ControlHandle {
        dispatch!(self, game => game.control_handle())
    }

    pub fn sync_clock(&mut self, now_ms: f64) {
        dispatch!(self, game => game.sync_clock(now_ms))
    }

    pub fn frame(&mut self, now_ms: f64) -> u32 {
        dispatch!(self, game => game.frame(now_ms))
    }

    pub fn step(&mut self) -> bool {
        dispatch!(self, game => game.step())
    }

    pub fn wants_frames(&self) -> bool {
        dispatch!(self, game => game.wants_frames())
    }

    pub fn phase(&self) -> GamePhase {
        dispatch!(self, game => game.phase())
    }

    pub fn score(&self) -> u64 {
        dispatch!(self, game => game.snapshot().score)
    }

    pub fn config(&self) -> &GameConfig {
        dispatch!(self, game => game.config())
    }

    pub fn surface(&self) -> &SurfaceHandle {
        dispatch!(self, game => game.surface())
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        dispatch!(self, game => game.drain_sounds())
    }

    /// Snapshot as JSON for hosts that render outside Rust
    pub fn snapshot_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        dispatch!(self, game => serde_json::to_value(game.snapshot()))
    }
}

impl std::fmt::Debug for ArcadeGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        dispatch!(self, game => std::fmt::Debug::fmt(game, f))
    }
}
