//! Canvas Arcade - shared runtime for Snake, Pong and Breakout
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lifecycle, fixed-step loop, per-game engines)
//! - `events`: Typed event bus games emit through
//! - `settings`: Theme/config handed to the renderer
//! - `audio`: Sound cues and mute state
//! - `arcade`: One enum over the three games for embedders

pub mod arcade;
pub mod audio;
pub mod events;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use arcade::{ArcadeCommand, ArcadeGame, GameKind};
pub use events::{EventData, EventKind, GameEvent};
pub use settings::{GameConfig, SurfaceHandle};
pub use sim::{Game, GamePhase};

/// Runtime configuration constants
pub mod consts {
    /// Snake moves one cell per 100 ms at animation speed 1.0
    pub const SNAKE_INTERVAL_MS: f64 = 100.0;
    /// Pong and Breakout step at 60 Hz at animation speed 1.0
    pub const PHYSICS_INTERVAL_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Default surface size when the host hands us nothing usable
    pub const DEFAULT_SURFACE_WIDTH: u32 = 800;
    pub const DEFAULT_SURFACE_HEIGHT: u32 = 600;
}
