//! Event bus - typed notifications a game emits to its host
//!
//! Subscribers register per event kind. Emission is synchronous and runs
//! callbacks in registration order, inside the tick that produced the event.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sim::Side;

/// Names hosts subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    GameStarted,
    GameFinished,
    GameOver,
    ScoreUpdate,
    SoundMuted,
    SoundUnmuted,
    /// Breakout lost a ball but still has lives left (or just ran out)
    LifeLost,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::GameStarted,
        EventKind::GameFinished,
        EventKind::GameOver,
        EventKind::ScoreUpdate,
        EventKind::SoundMuted,
        EventKind::SoundUnmuted,
        EventKind::LifeLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::GameStarted => "gameStarted",
            EventKind::GameFinished => "gameFinished",
            EventKind::GameOver => "gameOver",
            EventKind::ScoreUpdate => "scoreUpdate",
            EventKind::SoundMuted => "soundMuted",
            EventKind::SoundUnmuted => "soundUnmuted",
            EventKind::LifeLost => "lifeLost",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Event-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventData {
    GameStarted,
    #[serde(rename_all = "camelCase")]
    GameFinished { final_score: u64 },
    #[serde(rename_all = "camelCase")]
    GameOver { reason: String, final_score: u64 },
    /// `side` is set for two-sided games (Pong)
    ScoreUpdate {
        score: u64,
        delta: u64,
        side: Option<Side>,
    },
    SoundMuted,
    SoundUnmuted,
    LifeLost { lives: u32 },
}

impl EventData {
    pub fn kind(&self) -> EventKind {
        match self {
            EventData::GameStarted => EventKind::GameStarted,
            EventData::GameFinished { .. } => EventKind::GameFinished,
            EventData::GameOver { .. } => EventKind::GameOver,
            EventData::ScoreUpdate { .. } => EventKind::ScoreUpdate,
            EventData::SoundMuted => EventKind::SoundMuted,
            EventData::SoundUnmuted => EventKind::SoundUnmuted,
            EventData::LifeLost { .. } => EventKind::LifeLost,
        }
    }
}

/// Immutable event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    /// Host clock in milliseconds when the event was produced
    pub timestamp: f64,
    pub player_name: Option<String>,
    pub game_id: Option<String>,
    #[serde(flatten)]
    pub data: EventData,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        self.data.kind()
    }
}

pub type EventCallback = Box<dyn FnMut(&GameEvent)>;

/// Callback registry keyed by event kind
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<EventCallback>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it runs after every callback registered before it
    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&GameEvent) + 'static) {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    pub fn emit(&mut self, event: &GameEvent) {
        if let Some(callbacks) = self.subscribers.get_mut(&event.kind()) {
            for callback in callbacks.iter_mut() {
                callback(event);
            }
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            let count = self.subscriber_count(kind);
            if count > 0 {
                map.entry(&kind.as_str(), &count);
            }
        }
        map.finish()
    }
}
