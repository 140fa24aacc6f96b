//! Sound cues and mute state
//!
//! The engine never touches an audio device. Ticks queue cues here and the
//! host drains them (the wasm build plays them through Web Audio).

use serde::{Deserialize, Serialize};

use crate::settings::AudioSettings;
use crate::sim::{Contact, EndReason, Outcome};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundEffect {
    /// Ball hits paddle
    PaddleHit,
    /// Ball hits wall
    WallHit,
    /// Ball hits brick (doesn't break)
    BrickHit,
    BrickBreak,
    /// Snake eats food
    Eat,
    /// Pong point scored
    Point,
    LifeLost,
    GameOver,
    /// Game ended in the player's favor
    Victory,
}

impl SoundEffect {
    /// Cue for a tick outcome, if it makes a sound
    pub fn for_outcome(outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Contact(Contact::Wall) => Some(SoundEffect::WallHit),
            Outcome::Contact(Contact::Paddle) => Some(SoundEffect::PaddleHit),
            Outcome::Contact(Contact::Brick) => Some(SoundEffect::BrickHit),
            Outcome::Contact(Contact::BrickDestroyed) => Some(SoundEffect::BrickBreak),
            Outcome::Contact(Contact::Food) => Some(SoundEffect::Eat),
            Outcome::Scored { side: Some(_), .. } => Some(SoundEffect::Point),
            Outcome::Scored { side: None, .. } => None,
            Outcome::LifeLost { .. } => Some(SoundEffect::LifeLost),
            Outcome::Terminated { reason, .. } => Some(match reason {
                EndReason::PlayerWins | EndReason::Cleared | EndReason::Filled => {
                    SoundEffect::Victory
                }
                _ => SoundEffect::GameOver,
            }),
        }
    }
}

/// A cue waiting to be played, with the volume it should play at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub effect: SoundEffect,
    pub volume: f32,
}

/// Cap on undrained cues so a host that never drains doesn't grow forever
const MAX_PENDING_CUES: usize = 64;

/// Audio manager for one game
#[derive(Debug, Clone)]
pub struct AudioManager {
    volume: f32,
    muted: bool,
    pending: Vec<SoundCue>,
}

impl AudioManager {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            volume: settings.volume.clamp(0.0, 1.0),
            muted: settings.muted,
            pending: Vec::new(),
        }
    }

    /// Returns true if the mute state changed
    pub fn set_muted(&mut self, muted: bool) -> bool {
        if self.muted == muted {
            return false;
        }
        self.muted = muted;
        if muted {
            self.pending.clear();
        }
        true
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Queue a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let volume = self.effective_volume();
        if volume <= 0.0 || self.pending.len() >= MAX_PENDING_CUES {
            return;
        }
        self.pending.push(SoundCue { effect, volume });
    }

    /// Take every queued cue
    pub fn drain(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_manager_queues_nothing() {
        let mut audio = AudioManager::new(&AudioSettings {
            volume: 0.5,
            muted: true,
        });
        audio.play(SoundEffect::PaddleHit);
        assert!(audio.drain().is_empty());
    }

    #[test]
    fn test_cues_carry_effective_volume() {
        let mut audio = AudioManager::new(&AudioSettings::default());
        audio.play(SoundEffect::Eat);
        let cues = audio.drain();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].volume, AudioSettings::default().volume);
        assert!(audio.drain().is_empty());
    }

    #[test]
    fn test_set_muted_reports_change_only() {
        let mut audio = AudioManager::new(&AudioSettings::default());
        audio.play(SoundEffect::WallHit);
        assert!(audio.set_muted(true));
        assert!(!audio.set_muted(true));
        assert!(audio.drain().is_empty(), "Muting drops queued cues");
        assert!(audio.set_muted(false));
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(
            SoundEffect::for_outcome(&Outcome::Contact(Contact::Paddle)),
            Some(SoundEffect::PaddleHit)
        );
        assert_eq!(
            SoundEffect::for_outcome(&Outcome::Terminated {
                reason: EndReason::Cleared,
                final_score: 100,
            }),
            Some(SoundEffect::Victory)
        );
        assert_eq!(
            SoundEffect::for_outcome(&Outcome::Scored {
                side: None,
                score: 10,
                delta: 10,
            }),
            None
        );
    }
}
