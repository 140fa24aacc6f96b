//! Game configuration and theme
//!
//! A `GameConfig` is an immutable snapshot taken at construction. Hosts hand us
//! partial JSON which is merged onto defaults; anything out of range falls back
//! to the default value instead of failing the whole game.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};

/// Theme colors handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            primary: "#4ade80".to_string(),
            secondary: "#60a5fa".to_string(),
            background: "#0f172a".to_string(),
            text: "#f8fafc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSizes {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            small: 12.0,
            medium: 16.0,
            large: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
    pub font_size: FontSizes,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: FontSizes::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Styling {
    pub border_radius: f32,
    pub border_width: f32,
    pub shadow_blur: f32,
}

impl Default for Styling {
    fn default() -> Self {
        Self {
            border_radius: 4.0,
            border_width: 2.0,
            shadow_blur: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Animation {
    /// Multiplier on tick rate (2.0 = twice as many ticks per second)
    pub speed: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            muted: false,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub colors: Colors,
    pub typography: Typography,
    pub styling: Styling,
    pub animation: Animation,
    pub audio: AudioSettings,
}

impl GameConfig {
    /// Parse a partial JSON object onto defaults, then validate.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: GameConfig = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Like `from_json`, but an unparsable document yields the defaults.
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid game config ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Replace out-of-range values with their defaults
    pub fn validated(mut self) -> Self {
        let defaults = GameConfig::default();

        if !(0.0..=1.0).contains(&self.audio.volume) {
            let volume = self.audio.volume;
            log::warn!("Volume {volume} out of range, using {}", defaults.audio.volume);
            self.audio.volume = defaults.audio.volume;
        }

        if !(self.animation.speed.is_finite() && self.animation.speed > 0.0) {
            log::warn!("Animation speed {} must be positive", self.animation.speed);
            self.animation.speed = defaults.animation.speed;
        }

        let sizes = &mut self.typography.font_size;
        let default_sizes = defaults.typography.font_size;
        for (size, fallback) in [
            (&mut sizes.small, default_sizes.small),
            (&mut sizes.medium, default_sizes.medium),
            (&mut sizes.large, default_sizes.large),
        ] {
            if !(size.is_finite() && *size > 0.0) {
                *size = fallback;
            }
        }

        let styling = &mut self.styling;
        for (value, fallback) in [
            (&mut styling.border_radius, defaults.styling.border_radius),
            (&mut styling.border_width, defaults.styling.border_width),
            (&mut styling.shadow_blur, defaults.styling.shadow_blur),
        ] {
            if !(value.is_finite() && *value >= 0.0) {
                *value = fallback;
            }
        }

        self
    }

    /// Duration of one simulation step for an engine's base interval
    pub fn step_interval_ms(&self, base_interval_ms: f64) -> f64 {
        base_interval_ms / self.animation.speed
    }
}

/// The drawing surface a game is attached to.
///
/// The engine never draws; it only keeps the handle so the renderer can scale
/// snapshots to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceHandle {
    /// Host element id (canvas id on the web)
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl SurfaceHandle {
    /// Build a handle, falling back to default dimensions for zero sizes
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        let id = id.into();
        let (width, height) = if width == 0 || height == 0 {
            log::warn!("Surface '{id}' has non-positive size {width}x{height}, using defaults");
            (DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT)
        } else {
            (width, height)
        };
        Self { id, width, height }
    }
}

impl Default for SurfaceHandle {
    fn default() -> Self {
        Self {
            id: "canvas".to_string(),
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
        }
    }
}
