//! Browser bindings
//!
//! `WebGame` exposes the runtime to JavaScript. The page owns the canvas and
//! the animation frame loop: it calls `frame(time)` from
//! `requestAnimationFrame`, draws from `snapshot()`, and listens with `on()`.
//! Sound cues drained after each frame play through Web Audio.
//!
//! Callbacks registered with `on()` run while the `WebGame` is busy, so they
//! must not call its methods. A handler that wants to stop, pause or resume
//! captures the object returned by `control()` instead:
//!
//! ```js
//! const control = game.control();
//! game.on("scoreUpdate", () => control.requestStop());
//! ```
//!
//! Requests apply as soon as the current event has been delivered.

use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::arcade::{ArcadeCommand, ArcadeGame, GameKind};
use crate::audio::{SoundCue, SoundEffect};
use crate::events::EventKind;
use crate::settings::{GameConfig, SurfaceHandle};
use crate::sim::{ControlHandle, PongMode};

#[wasm_bindgen(start)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialised by an earlier module instance
        log::debug!("console logger already set");
    }
}

/// Serialize through JSON so the page gets plain objects
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    let text = serde_json::to_string(value)?;
    js_sys::JSON::parse(&text).map_err(|_| JsError::new("snapshot is not valid JSON"))
}

#[wasm_bindgen]
pub struct WebGame {
    game: ArcadeGame,
    audio: Option<WebAudio>,
}

#[wasm_bindgen]
impl WebGame {
    /// `kind` is "snake", "pong" or "breakout". `config` is a partial theme
    /// JSON object; `mode` is the Pong mode ("pvai", "pvp", "practice").
    #[wasm_bindgen(constructor)]
    pub fn new(
        kind: &str,
        canvas_id: &str,
        width: u32,
        height: u32,
        config: Option<String>,
        mode: Option<String>,
    ) -> Result<WebGame, JsError> {
        let kind =
            GameKind::parse(kind).ok_or_else(|| JsError::new(&format!("unknown game '{kind}'")))?;
        let config = config
            .as_deref()
            .map(GameConfig::from_json_or_default)
            .unwrap_or_default();
        let mode = match mode.as_deref() {
            Some(name) => PongMode::parse(name).unwrap_or_else(|| {
                log::warn!("Unknown pong mode '{name}', using {}", PongMode::default().as_str());
                PongMode::default()
            }),
            None => PongMode::default(),
        };

        let surface = SurfaceHandle::new(canvas_id, width, height);
        Ok(WebGame {
            game: ArcadeGame::new(kind, surface, config, mode),
            audio: WebAudio::new(),
        })
    }

    pub fn start(&mut self) -> bool {
        self.sync_clock();
        self.game.start()
    }

    pub fn stop(&mut self) -> bool {
        self.sync_clock();
        self.game.stop()
    }

    pub fn pause(&mut self) -> bool {
        self.sync_clock();
        self.game.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.sync_clock();
        self.game.resume()
    }

    pub fn mute(&mut self) -> bool {
        self.sync_clock();
        self.game.mute()
    }

    pub fn unmute(&mut self) -> bool {
        self.sync_clock();
        self.game.unmute()
    }

    #[wasm_bindgen(js_name = setPlayerName)]
    pub fn set_player_name(&mut self, name: String) {
        self.game.set_player_name(name);
    }

    /// Feed a `requestAnimationFrame` timestamp. Returns steps run.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let steps = self.game.frame(now_ms);
        let cues = self.game.drain_sounds();
        if let Some(audio) = &self.audio {
            for cue in cues {
                audio.play(cue);
            }
        }
        steps
    }

    #[wasm_bindgen(js_name = wantsFrames)]
    pub fn wants_frames(&self) -> bool {
        self.game.wants_frames()
    }

    pub fn phase(&self) -> String {
        self.game.phase().as_str().to_string()
    }

    /// Current state (the `getGameState` view) as a plain object
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        let value = self.game.snapshot_json()?;
        to_js(&value)
    }

    /// Input as JSON, e.g. `{"type":"steer","direction":"up"}` or
    /// `{"type":"paddle","side":"player","intent":"negative"}`.
    /// Returns false when the input is malformed or not for this game.
    pub fn command(&mut self, json: &str) -> bool {
        match serde_json::from_str::<ArcadeCommand>(json) {
            Ok(command) => self.game.command(command),
            Err(e) => {
                log::debug!("Ignoring input {json}: {e}");
                false
            }
        }
    }

    /// Subscribe `callback` to an event name such as "scoreUpdate"
    pub fn on(&mut self, event: &str, callback: js_sys::Function) -> Result<(), JsError> {
        let kind = EventKind::parse(event)
            .ok_or_else(|| JsError::new(&format!("unknown event '{event}'")))?;
        self.game.on(kind, move |event| {
            let payload = match to_js(event) {
                Ok(payload) => payload,
                Err(_) => {
                    log::warn!("Could not serialize {} event", event.kind().as_str());
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                log::warn!("{} handler threw: {:?}", event.kind().as_str(), e);
            }
        });
        Ok(())
    }

    /// Lifecycle requests that are safe to make from inside `on()` handlers
    pub fn control(&self) -> WebControl {
        WebControl {
            handle: self.game.control_handle(),
        }
    }
}

impl WebGame {
    /// Stamp events raised outside of `frame` with the page clock
    fn sync_clock(&mut self) {
        self.game.sync_clock(js_sys::Date::now());
    }
}

/// Deferred lifecycle requests for event handlers
#[wasm_bindgen]
pub struct WebControl {
    handle: ControlHandle,
}

#[wasm_bindgen]
impl WebControl {
    #[wasm_bindgen(js_name = requestStart)]
    pub fn request_start(&self) {
        self.handle.request_start();
    }

    #[wasm_bindgen(js_name = requestStop)]
    pub fn request_stop(&self) {
        self.handle.request_stop();
    }

    #[wasm_bindgen(js_name = requestPause)]
    pub fn request_pause(&self) {
        self.handle.request_pause();
    }

    #[wasm_bindgen(js_name = requestResume)]
    pub fn request_resume(&self) {
        self.handle.request_resume();
    }
}

/// Oscillator voice: frequency sweep with an exponential fade
#[derive(Clone, Copy)]
struct Tone {
    wave: OscillatorType,
    from_hz: f32,
    to_hz: f32,
    gain: f32,
    /// Seconds after the cue starts
    delay: f64,
    length: f64,
}

const fn tone(
    wave: OscillatorType,
    from_hz: f32,
    to_hz: f32,
    gain: f32,
    delay: f64,
    length: f64,
) -> Tone {
    Tone {
        wave,
        from_hz,
        to_hz,
        gain,
        delay,
        length,
    }
}

fn voices(effect: SoundEffect) -> &'static [Tone] {
    use OscillatorType::{Sawtooth, Sine, Square, Triangle};

    const PADDLE: &[Tone] = &[tone(Sine, 150.0, 60.0, 0.6, 0.0, 0.1)];
    const WALL: &[Tone] = &[tone(Sine, 400.0, 400.0, 0.3, 0.0, 0.08)];
    const BRICK: &[Tone] = &[tone(Triangle, 300.0, 300.0, 0.25, 0.0, 0.05)];
    const BRICK_BREAK: &[Tone] = &[
        tone(Square, 600.0, 200.0, 0.25, 0.0, 0.12),
        tone(Sine, 80.0, 40.0, 0.3, 0.0, 0.1),
    ];
    const EAT: &[Tone] = &[tone(Square, 520.0, 880.0, 0.2, 0.0, 0.07)];
    const POINT: &[Tone] = &[
        tone(Triangle, 660.0, 660.0, 0.3, 0.0, 0.1),
        tone(Triangle, 880.0, 880.0, 0.3, 0.1, 0.15),
    ];
    const LIFE_LOST: &[Tone] = &[tone(Sawtooth, 300.0, 80.0, 0.35, 0.0, 0.4)];
    const GAME_OVER: &[Tone] = &[
        tone(Sawtooth, 392.0, 392.0, 0.3, 0.0, 0.25),
        tone(Sawtooth, 330.0, 330.0, 0.3, 0.25, 0.25),
        tone(Sawtooth, 262.0, 131.0, 0.3, 0.5, 0.6),
    ];
    const VICTORY: &[Tone] = &[
        tone(Square, 523.0, 523.0, 0.25, 0.0, 0.12),
        tone(Square, 659.0, 659.0, 0.25, 0.12, 0.12),
        tone(Square, 784.0, 784.0, 0.25, 0.24, 0.12),
        tone(Square, 1047.0, 1047.0, 0.3, 0.36, 0.4),
    ];

    match effect {
        SoundEffect::PaddleHit => PADDLE,
        SoundEffect::WallHit => WALL,
        SoundEffect::BrickHit => BRICK,
        SoundEffect::BrickBreak => BRICK_BREAK,
        SoundEffect::Eat => EAT,
        SoundEffect::Point => POINT,
        SoundEffect::LifeLost => LIFE_LOST,
        SoundEffect::GameOver => GAME_OVER,
        SoundEffect::Victory => VICTORY,
    }
}

/// Synthesized sound effects on a shared `AudioContext`
struct WebAudio {
    ctx: AudioContext,
}

impl WebAudio {
    fn new() -> Option<Self> {
        match AudioContext::new() {
            Ok(ctx) => Some(Self { ctx }),
            Err(_) => {
                log::warn!("Failed to create AudioContext - audio disabled");
                None
            }
        }
    }

    fn play(&self, cue: SoundCue) {
        if cue.volume <= 0.0 {
            return;
        }

        // Browsers start the context suspended until a user gesture
        if self.ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }

        let now = self.ctx.current_time();
        for voice in voices(cue.effect) {
            self.play_tone(voice, now, cue.volume);
        }
    }

    fn create_osc(&self, wave: OscillatorType, hz: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = self.ctx.create_oscillator().ok()?;
        let gain = self.ctx.create_gain().ok()?;

        osc.set_type(wave);
        osc.frequency().set_value(hz);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_tone(&self, tone: &Tone, now: f64, volume: f32) {
        let Some((osc, gain)) = self.create_osc(tone.wave, tone.from_hz) else {
            return;
        };
        let start = now + tone.delay;
        let end = start + tone.length;

        gain.gain().set_value_at_time(volume * tone.gain, start).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        if tone.to_hz != tone.from_hz {
            osc.frequency().set_value_at_time(tone.from_hz, start).ok();
            osc.frequency().exponential_ramp_to_value_at_time(tone.to_hz, end).ok();
        }

        osc.start_with_when(start).ok();
        osc.stop_with_when(end + 0.05).ok();
    }
}
