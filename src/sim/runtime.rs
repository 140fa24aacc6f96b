//! Game runtime: lifecycle + loop + event emission around one engine

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::engine::{EndReason, Engine, Outcome};
use super::game_loop::FixedStepLoop;
use super::phase::{GamePhase, LifecycleAction};
use crate::audio::{AudioManager, SoundCue, SoundEffect};
use crate::events::{EventBus, EventData, EventKind, GameEvent};
use crate::settings::{GameConfig, SurfaceHandle};

/// Lets event handlers ask for lifecycle changes.
///
/// Handlers run while the game is mid-tick and cannot borrow it. Requests are
/// applied as soon as the current emission finishes, before any further step.
#[derive(Debug, Clone, Default)]
pub struct ControlHandle {
    requests: Rc<RefCell<VecDeque<LifecycleAction>>>,
}

impl ControlHandle {
    pub fn request_start(&self) {
        self.push(LifecycleAction::Start);
    }

    pub fn request_stop(&self) {
        self.push(LifecycleAction::Stop);
    }

    pub fn request_pause(&self) {
        self.push(LifecycleAction::Pause);
    }

    pub fn request_resume(&self) {
        self.push(LifecycleAction::Resume);
    }

    fn push(&self, action: LifecycleAction) {
        self.requests.borrow_mut().push_back(action);
    }

    fn take(&self) -> Option<LifecycleAction> {
        self.requests.borrow_mut().pop_front()
    }
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot<S> {
    pub game_id: &'static str,
    pub phase: GamePhase,
    pub score: u64,
    pub muted: bool,
    pub player_name: Option<String>,
    /// Simulation steps since the last start
    pub ticks: u64,
    pub entities: S,
}

/// One game instance
pub struct Game<E: Engine> {
    engine: E,
    phase: GamePhase,
    game_loop: FixedStepLoop,
    bus: EventBus,
    config: GameConfig,
    surface: SurfaceHandle,
    audio: AudioManager,
    player_name: Option<String>,
    rng: Pcg32,
    seed: u64,
    /// Latest host clock reading, stamps every event
    clock_ms: f64,
    control: ControlHandle,
    /// Reused between ticks
    outcomes: Vec<Outcome>,
    ticks: u64,
}

impl<E: Engine> Game<E> {
    /// Create a game with a random seed
    pub fn new(surface: SurfaceHandle, config: GameConfig, engine: E) -> Self {
        Self::with_seed(surface, config, engine, rand::random())
    }

    /// Create a game with a fixed seed (reproducible food/serve placement)
    pub fn with_seed(surface: SurfaceHandle, config: GameConfig, mut engine: E, seed: u64) -> Self {
        let config = config.validated();
        let mut rng = Pcg32::seed_from_u64(seed);
        engine.reset(&mut rng);

        log::info!(
            "Created {} on '{}' ({}x{}), seed {}",
            E::GAME_ID,
            surface.id,
            surface.width,
            surface.height,
            seed
        );

        Self {
            game_loop: FixedStepLoop::new(config.step_interval_ms(E::BASE_INTERVAL_MS)),
            audio: AudioManager::new(&config.audio),
            engine,
            phase: GamePhase::Idle,
            bus: EventBus::new(),
            config,
            surface,
            player_name: None,
            rng,
            seed,
            clock_ms: 0.0,
            control: ControlHandle::default(),
            outcomes: Vec::new(),
            ticks: 0,
        }
    }

    // === Lifecycle ===

    /// Returns true if the game moved from idle to running
    pub fn start(&mut self) -> bool {
        self.perform(LifecycleAction::Start)
    }

    pub fn pause(&mut self) -> bool {
        self.perform(LifecycleAction::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.perform(LifecycleAction::Resume)
    }

    /// Stop and reset entities and score. Also the way out of `Finished`.
    pub fn stop(&mut self) -> bool {
        self.perform(LifecycleAction::Stop)
    }

    fn perform(&mut self, action: LifecycleAction) -> bool {
        let changed = self.transition(action);
        self.apply_requests();
        changed
    }

    fn apply_requests(&mut self) {
        while let Some(action) = self.control.take() {
            self.transition(action);
        }
    }

    fn transition(&mut self, action: LifecycleAction) -> bool {
        let Some(next) = self.phase.transition(action) else {
            log::trace!("Ignoring {:?} while {}", action, self.phase.as_str());
            return false;
        };
        log::info!("{}: {} -> {}", E::GAME_ID, self.phase.as_str(), next.as_str());
        self.phase = next;

        match action {
            LifecycleAction::Start => {
                self.game_loop.begin();
                self.ticks = 0;
                self.emit(EventData::GameStarted);
            }
            LifecycleAction::Pause => self.game_loop.suspend(),
            LifecycleAction::Resume => self.game_loop.begin(),
            LifecycleAction::Stop => {
                self.game_loop.cancel();
                self.engine.reset(&mut self.rng);
                self.audio.drain();
                self.ticks = 0;
            }
            LifecycleAction::Terminate => self.game_loop.cancel(),
        }
        true
    }

    fn finish(&mut self, reason: EndReason, final_score: u64) {
        if !self.transition(LifecycleAction::Terminate) {
            return;
        }
        log::info!("{} over: {} (score {})", E::GAME_ID, reason.as_str(), final_score);
        self.emit(EventData::GameOver {
            reason: reason.as_str().to_string(),
            final_score,
        });
        self.emit(EventData::GameFinished { final_score });
    }

    // === Settings that work in any phase ===

    /// Returns true if the mute state changed (and `soundMuted` fired)
    pub fn mute(&mut self) -> bool {
        let changed = self.audio.set_muted(true);
        if changed {
            self.emit(EventData::SoundMuted);
            self.apply_requests();
        }
        changed
    }

    pub fn unmute(&mut self) -> bool {
        let changed = self.audio.set_muted(false);
        if changed {
            self.emit(EventData::SoundUnmuted);
            self.apply_requests();
        }
        changed
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = Some(name.into());
    }

    // === Input and events ===

    /// Queue an input intent; applied on the next tick while running
    pub fn command(&mut self, command: E::Command) {
        self.engine.command(command);
    }

    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&GameEvent) + 'static) {
        self.bus.on(kind, callback);
    }

    /// Handle event callbacks can capture to request lifecycle changes
    pub fn control_handle(&self) -> ControlHandle {
        self.control.clone()
    }

    /// Update the clock used to stamp events outside of frames
    pub fn sync_clock(&mut self, now_ms: f64) {
        self.clock_ms = now_ms;
    }

    fn emit(&mut self, data: EventData) {
        let event = GameEvent {
            timestamp: self.clock_ms,
            player_name: self.player_name.clone(),
            game_id: Some(E::GAME_ID.to_string()),
            data,
        };
        self.bus.emit(&event);
    }

    // === Loop ===

    /// Feed a frame timestamp (ms). Returns the number of steps run.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        self.clock_ms = now_ms;
        self.apply_requests();

        let steps = self.game_loop.advance(now_ms);
        let mut ran = 0;
        for _ in 0..steps {
            if !self.step() {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// Run exactly one simulation step. Does nothing unless running.
    pub fn step(&mut self) -> bool {
        if !self.phase.is_running() {
            return false;
        }

        let mut outcomes = std::mem::take(&mut self.outcomes);
        outcomes.clear();
        self.engine.tick(&mut self.rng, &mut outcomes);
        self.ticks += 1;

        for outcome in &outcomes {
            if let Some(effect) = SoundEffect::for_outcome(outcome) {
                self.audio.play(effect);
            }
            match *outcome {
                Outcome::Contact(_) => {}
                Outcome::Scored { side, score, delta } => {
                    log::debug!("{} score {:?} +{} = {}", E::GAME_ID, side, delta, score);
                    self.emit(EventData::ScoreUpdate { score, delta, side });
                }
                Outcome::LifeLost { lives } => {
                    log::debug!("{} life lost, {} left", E::GAME_ID, lives);
                    self.emit(EventData::LifeLost { lives });
                }
                Outcome::Terminated {
                    reason,
                    final_score,
                } => self.finish(reason, final_score),
            }
        }

        self.outcomes = outcomes;
        self.apply_requests();
        true
    }

    /// Whether the host should keep requesting frames
    pub fn wants_frames(&self) -> bool {
        self.game_loop.is_active()
    }

    // === Accessors ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn snapshot(&self) -> GameSnapshot<E::Snapshot> {
        GameSnapshot {
            game_id: E::GAME_ID,
            phase: self.phase,
            score: self.engine.score(),
            muted: self.audio.is_muted(),
            player_name: self.player_name.clone(),
            ticks: self.ticks,
            entities: self.engine.snapshot(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn step_interval_ms(&self) -> f64 {
        self.game_loop.step_ms()
    }

    /// Take queued sound cues for the audio collaborator
    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        self.audio.drain()
    }
}

impl<E: Engine + std::fmt::Debug> std::fmt::Debug for Game<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("game_id", &E::GAME_ID)
            .field("phase", &self.phase)
            .field("engine", &self.engine)
            .field("loop", &self.game_loop)
            .field("bus", &self.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::engine::Contact;

    /// Scripted engine: plays back a fixed outcome list, one entry per tick
    #[derive(Debug, Default)]
    struct Scripted {
        script: VecDeque<Vec<Outcome>>,
        position: u32,
        score: u64,
        resets: u32,
    }

    impl Engine for Scripted {
        type Command = u32;
        type Snapshot = u32;

        const GAME_ID: &'static str = "scripted";
        const BASE_INTERVAL_MS: f64 = 10.0;

        fn command(&mut self, command: u32) {
            self.position += command;
        }

        fn tick(&mut self, _rng: &mut Pcg32, out: &mut Vec<Outcome>) {
            self.position += 1;
            if let Some(outcomes) = self.script.pop_front() {
                for outcome in &outcomes {
                    if let Outcome::Scored { score, .. } = outcome {
                        self.score = *score;
                    }
                }
                out.extend(outcomes);
            }
        }

        fn reset(&mut self, _rng: &mut Pcg32) {
            self.position = 0;
            self.score = 0;
            self.resets += 1;
        }

        fn snapshot(&self) -> u32 {
            self.position
        }

        fn score(&self) -> u64 {
            self.score
        }
    }

    fn game(script: Vec<Vec<Outcome>>) -> Game<Scripted> {
        let engine = Scripted {
            script: script.into(),
            ..Default::default()
        };
        Game::with_seed(SurfaceHandle::default(), GameConfig::default(), engine, 7)
    }

    fn recorder(game: &mut Game<Scripted>) -> Rc<RefCell<Vec<GameEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = log.clone();
            game.on(kind, move |event| log.borrow_mut().push(event.clone()));
        }
        log
    }

    fn kinds(log: &Rc<RefCell<Vec<GameEvent>>>) -> Vec<EventKind> {
        log.borrow().iter().map(GameEvent::kind).collect()
    }

    #[test]
    fn test_start_emits_game_started() {
        let mut game = game(vec![]);
        let log = recorder(&mut game);
        game.set_player_name("ada");

        assert!(game.start());
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(kinds(&log), vec![EventKind::GameStarted]);
        assert_eq!(log.borrow()[0].player_name.as_deref(), Some("ada"));
        assert_eq!(log.borrow()[0].game_id.as_deref(), Some("scripted"));
    }

    #[test]
    fn test_illegal_transitions_are_silent() {
        let mut game = game(vec![]);
        let log = recorder(&mut game);

        assert!(!game.pause());
        assert!(!game.resume());
        assert!(!game.stop());
        assert_eq!(game.phase(), GamePhase::Idle);

        game.start();
        assert!(!game.start());
        assert!(!game.resume());
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(kinds(&log), vec![EventKind::GameStarted]);
    }

    /// Fresh game driven into `phase` through the public lifecycle
    fn game_in(phase: GamePhase) -> Game<Scripted> {
        let mut game = game(vec![
            vec![],
            vec![Outcome::Terminated {
                reason: EndReason::Wall,
                final_score: 0,
            }],
        ]);
        match phase {
            GamePhase::Idle => {}
            GamePhase::Running => {
                game.start();
            }
            GamePhase::Paused => {
                game.start();
                game.pause();
            }
            GamePhase::Finished => {
                game.start();
                game.step();
                game.step();
            }
        }
        assert_eq!(game.phase(), phase);
        game
    }

    #[test]
    fn test_every_illegal_action_leaves_game_untouched() {
        let actions: [(LifecycleAction, fn(&mut Game<Scripted>) -> bool); 4] = [
            (LifecycleAction::Start, Game::start),
            (LifecycleAction::Pause, Game::pause),
            (LifecycleAction::Resume, Game::resume),
            (LifecycleAction::Stop, Game::stop),
        ];
        let mut checked = 0;
        for phase in GamePhase::ALL {
            for (action, perform) in actions {
                if phase.transition(action).is_some() {
                    continue;
                }
                let mut game = game_in(phase);
                let log = recorder(&mut game);
                let before = game.snapshot();
                let looping = game.wants_frames();

                assert!(!perform(&mut game), "{action:?} while {}", phase.as_str());
                assert_eq!(game.phase(), phase);
                assert_eq!(game.snapshot(), before);
                assert_eq!(game.wants_frames(), looping);
                assert!(log.borrow().is_empty(), "{action:?} while {} emitted", phase.as_str());
                checked += 1;
            }
        }
        // Idle: pause, resume, stop. Running: start, resume. Paused: start, pause.
        // Finished: start, pause, resume.
        assert_eq!(checked, 10);
    }

    #[test]
    fn test_no_ticks_unless_running() {
        let mut game = game(vec![]);
        assert!(!game.step());
        game.start();
        assert!(game.step());
        game.pause();
        assert!(!game.step());
        assert_eq!(game.snapshot().entities, 1);
    }

    #[test]
    fn test_frames_drive_steps() {
        let mut game = game(vec![]);
        game.start();
        assert_eq!(game.frame(0.0), 0);
        assert_eq!(game.frame(25.0), 2);
        assert_eq!(game.frame(35.0), 1);
        assert_eq!(game.snapshot().ticks, 3);
    }

    #[test]
    fn test_animation_speed_scales_step() {
        let mut config = GameConfig::default();
        config.animation.speed = 2.0;
        let game = Game::with_seed(SurfaceHandle::default(), config, Scripted::default(), 1);
        assert_eq!(game.step_interval_ms(), 5.0);
    }

    #[test]
    fn test_termination_emits_over_then_finished() {
        let mut game = game(vec![
            vec![Outcome::Scored {
                side: None,
                score: 5,
                delta: 5,
            }],
            vec![Outcome::Terminated {
                reason: EndReason::Wall,
                final_score: 5,
            }],
            vec![],
        ]);
        let log = recorder(&mut game);
        game.start();
        game.frame(0.0);
        game.frame(50.0);

        assert_eq!(game.phase(), GamePhase::Finished);
        assert_eq!(game.snapshot().ticks, 2, "No step after termination");
        assert!(!game.wants_frames());
        assert_eq!(
            kinds(&log),
            vec![
                EventKind::GameStarted,
                EventKind::ScoreUpdate,
                EventKind::GameOver,
                EventKind::GameFinished,
            ]
        );
        assert_eq!(
            log.borrow()[2].data,
            EventData::GameOver {
                reason: "wall".to_string(),
                final_score: 5,
            }
        );
    }

    #[test]
    fn test_stop_resets_and_allows_restart_after_finish() {
        let mut game = game(vec![vec![Outcome::Terminated {
            reason: EndReason::Collision,
            final_score: 0,
        }]]);
        game.start();
        game.step();
        assert_eq!(game.phase(), GamePhase::Finished);
        assert!(!game.start(), "Finished needs stop first");

        assert!(game.stop());
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.snapshot().entities, 0);
        assert_eq!(game.snapshot().ticks, 0);
        assert!(game.start());
    }

    #[test]
    fn test_stop_from_handler_prevents_next_step() {
        let script = (0..10)
            .map(|i| {
                vec![Outcome::Scored {
                    side: None,
                    score: i + 1,
                    delta: 1,
                }]
            })
            .collect();
        let mut game = game(script);
        let control = game.control_handle();
        game.on(EventKind::ScoreUpdate, move |_| control.request_stop());

        game.start();
        game.frame(0.0);
        let ran = game.frame(50.0);

        assert_eq!(ran, 1, "Stop requested in the first tick's handler");
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_pause_twice_is_idempotent() {
        let mut game = game(vec![]);
        game.start();
        game.step();
        game.pause();
        let first = game.snapshot();
        assert!(!game.pause());
        assert_eq!(game.snapshot(), first);
    }

    #[test]
    fn test_resume_does_not_catch_up() {
        let mut game = game(vec![]);
        game.start();
        game.frame(0.0);
        game.frame(5.0);
        game.pause();
        game.frame(10_000.0);
        game.resume();
        assert_eq!(game.frame(20_000.0), 0);
        assert_eq!(game.frame(20_010.0), 1);
    }

    #[test]
    fn test_mute_unmute_events_and_sound_queue() {
        let mut game = game(vec![vec![Outcome::Contact(Contact::Paddle)]]);
        let log = recorder(&mut game);

        assert!(game.mute());
        assert!(!game.mute());
        assert!(game.snapshot().muted);
        game.start();
        game.step();
        assert!(game.drain_sounds().is_empty());

        assert!(game.unmute());
        assert_eq!(
            kinds(&log),
            vec![
                EventKind::SoundMuted,
                EventKind::GameStarted,
                EventKind::SoundUnmuted,
            ]
        );
        assert_eq!(game.phase(), GamePhase::Running, "Mute never changes phase");
    }

    #[test]
    fn test_events_carry_clock() {
        let mut game = game(vec![]);
        let log = recorder(&mut game);
        game.sync_clock(1234.5);
        game.start();
        assert_eq!(log.borrow()[0].timestamp, 1234.5);
    }
}
