//! Canvas Arcade entry point
//!
//! The web build is driven from JavaScript through `WebGame`. Natively this
//! runs each game headless with a simple autopilot and logs what happens.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use canvas_arcade::sim::{Direction, PaddleIntent, PongMode, Side};
    use canvas_arcade::{
        ArcadeCommand, ArcadeGame, EventData, EventKind, GameConfig, GameKind, SurfaceHandle,
    };

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Stop a demo that has not finished after this much simulated time
    const DEMO_LIMIT_MS: f64 = 120_000.0;

    pub fn run() {
        for kind in GameKind::ALL {
            play(kind);
        }
    }

    fn play(kind: GameKind) {
        let surface = SurfaceHandle::new(format!("{}-canvas", kind.as_str()), 800, 600);
        let config = GameConfig::default();
        let mut game = ArcadeGame::with_seed(kind, surface, config, PongMode::PlayerVsAi, 42);
        game.set_player_name("demo");

        for event_kind in EventKind::ALL {
            game.on(event_kind, |event| match &event.data {
                EventData::ScoreUpdate { score, delta, .. } => {
                    log::info!("[{:>8.0} ms] score +{delta} -> {score}", event.timestamp)
                }
                EventData::GameOver {
                    reason,
                    final_score,
                } => {
                    let at = event.timestamp;
                    log::info!("[{at:>8.0} ms] game over: {reason} ({final_score})")
                }
                other => log::info!("[{:>8.0} ms] {}", event.timestamp, other.kind().as_str()),
            });
        }

        game.start();
        let mut now = 0.0;
        while game.wants_frames() && now < DEMO_LIMIT_MS {
            autopilot(&mut game, now);
            game.frame(now);
            game.drain_sounds();
            now += FRAME_MS;
        }

        if game.wants_frames() {
            let seconds = DEMO_LIMIT_MS / 1000.0;
            log::info!("{} still running after {seconds} s, stopping", kind.as_str());
            game.stop();
        }
        match game.snapshot_json() {
            Ok(snapshot) => log::debug!("final state: {snapshot}"),
            Err(e) => log::warn!("snapshot failed: {e}"),
        }
        println!("{:<9} score {}", kind.as_str(), game.score());
    }

    /// Cheap inputs so every game produces some events
    fn autopilot(game: &mut ArcadeGame, now: f64) {
        let tick = (now / FRAME_MS) as u64;
        let command = match game.kind() {
            GameKind::Snake => {
                let direction = match (tick / 40) % 4 {
                    0 => Direction::Right,
                    1 => Direction::Down,
                    2 => Direction::Left,
                    _ => Direction::Up,
                };
                ArcadeCommand::Steer { direction }
            }
            GameKind::Pong | GameKind::Breakout => ArcadeCommand::Paddle {
                side: Side::Player,
                intent: match (tick / 30) % 3 {
                    0 => PaddleIntent::Negative,
                    1 => PaddleIntent::Hold,
                    _ => PaddleIntent::Positive,
                },
            },
        };
        game.command(command);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Canvas Arcade (native) - headless demo");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `web::init_logging`, this is just to satisfy the compiler
}
