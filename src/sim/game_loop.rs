//! Fixed timestep loop driver
//!
//! The host feeds frame timestamps; the loop turns elapsed time into a whole
//! number of simulation steps and keeps the remainder for the next frame.

use crate::consts::MAX_SUBSTEPS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Torn down; frames are ignored
    Stopped,
    /// Paused; frames are ignored and no remainder is kept
    Suspended,
    /// Stepping on every frame
    Active,
}

#[derive(Debug, Clone)]
pub struct FixedStepLoop {
    step_ms: f64,
    accumulator: f64,
    last_time: Option<f64>,
    state: LoopState,
}

impl FixedStepLoop {
    pub fn new(step_ms: f64) -> Self {
        Self {
            step_ms,
            accumulator: 0.0,
            last_time: None,
            state: LoopState::Stopped,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Whether the host should keep requesting frames
    pub fn is_active(&self) -> bool {
        self.state == LoopState::Active
    }

    /// Leftover time not yet consumed by a step
    pub fn remainder_ms(&self) -> f64 {
        self.accumulator
    }

    /// Start (or resume) stepping. The next frame only anchors the clock.
    pub fn begin(&mut self) {
        self.state = LoopState::Active;
        self.forget_time();
    }

    /// Pause: stop stepping and drop the remainder so resume never catches up
    pub fn suspend(&mut self) {
        if self.state == LoopState::Active {
            self.state = LoopState::Suspended;
        }
        self.forget_time();
    }

    /// Tear down. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.state = LoopState::Stopped;
        self.forget_time();
    }

    fn forget_time(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }

    /// Feed a frame timestamp, returning how many steps to run now
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if self.state != LoopState::Active {
            return 0;
        }

        let Some(prev) = self.last_time.replace(now_ms) else {
            return 0;
        };

        // Clocks that jump backwards contribute nothing
        let elapsed = (now_ms - prev).max(0.0);
        if !elapsed.is_finite() {
            return 0;
        }
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.step_ms && steps < MAX_SUBSTEPS {
            self.accumulator -= self.step_ms;
            steps += 1;
        }

        if self.accumulator >= self.step_ms {
            let dropped = (self.accumulator / self.step_ms).floor();
            log::debug!("Frame backlog exceeded {MAX_SUBSTEPS} steps, dropping {dropped}");
            self.accumulator %= self.step_ms;
        }

        steps
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_first_frame_only_anchors() {
        let mut game_loop = FixedStepLoop::new(10.0);
        game_loop.begin();
        assert_eq!(game_loop.advance(1000.0), 0);
        assert_eq!(game_loop.advance(1010.0), 1);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut game_loop = FixedStepLoop::new(10.0);
        game_loop.begin();
        game_loop.advance(0.0);
        assert_eq!(game_loop.advance(15.0), 1);
        assert!((game_loop.remainder_ms() - 5.0).abs() < 1e-9);
        assert_eq!(game_loop.advance(20.0), 1);
        assert!(game_loop.remainder_ms().abs() < 1e-9);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut game_loop = FixedStepLoop::new(10.0);
        game_loop.begin();
        game_loop.advance(0.0);
        // Tab came back after a minute in the background
        assert_eq!(game_loop.advance(60_000.0), MAX_SUBSTEPS);
        assert!(game_loop.remainder_ms() < 10.0);
    }

    #[test]
    fn test_suspend_discards_remainder() {
        let mut game_loop = FixedStepLoop::new(10.0);
        game_loop.begin();
        game_loop.advance(0.0);
        game_loop.advance(7.0);
        game_loop.suspend();
        assert_eq!(game_loop.state(), LoopState::Suspended);
        assert_eq!(game_loop.remainder_ms(), 0.0);
        assert_eq!(game_loop.advance(500.0), 0);

        game_loop.begin();
        assert_eq!(game_loop.advance(1000.0), 0, "No catch-up after resume");
        assert_eq!(game_loop.advance(1010.0), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut game_loop = FixedStepLoop::new(10.0);
        game_loop.begin();
        game_loop.cancel();
        game_loop.cancel();
        assert_eq!(game_loop.state(), LoopState::Stopped);
        assert!(!game_loop.is_active());
        assert_eq!(game_loop.advance(100.0), 0);
    }

    #[test]
    fn test_backwards_clock_is_ignored() {
        let mut game_loop = FixedStepLoop::new(10.0);
        game_loop.begin();
        game_loop.advance(100.0);
        assert_eq!(game_loop.advance(50.0), 0);
        assert_eq!(game_loop.advance(60.0), 1);
    }

    proptest! {
        #[test]
        fn prop_steps_bounded_and_remainder_below_step(
            step in 1.0f64..50.0,
            deltas in proptest::collection::vec(0.0f64..500.0, 1..40),
        ) {
            let mut game_loop = FixedStepLoop::new(step);
            game_loop.begin();
            let mut now = 0.0;
            game_loop.advance(now);
            for delta in deltas {
                now += delta;
                let steps = game_loop.advance(now);
                prop_assert!(steps <= MAX_SUBSTEPS);
                prop_assert!(game_loop.remainder_ms() < step);
                prop_assert!(game_loop.remainder_ms() >= 0.0);
            }
        }
    }
}
