//! Per-run frame bookkeeping: lifecycle, collect trigger, clock countdown, focus cadence.

use log::{debug, info};
use rand::Rng;

use crate::config::EngineConfig;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// What the caller owes the rest of the engine after a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameReport {
    pub frame: u32,
    pub randomize_focus: bool,
}

#[derive(Clone, Debug)]
pub struct AnimationLoop {
    state: LoopState,
    frame: u32,
    focus_period: u32,
    idle_reset: u32,
    idle_countdown: u32,
    show_clock: bool,
    collect_pending: bool,
    destinations_x: [i32; 5],
    destination: (i32, i32),
}

impl AnimationLoop {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: LoopState::Stopped,
            frame: 0,
            focus_period: config.focus_period_frames(),
            idle_reset: config.idle_countdown_frames,
            idle_countdown: config.idle_countdown_frames,
            // Visible from boot until the first collect.
            show_clock: true,
            collect_pending: false,
            destinations_x: config.collect_destinations_x,
            destination: (config.collect_destinations_x[0], config.collect_destination_y),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn start(&mut self) {
        if self.state != LoopState::Running {
            self.state = LoopState::Running;
            info!("animation: running frame={}", self.frame);
        }
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            self.state = LoopState::Stopped;
            info!("animation: stopped frame={}", self.frame);
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn show_clock(&self) -> bool {
        self.show_clock
    }

    pub fn idle_countdown(&self) -> u32 {
        self.idle_countdown
    }

    /// Landing point of the most recent collect flight.
    pub fn destination(&self) -> (i32, i32) {
        self.destination
    }

    /// Arms or disarms the collect trigger for the next frame. Either way the clock
    /// hides and the idle countdown restarts.
    pub fn set_collecting<R: Rng + ?Sized>(&mut self, collecting: bool, rng: &mut R) {
        self.collect_pending = collecting;
        self.idle_countdown = self.idle_reset;
        self.show_clock = false;
        if !collecting {
            return;
        }

        let index = rng.random_range(0..self.destinations_x.len());
        self.destination.0 = self.destinations_x[index];
        debug!(
            "animation: collect armed destination=({},{})",
            self.destination.0, self.destination.1
        );
    }

    /// Returns the trigger once, then clears it.
    pub fn take_collect(&mut self) -> bool {
        core::mem::take(&mut self.collect_pending)
    }

    pub fn finish_frame(&mut self) -> FrameReport {
        self.frame = self.frame.wrapping_add(1);
        if self.idle_countdown > 0 {
            self.idle_countdown -= 1;
        } else {
            self.show_clock = true;
        }

        FrameReport {
            frame: self.frame,
            randomize_focus: self.frame % self.focus_period == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    #[test]
    fn start_and_stop_transition_state() {
        let mut animation = AnimationLoop::new(&EngineConfig::default());
        assert_eq!(animation.state(), LoopState::Stopped);

        animation.start();
        assert!(animation.is_running());
        animation.stop();
        assert_eq!(animation.state(), LoopState::Stopped);
    }

    #[test]
    fn collect_trigger_is_consumed_once() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut animation = AnimationLoop::new(&EngineConfig::default());

        animation.set_collecting(true, &mut rng);
        assert!(animation.take_collect());
        assert!(!animation.take_collect());
        animation.finish_frame();
        assert!(!animation.take_collect());
    }

    #[test]
    fn disarming_clears_pending_trigger() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut animation = AnimationLoop::new(&EngineConfig::default());

        animation.set_collecting(true, &mut rng);
        animation.set_collecting(false, &mut rng);
        assert!(!animation.take_collect());
    }

    #[test]
    fn disarming_also_hides_clock_and_restarts_countdown() {
        let mut rng = SmallRng::seed_from_u64(3);
        let config = EngineConfig::default().with_idle_countdown_frames(2);
        let mut animation = AnimationLoop::new(&config);
        let before = animation.destination();

        animation.set_collecting(false, &mut rng);
        assert!(!animation.show_clock());
        assert_eq!(animation.idle_countdown(), 2);
        assert_eq!(animation.destination(), before);

        for _ in 0..3 {
            animation.finish_frame();
        }
        assert!(animation.show_clock());
        animation.set_collecting(false, &mut rng);
        assert!(!animation.show_clock());
        assert_eq!(animation.idle_countdown(), 2);
    }

    #[test]
    fn destination_comes_from_landing_spots() {
        let mut rng = SmallRng::seed_from_u64(8);
        let config = EngineConfig::default();
        let mut animation = AnimationLoop::new(&config);
        assert_eq!(animation.destination(), (50, 380));

        for _ in 0..50 {
            animation.set_collecting(true, &mut rng);
            let (x, y) = animation.destination();
            assert!(config.collect_destinations_x.contains(&x));
            assert_eq!(y, 380);
        }
    }

    #[test]
    fn focus_randomizes_every_two_seconds_of_frames() {
        let config = EngineConfig::default();

        for frames in [0u32, 59, 60, 61, 179, 180, 1_000] {
            let mut animation = AnimationLoop::new(&config);
            let randomized = (0..frames)
                .filter(|_| animation.finish_frame().randomize_focus)
                .count() as u32;
            assert_eq!(randomized, frames / 60, "frames={frames}");
        }
    }

    #[test]
    fn clock_appears_after_idle_countdown_and_hides_on_collect() {
        let mut rng = SmallRng::seed_from_u64(6);
        let config = EngineConfig::default().with_idle_countdown_frames(3);
        let mut animation = AnimationLoop::new(&config);
        assert!(animation.show_clock());
        animation.set_collecting(true, &mut rng);

        for _ in 0..3 {
            animation.finish_frame();
            assert!(!animation.show_clock());
        }
        animation.finish_frame();
        assert!(animation.show_clock());
        animation.finish_frame();
        assert!(animation.show_clock());

        animation.take_collect();
        animation.set_collecting(true, &mut rng);
        assert!(!animation.show_clock());
        assert_eq!(animation.idle_countdown(), 3);
    }
}
