//! Button events and the gestures derived from them.

/// Raw edge reported by the button.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonEvent {
    Press,
    Release,
}

/// Polled button source.
pub trait ButtonSource {
    type Error;

    fn poll_event(&mut self) -> Result<Option<ButtonEvent>, Self::Error>;
}

/// Requests carried to the render loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlEvent {
    Collect,
    Restart,
    Shutdown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gesture {
    Collect,
}

/// Turns press/release pairs into gestures.
#[derive(Clone, Copy, Debug)]
pub struct PressTracker {
    hold_limit_ms: u64,
    pressed_at: Option<u64>,
}

impl PressTracker {
    pub const fn new(hold_limit_ms: u64) -> Self {
        Self {
            hold_limit_ms,
            pressed_at: None,
        }
    }

    pub fn pressed_at(&self) -> Option<u64> {
        self.pressed_at
    }

    /// A release counts as a collect only when it ends a press shorter than the restart hold.
    pub fn on_event(&mut self, event: ButtonEvent, now_ms: u64) -> Option<Gesture> {
        match event {
            ButtonEvent::Press => {
                self.pressed_at = Some(now_ms);
                None
            }
            ButtonEvent::Release => {
                let pressed_at = self.pressed_at.take()?;
                if now_ms.saturating_sub(pressed_at) < self.hold_limit_ms {
                    Some(Gesture::Collect)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HoldPoll {
    Holding,
    Released,
    Elapsed,
}

/// Long-press detector for one press.
#[derive(Clone, Copy, Debug)]
pub struct HoldWatch {
    pressed_at: u64,
    hold_ms: u64,
}

impl HoldWatch {
    pub const fn new(pressed_at: u64, hold_ms: u64) -> Self {
        Self { pressed_at, hold_ms }
    }

    pub fn poll(&self, now_ms: u64, still_pressed: bool) -> HoldPoll {
        if !still_pressed {
            HoldPoll::Released
        } else if now_ms.saturating_sub(self.pressed_at) >= self.hold_ms {
            HoldPoll::Elapsed
        } else {
            HoldPoll::Holding
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press_collects() {
        let mut tracker = PressTracker::new(5_000);

        assert_eq!(tracker.on_event(ButtonEvent::Press, 100), None);
        assert_eq!(tracker.pressed_at(), Some(100));
        assert_eq!(
            tracker.on_event(ButtonEvent::Release, 300),
            Some(Gesture::Collect)
        );
        assert_eq!(tracker.pressed_at(), None);
    }

    #[test]
    fn long_press_does_not_collect() {
        let mut tracker = PressTracker::new(5_000);

        tracker.on_event(ButtonEvent::Press, 0);
        assert_eq!(tracker.on_event(ButtonEvent::Release, 5_000), None);
    }

    #[test]
    fn stray_release_is_ignored() {
        let mut tracker = PressTracker::new(5_000);
        assert_eq!(tracker.on_event(ButtonEvent::Release, 10), None);
    }

    #[test]
    fn hold_watch_exits_on_release_and_fires_after_hold() {
        let watch = HoldWatch::new(1_000, 5_000);

        assert_eq!(watch.poll(1_100, true), HoldPoll::Holding);
        assert_eq!(watch.poll(5_900, true), HoldPoll::Holding);
        assert_eq!(watch.poll(6_000, true), HoldPoll::Elapsed);
        assert_eq!(watch.poll(3_000, false), HoldPoll::Released);
    }
}
