use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;

use macrodata_core::input::{ButtonEvent, ButtonSource};

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
    debounce_polls: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_polls: 3,
        }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonInputError<PinErr> {
    Pin(PinErr),
}

/// Debounced push button producing press and release edges.
#[derive(Debug)]
pub struct ButtonInput<PIN> {
    pin: PIN,
    config: ButtonConfig,
    raw: bool,
    stable: bool,
    stable_count: u8,
}

impl<PIN> ButtonInput<PIN>
where
    PIN: InputPin,
{
    pub fn new(mut pin: PIN, config: ButtonConfig) -> Result<Self, ButtonInputError<PIN::Error>> {
        let high = pin.is_high().map_err(ButtonInputError::Pin)?;
        let pressed = pressed_from_level(high, config.active_low);

        Ok(Self {
            pin,
            config,
            raw: pressed,
            stable: pressed,
            stable_count: 0,
        })
    }

    /// Debounced level.
    pub fn is_pressed(&self) -> bool {
        self.stable
    }
}

impl<PIN> ButtonSource for ButtonInput<PIN>
where
    PIN: InputPin,
{
    type Error = ButtonInputError<PIN::Error>;

    fn poll_event(&mut self) -> Result<Option<ButtonEvent>, Self::Error> {
        let high = self.pin.is_high().map_err(ButtonInputError::Pin)?;
        let pressed = pressed_from_level(high, self.config.active_low);

        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        let threshold = self.config.debounce_polls.max(1);
        if self.stable_count >= threshold && self.stable != self.raw {
            self.stable = self.raw;
            return Ok(Some(if self.stable {
                ButtonEvent::Press
            } else {
                ButtonEvent::Release
            }));
        }

        Ok(None)
    }
}

/// Debounced button level shared between the polling task and the board.
#[derive(Debug, Default)]
pub struct ButtonLatch(AtomicBool);

impl ButtonLatch {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self, pressed: bool) {
        self.0.store(pressed, Ordering::Release);
    }

    pub fn is_pressed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Records the level implied by `event`.
    pub fn observe(&self, event: ButtonEvent) {
        self.set(event == ButtonEvent::Press);
    }
}

#[inline]
fn pressed_from_level(high: bool, active_low: bool) -> bool {
    if active_low { !high } else { high }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::digital::ErrorType;

    use super::*;

    struct ScriptedPin<'a> {
        levels: &'a [bool],
        cursor: usize,
    }

    impl<'a> ScriptedPin<'a> {
        const fn new(levels: &'a [bool]) -> Self {
            Self { levels, cursor: 0 }
        }
    }

    impl ErrorType for ScriptedPin<'_> {
        type Error = Infallible;
    }

    impl InputPin for ScriptedPin<'_> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            let index = self.cursor.min(self.levels.len() - 1);
            self.cursor = self.cursor.saturating_add(1);
            Ok(self.levels[index])
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    fn drain<P: InputPin>(button: &mut ButtonInput<P>, polls: usize) -> Vec<ButtonEvent> {
        (0..polls)
            .filter_map(|_| button.poll_event().ok().flatten())
            .collect()
    }

    #[test]
    fn stable_press_and_release_emit_one_edge_each() {
        // Idle high (active low), pressed for six polls, then released.
        let levels = [
            true, true, false, false, false, false, false, false, true, true, true, true, true,
        ];
        let mut button = ButtonInput::new(ScriptedPin::new(&levels), ButtonConfig::default())
            .unwrap();

        let events = drain(&mut button, levels.len());

        assert_eq!(events, [ButtonEvent::Press, ButtonEvent::Release]);
        assert!(!button.is_pressed());
    }

    #[test]
    fn bounces_shorter_than_threshold_are_ignored() {
        let levels = [true, false, true, false, true, true, true, true, true];
        let mut button = ButtonInput::new(ScriptedPin::new(&levels), ButtonConfig::default())
            .unwrap();

        assert!(drain(&mut button, levels.len()).is_empty());
    }

    #[test]
    fn active_high_wiring_is_supported() {
        let levels = [false, true, true, true, true, true];
        let config = ButtonConfig::default()
            .with_active_low(false)
            .with_debounce_polls(2);
        let mut button = ButtonInput::new(ScriptedPin::new(&levels), config).unwrap();

        assert_eq!(drain(&mut button, levels.len()), [ButtonEvent::Press]);
        assert!(button.is_pressed());
    }

    #[test]
    fn latch_tracks_events() {
        let latch = ButtonLatch::new();
        latch.observe(ButtonEvent::Press);
        assert!(latch.is_pressed());
        latch.observe(ButtonEvent::Release);
        assert!(!latch.is_pressed());
    }
}
