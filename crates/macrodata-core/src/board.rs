//! Board collaborator consumed by the engine.
//!
//! Button presses are not delivered through callbacks: the board glue turns them into
//! [`crate::input::ButtonEvent`]s on a queue the render loop drains once per frame.

use core::fmt::Debug;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const OFF: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Display, backlight, status LED and button of the target board.
pub trait Board {
    type Error: Debug;

    fn panel_width(&self) -> u16;
    fn panel_height(&self) -> u16;

    /// Blits big-endian RGB565 pixels into the given window.
    fn draw_image(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u8],
    ) -> Result<(), Self::Error>;

    fn set_backlight(&mut self, percent: u8) -> Result<(), Self::Error>;

    fn set_rgb(&mut self, color: Rgb8) -> Result<(), Self::Error>;

    /// Starts a fade from the current LED colour; it completes in the background.
    fn set_rgb_fade(&mut self, color: Rgb8, duration_ms: u32) -> Result<(), Self::Error>;

    fn is_button_pressed(&mut self) -> bool;

    /// Puts the hardware in a quiescent state before the process exits.
    fn cleanup(&mut self) -> Result<(), Self::Error>;
}

/// Linear colour fade between two LED colours.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RgbFade {
    from: Rgb8,
    to: Rgb8,
    start_ms: u64,
    duration_ms: u32,
}

impl RgbFade {
    pub const fn new(from: Rgb8, to: Rgb8, start_ms: u64, duration_ms: u32) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
        }
    }

    pub const fn target(&self) -> Rgb8 {
        self.to
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms as u64
    }

    pub fn color_at(&self, now_ms: u64) -> Rgb8 {
        if self.is_finished(now_ms) {
            return self.to;
        }

        let elapsed = now_ms.saturating_sub(self.start_ms);
        let duration = self.duration_ms as u64;
        let lerp = |from: u8, to: u8| -> u8 {
            let from = from as i64;
            let delta = to as i64 - from;
            (from + delta * elapsed as i64 / duration as i64) as u8
        };

        Rgb8::new(
            lerp(self.from.r, self.to.r),
            lerp(self.from.g, self.to.g),
            lerp(self.from.b, self.to.b),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_interpolates_then_holds_target() {
        let fade = RgbFade::new(Rgb8::new(170, 250, 255), Rgb8::OFF, 1_000, 1_000);

        assert_eq!(fade.color_at(1_000), Rgb8::new(170, 250, 255));
        assert_eq!(fade.color_at(1_500), Rgb8::new(85, 125, 128));
        assert!(!fade.is_finished(1_999));
        assert_eq!(fade.color_at(2_000), Rgb8::OFF);
        assert_eq!(fade.color_at(9_000), Rgb8::OFF);
    }

    #[test]
    fn zero_duration_fade_is_immediate() {
        let fade = RgbFade::new(Rgb8::OFF, Rgb8::new(1, 2, 3), 50, 0);

        assert!(fade.is_finished(50));
        assert_eq!(fade.color_at(50), Rgb8::new(1, 2, 3));
    }
}
