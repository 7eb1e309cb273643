use embedded_hal::pwm::SetDutyCycle;

use macrodata_core::board::{Rgb8, RgbFade};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LedError<RedErr, GreenErr, BlueErr> {
    Red(RedErr),
    Green(GreenErr),
    Blue(BlueErr),
}

pub type LedResult<RedErr, GreenErr, BlueErr> = Result<(), LedError<RedErr, GreenErr, BlueErr>>;

/// Three PWM channels driving an RGB LED, with a software colour fade.
#[derive(Debug)]
pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    /// Common-anode LEDs light up on a low duty cycle.
    inverted: bool,
    current: Rgb8,
    fade: Option<RgbFade>,
}

impl<R, G, B> RgbLed<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    pub fn new(red: R, green: G, blue: B, inverted: bool) -> Self {
        Self {
            red,
            green,
            blue,
            inverted,
            current: Rgb8::OFF,
            fade: None,
        }
    }

    pub fn color(&self) -> Rgb8 {
        self.current
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Sets a colour immediately, cancelling any fade in progress.
    pub fn set(&mut self, color: Rgb8) -> LedResult<R::Error, G::Error, B::Error> {
        self.fade = None;
        self.apply(color)
    }

    pub fn start_fade(
        &mut self,
        color: Rgb8,
        now_ms: u64,
        duration_ms: u32,
    ) -> LedResult<R::Error, G::Error, B::Error> {
        let fade = RgbFade::new(self.current, color, now_ms, duration_ms);
        self.fade = Some(fade);
        self.service(now_ms)
    }

    /// Advances a running fade; call once per frame.
    pub fn service(&mut self, now_ms: u64) -> LedResult<R::Error, G::Error, B::Error> {
        let Some(fade) = self.fade else {
            return Ok(());
        };

        if fade.is_finished(now_ms) {
            self.fade = None;
        }
        self.apply(fade.color_at(now_ms))
    }

    fn apply(&mut self, color: Rgb8) -> LedResult<R::Error, G::Error, B::Error> {
        let level = |value: u8| -> u16 {
            if self.inverted {
                255 - value as u16
            } else {
                value as u16
            }
        };
        let (red, green, blue) = (level(color.r), level(color.g), level(color.b));

        self.red
            .set_duty_cycle_fraction(red, 255)
            .map_err(LedError::Red)?;
        self.green
            .set_duty_cycle_fraction(green, 255)
            .map_err(LedError::Green)?;
        self.blue
            .set_duty_cycle_fraction(blue, 255)
            .map_err(LedError::Blue)?;
        self.current = color;

        Ok(())
    }
}
