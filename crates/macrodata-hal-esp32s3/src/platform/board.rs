use embedded_hal::{delay::DelayNs, digital::OutputPin, pwm::SetDutyCycle, spi::SpiDevice};
use log::info;
use st7789::St7789;

use macrodata_core::board::{Board, Rgb8};

use crate::{
    input::button::ButtonLatch,
    platform::led::{LedError, RgbLed},
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BoardError<DisplayErr, BacklightErr, LedErr> {
    Display(DisplayErr),
    Backlight(BacklightErr),
    Led(LedErr),
}

type WhisplayError<SPI, DC, RST, BL, R, G, B> = BoardError<
    st7789::Error<
        <SPI as embedded_hal::spi::ErrorType>::Error,
        <DC as embedded_hal::digital::ErrorType>::Error,
        <RST as embedded_hal::digital::ErrorType>::Error,
    >,
    <BL as embedded_hal::pwm::ErrorType>::Error,
    LedError<
        <R as embedded_hal::pwm::ErrorType>::Error,
        <G as embedded_hal::pwm::ErrorType>::Error,
        <B as embedded_hal::pwm::ErrorType>::Error,
    >,
>;

/// ST7789 panel, PWM backlight, RGB LED and push button of the Whisplay wiring.
pub struct WhisplayBoard<SPI, DC, RST, BL, R, G, B, D> {
    display: St7789<SPI, DC, RST>,
    backlight: BL,
    led: RgbLed<R, G, B>,
    button: &'static ButtonLatch,
    delay: D,
    now_ms: fn() -> u64,
}

impl<SPI, DC, RST, BL, R, G, B, D> WhisplayBoard<SPI, DC, RST, BL, R, G, B, D>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    RST: OutputPin,
    BL: SetDutyCycle,
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
    D: DelayNs,
{
    pub fn new(
        display: St7789<SPI, DC, RST>,
        backlight: BL,
        led: RgbLed<R, G, B>,
        button: &'static ButtonLatch,
        delay: D,
        now_ms: fn() -> u64,
    ) -> Self {
        Self {
            display,
            backlight,
            led,
            button,
            delay,
            now_ms,
        }
    }

    /// Brings the panel up dark: backlight off, RAM cleared to black.
    pub fn init(&mut self) -> Result<(), WhisplayError<SPI, DC, RST, BL, R, G, B>> {
        self.backlight
            .set_duty_cycle_fully_off()
            .map_err(BoardError::Backlight)?;
        self.display
            .init(&mut self.delay)
            .map_err(BoardError::Display)?;
        self.display.fill(0x0000).map_err(BoardError::Display)?;

        let (width, height) = self.display.size();
        info!("board: panel ready size={}x{}", width, height);
        Ok(())
    }

    /// Advances the LED fade; call once per frame.
    pub fn service(&mut self) -> Result<(), WhisplayError<SPI, DC, RST, BL, R, G, B>> {
        let now = (self.now_ms)();
        self.led.service(now).map_err(BoardError::Led)
    }

    pub fn led(&self) -> &RgbLed<R, G, B> {
        &self.led
    }
}

impl<SPI, DC, RST, BL, R, G, B, D> Board for WhisplayBoard<SPI, DC, RST, BL, R, G, B, D>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    RST: OutputPin,
    BL: SetDutyCycle,
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
    D: DelayNs,
{
    type Error = WhisplayError<SPI, DC, RST, BL, R, G, B>;

    fn panel_width(&self) -> u16 {
        self.display.size().0
    }

    fn panel_height(&self) -> u16 {
        self.display.size().1
    }

    fn draw_image(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u8],
    ) -> Result<(), Self::Error> {
        self.display
            .draw_image(x, y, width, height, pixels)
            .map_err(BoardError::Display)
    }

    fn set_backlight(&mut self, percent: u8) -> Result<(), Self::Error> {
        self.backlight
            .set_duty_cycle_percent(percent.min(100))
            .map_err(BoardError::Backlight)
    }

    fn set_rgb(&mut self, color: Rgb8) -> Result<(), Self::Error> {
        self.led.set(color).map_err(BoardError::Led)
    }

    fn set_rgb_fade(&mut self, color: Rgb8, duration_ms: u32) -> Result<(), Self::Error> {
        let now = (self.now_ms)();
        self.led
            .start_fade(color, now, duration_ms)
            .map_err(BoardError::Led)
    }

    fn is_button_pressed(&mut self) -> bool {
        self.button.is_pressed()
    }

    /// Backlight and LED off, panel asleep. Every step runs; the first failure is reported.
    fn cleanup(&mut self) -> Result<(), Self::Error> {
        let backlight = self
            .backlight
            .set_duty_cycle_fully_off()
            .map_err(BoardError::Backlight);
        let led = self.led.set(Rgb8::OFF).map_err(BoardError::Led);
        let display = self
            .display
            .sleep(&mut self.delay)
            .map_err(BoardError::Display);

        backlight.and(led).and(display)
    }
}

#[cfg(test)]
mod tests {
    use core::{
        convert::Infallible,
        sync::atomic::{AtomicU64, Ordering},
    };

    use embedded_hal::{
        digital::ErrorType as PinErrorType,
        pwm::ErrorType as PwmErrorType,
        spi::{ErrorType as SpiErrorType, Operation},
    };
    use st7789::Config;

    use super::*;

    static CLOCK_MS: AtomicU64 = AtomicU64::new(0);
    static LATCH: ButtonLatch = ButtonLatch::new();

    fn now_ms() -> u64 {
        CLOCK_MS.load(Ordering::Relaxed)
    }

    #[derive(Default)]
    struct CountingSpi {
        bytes: usize,
    }

    impl SpiErrorType for CountingSpi {
        type Error = Infallible;
    }

    impl SpiDevice<u8> for CountingSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            for op in operations.iter() {
                if let Operation::Write(data) = op {
                    self.bytes += data.len();
                }
            }
            Ok(())
        }
    }

    struct Pin;

    impl PinErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Pwm {
        duty: u16,
    }

    impl PwmErrorType for Pwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for Pwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type TestBoard = WhisplayBoard<CountingSpi, Pin, Pin, Pwm, Pwm, Pwm, Pwm, NoDelay>;

    fn board() -> TestBoard {
        let display = St7789::new(CountingSpi::default(), Pin, Pin, Config::default());
        let led = RgbLed::new(Pwm::default(), Pwm::default(), Pwm::default(), false);
        WhisplayBoard::new(display, Pwm::default(), led, &LATCH, NoDelay, now_ms)
    }

    #[test]
    fn reports_panel_size_and_blits() {
        let mut board = board();
        board.init().unwrap();

        assert_eq!((board.panel_width(), board.panel_height()), (240, 280));
        let frame = vec![0u8; 240 * 280 * 2];
        board.draw_image(0, 0, 240, 280, &frame).unwrap();
        assert!(board.draw_image(0, 0, 240, 281, &frame).is_err());
    }

    #[test]
    fn backlight_percent_is_clamped() {
        let mut board = board();

        board.set_backlight(50).unwrap();
        assert_eq!(board.backlight.duty, 500);
        board.set_backlight(150).unwrap();
        assert_eq!(board.backlight.duty, 1000);
    }

    #[test]
    fn led_fade_uses_board_clock() {
        let mut board = board();
        CLOCK_MS.store(10_000, Ordering::Relaxed);

        board.set_rgb(Rgb8::new(170, 250, 255)).unwrap();
        board.set_rgb_fade(Rgb8::OFF, 1_000).unwrap();
        CLOCK_MS.store(11_000, Ordering::Relaxed);
        board.service().unwrap();

        assert_eq!(board.led().color(), Rgb8::OFF);
        assert!(!board.led().is_fading());
    }

    #[test]
    fn button_level_comes_from_latch() {
        let mut board = board();
        LATCH.set(true);
        assert!(board.is_button_pressed());
        LATCH.set(false);
        assert!(!board.is_button_pressed());
    }

    #[test]
    fn cleanup_darkens_everything() {
        let mut board = board();
        board.set_backlight(100).unwrap();
        board.set_rgb(Rgb8::new(1, 2, 3)).unwrap();

        board.cleanup().unwrap();

        assert_eq!(board.backlight.duty, 0);
        assert_eq!(board.led().color(), Rgb8::OFF);
    }
}
