#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::Timer;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::{
    Blocking,
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    ledc::{
        LSGlobalClkSource, Ledc, LowSpeed,
        channel::{self, ChannelIFace},
        timer::{self, TimerIFace},
    },
    peripherals::{GPIO4, GPIO5, GPIO6, GPIO7, LEDC},
    rng::Rng,
    spi::{
        Mode,
        master::{Config as SpiConfig, ConfigError, Spi},
    },
    time::Rate,
    timer::timg::TimerGroup,
};
use log::{LevelFilter, info, warn};
use macrodata_core::{
    EngineConfig, MatrixEngine, audio::SilentAudio, board::Board, glyph::FontSet,
};
use macrodata_hal_esp32s3::{
    input::button::{ButtonConfig, ButtonInput},
    platform::{board::WhisplayBoard, led::RgbLed},
};
use rand::{SeedableRng, rngs::SmallRng};
use st7789::St7789;
use static_cell::StaticCell;

use buttons::{BUTTON_LATCH, HoldTimings};
use clock::WallClock;
use render::Scene;

#[path = "main/assets.rs"]
mod assets;
#[path = "main/buttons.rs"]
mod buttons;
#[path = "main/clock.rs"]
mod clock;
#[path = "main/power.rs"]
mod power;
#[path = "main/render.rs"]
mod render;

// Wiring: SCK=GPIO12 MOSI=GPIO11 CS=GPIO10 DC=GPIO9 RST=GPIO8 BL=GPIO7
// LED R=GPIO4 G=GPIO5 B=GPIO6, button=GPIO14 (active low, RTC capable for wake)
const DISPLAY_SPI_HZ: u32 = 40_000_000;
const PWM_FREQUENCY_KHZ: u32 = 24;
const LED_COMMON_ANODE: bool = true;
const BUTTON_DEBOUNCE_POLLS: u8 = 4;
const SHUTDOWN_HOLD_MS: u64 = 10_000;

type DisplaySpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;
type PwmChannel = channel::Channel<'static, LowSpeed>;
type MacrodataBoard = WhisplayBoard<
    DisplaySpi,
    Output<'static>,
    Output<'static>,
    PwmChannel,
    PwmChannel,
    PwmChannel,
    PwmChannel,
    Delay,
>;

static PWM_TIMER: StaticCell<timer::Timer<'static, LowSpeed>> = StaticCell::new();

#[derive(Debug)]
enum BringUpError {
    Spi(ConfigError),
    PwmTimer(timer::Error),
    PwmChannel(channel::Error),
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Nothing useful can run without the panel; stay alive so the log stays readable.
async fn park(stage: &str) -> ! {
    warn!("boot: {} failed, parking", stage);
    loop {
        Timer::after_secs(1).await;
    }
}

struct PwmPins {
    backlight: GPIO7<'static>,
    red: GPIO4<'static>,
    green: GPIO5<'static>,
    blue: GPIO6<'static>,
}

struct PwmChannels {
    backlight: PwmChannel,
    red: PwmChannel,
    green: PwmChannel,
    blue: PwmChannel,
}

fn pwm_channels(ledc: LEDC<'static>, pins: PwmPins) -> Result<PwmChannels, BringUpError> {
    let mut ledc = Ledc::new(ledc);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let mut pwm_timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    pwm_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty8Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_khz(PWM_FREQUENCY_KHZ),
        })
        .map_err(BringUpError::PwmTimer)?;
    let pwm_timer: &'static timer::Timer<'static, LowSpeed> = PWM_TIMER.init(pwm_timer);

    let mut backlight = ledc.channel(channel::Number::Channel0, pins.backlight);
    let mut red = ledc.channel(channel::Number::Channel1, pins.red);
    let mut green = ledc.channel(channel::Number::Channel2, pins.green);
    let mut blue = ledc.channel(channel::Number::Channel3, pins.blue);
    for pwm in [&mut backlight, &mut red, &mut green, &mut blue] {
        pwm.configure(channel::config::Config {
            timer: pwm_timer,
            duty_pct: 0,
            pin_config: channel::config::PinConfig::PushPull,
        })
        .map_err(BringUpError::PwmChannel)?;
    }

    Ok(PwmChannels {
        backlight,
        red,
        green,
        blue,
    })
}

fn seeded_rng() -> SmallRng {
    let mut hw = Rng::new();
    let seed = ((hw.random() as u64) << 32) | hw.random() as u64;
    SmallRng::seed_from_u64(seed)
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: macrodata starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);
    // Frame canvases live in PSRAM.
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let engine_config = EngineConfig::default();

    let spi_config = SpiConfig::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        .with_mode(Mode::_0);
    let spi = match Spi::new(peripherals.SPI2, spi_config).map_err(BringUpError::Spi) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO12)
            .with_mosi(peripherals.GPIO11),
        Err(err) => {
            warn!("display spi config failed: {:?}", err);
            park("spi").await
        }
    };
    let cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let Ok(spi_device) = ExclusiveDevice::new_no_delay(spi, cs);
    let dc = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO8, Level::High, OutputConfig::default());
    let display = St7789::new(
        spi_device,
        dc,
        rst,
        st7789::Config::default().with_spi_hz(DISPLAY_SPI_HZ),
    );

    let pwm = match pwm_channels(
        peripherals.LEDC,
        PwmPins {
            backlight: peripherals.GPIO7,
            red: peripherals.GPIO4,
            green: peripherals.GPIO5,
            blue: peripherals.GPIO6,
        },
    ) {
        Ok(pwm) => pwm,
        Err(err) => {
            warn!("pwm bring-up failed: {:?}", err);
            park("pwm").await
        }
    };
    let led = RgbLed::new(pwm.red, pwm.green, pwm.blue, LED_COMMON_ANODE);

    let mut board: MacrodataBoard = WhisplayBoard::new(
        display,
        pwm.backlight,
        led,
        &BUTTON_LATCH,
        Delay::new(),
        clock::uptime_ms,
    );
    esp_println::println!("display: init begin (SCK=12 MOSI=11 CS=10 DC=9 RST=8 BL=7)");
    if let Err(err) = board.init() {
        esp_println::println!("display: init failed");
        warn!("display init failed: {:?}", err);
        park("display").await;
    }
    esp_println::println!("display: init ok");

    let button_pin = Input::new(
        peripherals.GPIO14,
        InputConfig::default().with_pull(Pull::Up),
    );
    let Ok(button) = ButtonInput::new(
        button_pin,
        ButtonConfig::default().with_debounce_polls(BUTTON_DEBOUNCE_POLLS),
    );

    match buttons::button_task(button, engine_config.restart_hold_ms) {
        Ok(token) => spawner.spawn(token),
        Err(err) => warn!("boot: button task not started err={:?}", err),
    }
    let timings = HoldTimings {
        restart_ms: engine_config.restart_hold_ms,
        shutdown_ms: SHUTDOWN_HOLD_MS,
        poll_ms: engine_config.hold_poll_ms,
    };
    match buttons::hold_watch_task(timings) {
        Ok(token) => spawner.spawn(token),
        Err(err) => warn!("boot: hold watch task not started err={:?}", err),
    }

    let (panel_width, panel_height) = (board.panel_width(), board.panel_height());
    let scene = Scene {
        logo: assets::load_logo(panel_width as u32, panel_height as u32),
        background: assets::load_background(panel_width as u32, panel_height as u32),
    };
    let engine = MatrixEngine::new(
        engine_config,
        FontSet::default(),
        panel_width,
        panel_height,
        scene.background.clone(),
        seeded_rng(),
    );
    let clock = WallClock::from_build_env();
    let mut audio = SilentAudio;

    info!("boot: entering render loop");
    render::run(engine, &mut board, &mut audio, &clock, &scene).await
}
