use embassy_time::{Duration, Ticker, Timer};
use log::{info, warn};
use macrodata_core::{
    EngineConfig, MatrixEngine,
    audio::{AudioSink, Sound},
    board::{Board, Rgb8},
    engine::{EngineError, RenderError},
    glyph::MonoRasterizer,
    image::RgbaImage,
    input::ControlEvent,
    startup::LogoIntro,
};
use rand::rngs::SmallRng;

use super::{MacrodataBoard, buttons::CONTROL_EVENTS, clock::WallClock, power};

const STARTUP_VOLUME_PCT: u8 = 100;

pub(super) type Engine = MatrixEngine<MonoRasterizer, SmallRng>;

/// Images reloaded into every run.
pub(super) struct Scene {
    pub(super) logo: Option<RgbaImage>,
    pub(super) background: Option<RgbaImage>,
}

/// Sound, lead-in, logo slide, then the accent LED flash fading out.
async fn startup_sequence<A: AudioSink>(
    board: &mut MacrodataBoard,
    audio: &mut A,
    config: &EngineConfig,
    logo: Option<&RgbaImage>,
) {
    audio.play(Sound::Startup, STARTUP_VOLUME_PCT);
    Timer::after_millis(config.startup_lead_in_ms).await;

    if let Err(err) = board.set_backlight(config.backlight_pct) {
        warn!("startup: backlight failed err={:?}", err);
    }

    if let Some(logo) = logo {
        let mut intro = LogoIntro::new(logo.clone(), config.fps, config.logo_slide_secs);
        let (width, height) = (intro.width() as u16, intro.height() as u16);
        let mut ticker = Ticker::every(Duration::from_micros(config.frame_interval_us()));

        while let Some(frame) = intro.next_frame() {
            if let Err(err) = board.draw_image(0, 0, width, height, frame) {
                warn!("startup: logo frame failed err={:?}", err);
                break;
            }
            ticker.next().await;
        }
        info!("startup: logo shown frames={}", intro.frame_count());
    }

    if let Err(err) = board.set_rgb(config.accent_led) {
        warn!("startup: led failed err={:?}", err);
    }
    if let Err(err) = board.set_rgb_fade(Rgb8::OFF, config.accent_fade_ms) {
        warn!("startup: led fade failed err={:?}", err);
    }
}

/// Runs the screensaver until a shutdown request, then powers down.
pub(super) async fn run<A: AudioSink>(
    mut engine: Engine,
    board: &mut MacrodataBoard,
    audio: &mut A,
    clock: &WallClock,
    scene: &Scene,
) -> ! {
    let config = *engine.config();
    startup_sequence(board, audio, &config, scene.logo.as_ref()).await;
    engine.start();

    let mut ticker = Ticker::every(Duration::from_micros(config.frame_interval_us()));
    loop {
        while let Ok(event) = CONTROL_EVENTS.try_receive() {
            match engine.handle(event, audio) {
                Some(ControlEvent::Restart) => {
                    info!("render: restart requested");
                    engine.restart(scene.background.clone());
                    startup_sequence(board, audio, &config, scene.logo.as_ref()).await;
                    ticker.reset();
                }
                Some(ControlEvent::Shutdown) => {
                    info!("render: shutdown requested");
                    engine.shutdown(board);
                    power::enter_deep_sleep().await;
                }
                Some(ControlEvent::Collect) | None => {}
            }
        }

        match engine.present(board, clock.now()) {
            Ok(()) | Err(EngineError::Board(_)) => {}
            Err(EngineError::Render(RenderError::NotRunning)) => {
                warn!("render: engine stopped unexpectedly, starting");
                engine.start();
            }
        }
        if let Err(err) = board.service() {
            warn!("render: led service failed err={:?}", err);
        }

        ticker.next().await;
    }
}
