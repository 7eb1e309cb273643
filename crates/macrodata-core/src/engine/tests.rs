use rand::{SeedableRng, rngs::SmallRng};

use super::*;
use crate::{
    audio::{SilentAudio, Sound},
    board::Rgb8,
    cell::{GridPos, Proximity},
    glyph::MonoRasterizer,
    image::Rgba,
};

const PANEL_W: u16 = 240;
const PANEL_H: u16 = 280;

struct Blank;

impl GlyphRasterizer for Blank {
    fn rasterize(&self, _text: &str, _color: Rgba) -> RgbaImage {
        RgbaImage::new(0, 0)
    }
}

fn blank_fonts() -> FontSet<Blank> {
    FontSet {
        digit: Blank,
        title: Blank,
        clock: Blank,
    }
}

fn engine(seed: u64) -> MatrixEngine<Blank, SmallRng> {
    MatrixEngine::new(
        EngineConfig::default(),
        blank_fonts(),
        PANEL_W,
        PANEL_H,
        None,
        SmallRng::seed_from_u64(seed),
    )
}

fn run(engine: &mut MatrixEngine<Blank, SmallRng>, frames: u32) {
    for _ in 0..frames {
        engine
            .render_frame(TimeOfDay::default())
            .expect("engine is running");
    }
}

#[derive(Default)]
struct RecordingBoard {
    frames: u32,
    last_window: Option<(u16, u16, u16, u16)>,
    last_len: usize,
    fail_draw: bool,
    fail_cleanup: bool,
    cleanups: u32,
}

impl Board for RecordingBoard {
    type Error = &'static str;

    fn panel_width(&self) -> u16 {
        PANEL_W
    }

    fn panel_height(&self) -> u16 {
        PANEL_H
    }

    fn draw_image(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u8],
    ) -> Result<(), Self::Error> {
        if self.fail_draw {
            return Err("spi");
        }
        self.frames += 1;
        self.last_window = Some((x, y, width, height));
        self.last_len = pixels.len();
        Ok(())
    }

    fn set_backlight(&mut self, _percent: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_rgb(&mut self, _color: Rgb8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_rgb_fade(&mut self, _color: Rgb8, _duration_ms: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn is_button_pressed(&mut self) -> bool {
        false
    }

    fn cleanup(&mut self) -> Result<(), Self::Error> {
        self.cleanups += 1;
        if self.fail_cleanup {
            Err("cleanup")
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct CountingAudio {
    busy: bool,
    clicks: u32,
}

impl AudioSink for CountingAudio {
    fn play(&mut self, sound: Sound, _volume_pct: u8) {
        if sound == Sound::Click {
            self.clicks += 1;
        }
    }

    fn is_busy(&self) -> bool {
        self.busy
    }
}

#[test]
fn stopped_engine_does_not_render() {
    let mut engine = engine(1);

    assert_eq!(
        engine.render_frame(TimeOfDay::default()).err(),
        Some(RenderError::NotRunning)
    );
    assert_eq!(engine.animation().frame(), 0);
}

#[test]
fn proximity_drives_scale_end_to_end() {
    let mut engine = engine(2);
    engine.focus_mut().set_location(GridPos::new(3, 3));
    engine.start();

    run(&mut engine, 20);

    let near = engine.grid().cell(GridPos::new(3, 4)).unwrap();
    let far = engine.grid().cell(GridPos::new(0, 0)).unwrap();
    assert_eq!(near.scale(), Proximity::Focused.target_scale());
    assert_eq!(far.scale(), Proximity::Far.target_scale());
}

#[test]
fn collect_runs_one_flight_per_trigger() {
    let mut engine = engine(3);
    engine.focus_mut().set_location(GridPos::new(3, 3));
    engine.start();
    let target = GridPos::new(3, 4);

    engine.set_collecting(true);
    run(&mut engine, 1);
    assert!(engine.grid().cell(target).unwrap().is_collecting());

    let mut in_flight = 0;
    for _ in 0..10 {
        run(&mut engine, 1);
        let cell = engine.grid().cell(target).unwrap();
        assert!(cell.is_collecting());
        assert!(cell.flight_progress(10).is_some());
        in_flight += 1;
    }
    assert_eq!(in_flight, 10);

    run(&mut engine, 1);
    let cell = engine.grid().cell(target).unwrap();
    assert!(!cell.is_collecting());
    assert!((cell.scale() - 0.28).abs() < 1e-6);

    // Well inside the two second focus period, so the focus cannot move.
    for _ in 0..30 {
        run(&mut engine, 1);
        assert!(engine.grid().cells().iter().all(|cell| !cell.is_collecting()));
    }
}

#[test]
fn far_cells_are_never_collected() {
    let mut engine = engine(4);
    engine.focus_mut().set_location(GridPos::new(3, 3));
    engine.start();

    engine.set_collecting(true);
    run(&mut engine, 1);

    for cell in engine.grid().cells() {
        let focused =
            Proximity::classify(cell.pos().distance_sq(GridPos::new(3, 3))) == Proximity::Focused;
        assert_eq!(cell.is_collecting(), focused);
    }
}

#[test]
fn focus_randomizes_once_per_period() {
    let mut engine = engine(5);
    engine.start();

    run(&mut engine, 150);

    assert_eq!(engine.focus().randomizations(), 2);
    assert_eq!(engine.animation().frame(), 150);
}

#[test]
fn collect_event_clicks_unless_audio_busy() {
    let mut engine = engine(6);
    let mut audio = CountingAudio::default();

    assert_eq!(engine.handle(ControlEvent::Collect, &mut audio), None);
    assert_eq!(audio.clicks, 1);

    audio.busy = true;
    assert_eq!(engine.handle(ControlEvent::Collect, &mut audio), None);
    assert_eq!(audio.clicks, 1);

    assert_eq!(
        engine.handle(ControlEvent::Restart, &mut SilentAudio),
        Some(ControlEvent::Restart)
    );
    assert_eq!(
        engine.handle(ControlEvent::Shutdown, &mut SilentAudio),
        Some(ControlEvent::Shutdown)
    );
}

#[test]
fn restart_keeps_cells_and_resets_run_state() {
    let mut engine = engine(7);
    engine.start();
    run(&mut engine, 40);
    let digits: Vec<u8> = engine.grid().cells().iter().map(|cell| cell.digit()).collect();

    engine.restart(None);

    assert!(engine.is_running());
    assert_eq!(engine.restarts(), 1);
    assert_eq!(engine.animation().frame(), 0);
    assert_eq!(engine.compositor().glyphs().rasterized(), 0);
    let after: Vec<u8> = engine.grid().cells().iter().map(|cell| cell.digit()).collect();
    assert_eq!(digits, after);
}

#[test]
fn present_blits_full_panel_frames() {
    let mut engine = engine(8);
    let mut board = RecordingBoard::default();

    assert_eq!(
        engine.present(&mut board, TimeOfDay::default()),
        Err(EngineError::Render(RenderError::NotRunning))
    );

    engine.start();
    engine.present(&mut board, TimeOfDay::default()).unwrap();

    assert_eq!(board.frames, 1);
    assert_eq!(board.last_window, Some((0, 0, PANEL_W, PANEL_H)));
    assert_eq!(board.last_len, PANEL_W as usize * PANEL_H as usize * 2);
}

#[test]
fn display_errors_surface_but_keep_the_loop_alive() {
    let mut engine = engine(9);
    let mut board = RecordingBoard {
        fail_draw: true,
        ..Default::default()
    };
    engine.start();

    for _ in 0..3 {
        assert_eq!(
            engine.present(&mut board, TimeOfDay::default()),
            Err(EngineError::Board("spi"))
        );
    }
    assert_eq!(engine.animation().frame(), 3);

    board.fail_draw = false;
    assert_eq!(engine.present(&mut board, TimeOfDay::default()), Ok(()));
}

#[test]
fn shutdown_stops_and_cleans_up_even_on_failure() {
    let mut engine = engine(10);
    let mut board = RecordingBoard {
        fail_cleanup: true,
        ..Default::default()
    };
    engine.start();

    engine.shutdown(&mut board);

    assert!(!engine.is_running());
    assert_eq!(board.cleanups, 1);
}

#[test]
fn mono_fonts_render_visible_digits() {
    let mut engine = MatrixEngine::new(
        EngineConfig::default(),
        FontSet::<MonoRasterizer>::default(),
        PANEL_W,
        PANEL_H,
        None,
        SmallRng::seed_from_u64(11),
    );
    engine.start();

    let pixels = engine.render_frame(TimeOfDay::default()).unwrap();
    assert!(pixels.iter().any(|byte| *byte != 0));
    assert!(engine.compositor().glyphs().rasterized() <= 10);
}
