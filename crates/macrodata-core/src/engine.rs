//! Matrix engine: owns the grid and drives frames through the compositor.

use log::{info, warn};
use rand::Rng;

use crate::{
    animation::AnimationLoop,
    audio::{AudioSink, play_click},
    board::Board,
    cell::MatrixGrid,
    clock::TimeOfDay,
    compositor::{FrameCompositor, FrameInput},
    config::EngineConfig,
    focus::FocusController,
    glyph::{FontSet, GlyphRasterizer},
    image::RgbaImage,
    input::ControlEvent,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RenderError {
    NotRunning,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EngineError<E> {
    Render(RenderError),
    Board(E),
}

pub struct MatrixEngine<G, R> {
    config: EngineConfig,
    fonts: FontSet<G>,
    rng: R,
    panel_width: u16,
    panel_height: u16,
    grid: MatrixGrid,
    focus: FocusController,
    animation: AnimationLoop,
    compositor: FrameCompositor,
    restarts: u32,
    display_fault: bool,
}

impl<G, R> MatrixEngine<G, R>
where
    G: GlyphRasterizer,
    R: Rng,
{
    /// Builds the grid and per-run state; the engine starts stopped.
    pub fn new(
        config: EngineConfig,
        fonts: FontSet<G>,
        panel_width: u16,
        panel_height: u16,
        background: Option<RgbaImage>,
        mut rng: R,
    ) -> Self {
        let grid = MatrixGrid::new(config.columns, config.rows, &mut rng);
        let focus = FocusController::new(config.columns, config.rows, &mut rng);
        info!(
            "engine: grid={}x{} panel={}x{} fps={}",
            config.columns, config.rows, panel_width, panel_height, config.fps
        );

        Self {
            config,
            fonts,
            rng,
            panel_width,
            panel_height,
            grid,
            focus,
            animation: AnimationLoop::new(&config),
            compositor: FrameCompositor::new(
                config,
                panel_width as u32,
                panel_height as u32,
                background,
            ),
            restarts: 0,
            display_fault: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &MatrixGrid {
        &self.grid
    }

    pub fn focus(&self) -> &FocusController {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusController {
        &mut self.focus
    }

    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn start(&mut self) {
        self.animation.start();
    }

    pub fn stop(&mut self) {
        self.animation.stop();
    }

    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    pub fn set_collecting(&mut self, collecting: bool) {
        self.animation.set_collecting(collecting, &mut self.rng);
    }

    /// Applies `Collect` directly; `Restart` and `Shutdown` need resources the
    /// caller owns and are handed back.
    pub fn handle<A: AudioSink + ?Sized>(
        &mut self,
        event: ControlEvent,
        audio: &mut A,
    ) -> Option<ControlEvent> {
        match event {
            ControlEvent::Collect => {
                self.set_collecting(true);
                play_click(audio, self.config.click_volume_pct);
                None
            }
            ControlEvent::Restart | ControlEvent::Shutdown => Some(event),
        }
    }

    /// Renders one frame and advances the per-frame bookkeeping.
    pub fn render_frame(&mut self, time: TimeOfDay) -> Result<&[u8], RenderError> {
        if !self.animation.is_running() {
            return Err(RenderError::NotRunning);
        }

        let input = FrameInput {
            collect: self.animation.take_collect(),
            show_clock: self.animation.show_clock(),
            time,
            focus: self.focus.location(),
            destination: self.animation.destination(),
        };
        self.compositor
            .render_frame(&mut self.grid, &self.fonts, &input, &mut self.rng);

        let report = self.animation.finish_frame();
        if report.randomize_focus {
            self.focus.randomize(&mut self.rng);
        }

        Ok(self.compositor.pixels())
    }

    /// Renders and blits one frame. A failing display is logged once until it recovers.
    pub fn present<B: Board>(
        &mut self,
        board: &mut B,
        time: TimeOfDay,
    ) -> Result<(), EngineError<B::Error>> {
        let (width, height) = (self.panel_width, self.panel_height);
        let pixels = self.render_frame(time).map_err(EngineError::Render)?;

        match board.draw_image(0, 0, width, height, pixels) {
            Ok(()) => {
                if self.display_fault {
                    info!("display: flush recovered");
                    self.display_fault = false;
                }
                Ok(())
            }
            Err(err) => {
                if !self.display_fault {
                    warn!("display: flush failed err={:?}", err);
                    self.display_fault = true;
                }
                Err(EngineError::Board(err))
            }
        }
    }

    /// Stops, rebuilds per-run state around the same cells, and starts again.
    pub fn restart(&mut self, background: Option<RgbaImage>) {
        self.stop();
        self.animation = AnimationLoop::new(&self.config);
        self.compositor = FrameCompositor::new(
            self.config,
            self.panel_width as u32,
            self.panel_height as u32,
            background,
        );
        self.display_fault = false;
        self.restarts = self.restarts.saturating_add(1);
        info!("engine: restarted count={}", self.restarts);
        self.start();
    }

    /// Stops rendering, then releases the board. Cleanup failures are only logged.
    pub fn shutdown<B: Board>(&mut self, board: &mut B) {
        self.stop();
        match board.cleanup() {
            Ok(()) => info!("engine: shutdown complete"),
            Err(err) => warn!("engine: cleanup failed err={:?}", err),
        }
    }
}
