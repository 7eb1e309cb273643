//! Builds one panel frame from the grid, the clock overlay and the background.

use alloc::vec::Vec;

use heapless::String;
use log::{debug, info, trace, warn};
use rand::Rng;

use crate::{
    cell::{GridPos, MatrixGrid, TickContext},
    clock::TimeOfDay,
    config::EngineConfig,
    glyph::{FontSet, GlyphCache, GlyphRasterizer},
    image::{Rgba, RgbaImage},
};

/// Per-frame inputs owned by the animation loop and focus controller.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub collect: bool,
    pub show_clock: bool,
    pub time: TimeOfDay,
    pub focus: GridPos,
    pub destination: (i32, i32),
}

pub struct FrameCompositor {
    config: EngineConfig,
    panel_width: u32,
    panel_height: u32,
    canvas: RgbaImage,
    rotated: RgbaImage,
    layer: RgbaImage,
    frame: RgbaImage,
    background: RgbaImage,
    glyphs: GlyphCache,
    clock_key: Option<String<8>>,
    clock_panel: RgbaImage,
    clock_builds: u32,
    skipped_cells: u32,
    degraded: bool,
    pixels: Vec<u8>,
}

impl FrameCompositor {
    /// `background` must already be in panel orientation; anything else is replaced by black.
    pub fn new(
        config: EngineConfig,
        panel_width: u32,
        panel_height: u32,
        background: Option<RgbaImage>,
    ) -> Self {
        // Landscape canvas at twice the logical size; the panel is mounted rotated.
        let canvas_width = panel_height * 2;
        let canvas_height = panel_width * 2;

        let mut compositor = Self {
            config,
            panel_width,
            panel_height,
            canvas: RgbaImage::new(canvas_width, canvas_height),
            rotated: RgbaImage::new(canvas_height, canvas_width),
            layer: RgbaImage::new(panel_width, panel_height),
            frame: RgbaImage::new(panel_width, panel_height),
            background: RgbaImage::new(0, 0),
            glyphs: GlyphCache::new(
                config.cell_width,
                config.cell_height,
                config.glyph_padding,
                config.glyph_color,
            ),
            clock_key: None,
            clock_panel: RgbaImage::new(config.clock_panel_size.0, config.clock_panel_size.1),
            clock_builds: 0,
            skipped_cells: 0,
            degraded: false,
            pixels: Vec::with_capacity(panel_width as usize * panel_height as usize * 2),
        };
        compositor.set_background(background);
        compositor
    }

    pub fn set_background(&mut self, background: Option<RgbaImage>) {
        self.background = match background {
            Some(image)
                if image.width() == self.panel_width && image.height() == self.panel_height =>
            {
                image
            }
            Some(image) => {
                warn!(
                    "render: background size={}x{} does not match panel, using black",
                    image.width(),
                    image.height()
                );
                RgbaImage::filled(self.panel_width, self.panel_height, Rgba::BLACK)
            }
            None => RgbaImage::filled(self.panel_width, self.panel_height, Rgba::BLACK),
        };
    }

    pub fn panel_size(&self) -> (u32, u32) {
        (self.panel_width, self.panel_height)
    }

    pub fn glyphs(&self) -> &GlyphCache {
        &self.glyphs
    }

    /// Last rendered frame.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Times the clock overlay has been rebuilt.
    pub fn clock_builds(&self) -> u32 {
        self.clock_builds
    }

    /// Cells left out of the last frame because their image was unavailable.
    pub fn skipped_cells(&self) -> u32 {
        self.skipped_cells
    }

    /// Set while frames are missing cells; warned about once until it clears.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Ticks every cell and returns the frame as big-endian RGB565.
    pub fn render_frame<G, R>(
        &mut self,
        grid: &mut MatrixGrid,
        fonts: &FontSet<G>,
        input: &FrameInput,
        rng: &mut R,
    ) -> &[u8]
    where
        G: GlyphRasterizer,
        R: Rng + ?Sized,
    {
        self.canvas.clear(Rgba::TRANSPARENT);
        self.draw_grid(grid, &fonts.digit, input, rng);

        if input.show_clock {
            self.refresh_clock(fonts, input.time);
            let (x, y) = self.config.clock_panel_origin;
            self.clock_panel.blend_onto(&mut self.canvas, x, y);
        }

        self.canvas.rotate_cw_into(&mut self.rotated);
        self.rotated.resize_bilinear_into(&mut self.layer);

        self.frame.copy_from(&self.background);
        self.layer.blend_onto(&mut self.frame, 0, 0);
        self.frame.write_rgb565_be(&mut self.pixels);
        &self.pixels
    }

    fn draw_grid<G, R>(&mut self, grid: &mut MatrixGrid, digits: &G, input: &FrameInput, rng: &mut R)
    where
        G: GlyphRasterizer,
        R: Rng + ?Sized,
    {
        let ctx = TickContext {
            focus: input.focus,
            collect: input.collect,
            collect_frame_limit: self.config.collect_frame_limit,
        };

        self.skipped_cells = 0;
        for cell in grid.cells_mut() {
            cell.tick(&ctx, rng);

            let pos = cell.pos();
            let origin = self.config.cell_origin(pos.col, pos.row);
            let (x, y) =
                cell.draw_position(origin, input.destination, self.config.collect_frame_limit);

            match self.glyphs.cell_image(cell.digit(), cell.scale(), digits) {
                Ok(image) => image.blend_onto(&mut self.canvas, x, y),
                Err(err) => {
                    self.skipped_cells += 1;
                    trace!(
                        "render: skipped cell at=({},{}) digit={}",
                        pos.col, pos.row, err.digit
                    );
                }
            }
        }

        match (self.skipped_cells > 0, self.degraded) {
            (true, false) => {
                warn!(
                    "render: glyphs unavailable, skipping cells count={}",
                    self.skipped_cells
                );
                self.degraded = true;
            }
            (false, true) => {
                info!("render: all cells drawable again");
                self.degraded = false;
            }
            _ => {}
        }
    }

    fn refresh_clock<G: GlyphRasterizer>(&mut self, fonts: &FontSet<G>, time: TimeOfDay) {
        let text = time.format_hms();
        if self.clock_key.as_ref() == Some(&text) {
            return;
        }

        let config = &self.config;
        let (width, height) = config.clock_panel_size;
        let accent = config.glyph_color;
        self.clock_panel.clear(Rgba::TRANSPARENT);
        self.clock_panel
            .fill_rect(0, 0, width, height, config.clock_panel_fill);
        self.clock_panel
            .stroke_rect(0, 0, width, height, config.clock_border_width, accent);

        let title = fonts.title.rasterize(config.clock_title, accent);
        title.blend_onto(
            &mut self.clock_panel,
            config.clock_title_origin.0,
            config.clock_title_origin.1,
        );
        let digits = fonts.clock.rasterize(&text, accent);
        digits.blend_onto(
            &mut self.clock_panel,
            config.clock_time_origin.0,
            config.clock_time_origin.1,
        );

        debug!("render: clock overlay rebuilt time={}", text.as_str());
        self.clock_builds = self.clock_builds.saturating_add(1);
        self.clock_key = Some(text);
    }
}
