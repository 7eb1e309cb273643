//! Engine tunables.

use crate::{board::Rgb8, image::Rgba};

/// Horizontal landing spots for a collect flight, in canvas pixels.
pub const COLLECT_DESTINATIONS_X: [i32; 5] = [50, 150, 260, 370, 480];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub fps: u32,
    /// Cells per grid row.
    pub columns: u8,
    /// Grid rows.
    pub rows: u8,
    pub cell_width: u32,
    pub cell_height: u32,
    pub cell_spacing: u32,
    /// Top-left of cell (0, 0) on the oversized canvas.
    pub grid_origin: (i32, i32),
    pub glyph_color: Rgba,
    /// Transparent rows appended below each base glyph.
    pub glyph_padding: u32,
    pub collect_frame_limit: u8,
    pub collect_destinations_x: [i32; 5],
    pub collect_destination_y: i32,
    /// Frames the clock stays hidden after a collect gesture.
    pub idle_countdown_frames: u32,
    pub clock_panel_size: (u32, u32),
    pub clock_panel_origin: (i32, i32),
    pub clock_panel_fill: Rgba,
    pub clock_border_width: u32,
    pub clock_title: &'static str,
    pub clock_title_origin: (i32, i32),
    pub clock_time_origin: (i32, i32),
    pub focus_period_secs: u32,
    pub restart_hold_ms: u64,
    pub hold_poll_ms: u64,
    pub logo_slide_secs: u32,
    pub startup_lead_in_ms: u64,
    pub backlight_pct: u8,
    pub accent_led: Rgb8,
    pub accent_fade_ms: u32,
    pub click_volume_pct: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            columns: 12,
            rows: 6,
            cell_width: 40,
            cell_height: 40,
            cell_spacing: 4,
            grid_origin: (24, 106),
            glyph_color: Rgba::opaque(170, 250, 255),
            glyph_padding: 10,
            collect_frame_limit: 10,
            collect_destinations_x: COLLECT_DESTINATIONS_X,
            collect_destination_y: 380,
            idle_countdown_frames: 100,
            clock_panel_size: (370, 150),
            clock_panel_origin: (100, 170),
            clock_panel_fill: Rgba::new(0, 0, 0, 200),
            clock_border_width: 2,
            clock_title: "History lives in us.",
            clock_title_origin: (40, 10),
            clock_time_origin: (60, 50),
            focus_period_secs: 2,
            restart_hold_ms: 5_000,
            hold_poll_ms: 100,
            logo_slide_secs: 2,
            startup_lead_in_ms: 1_500,
            backlight_pct: 100,
            accent_led: Rgb8::new(170, 250, 255),
            accent_fade_ms: 1_000,
            click_volume_pct: 10,
        }
    }
}

impl EngineConfig {
    pub const fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub const fn with_grid(mut self, columns: u8, rows: u8) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    pub const fn with_collect_frame_limit(mut self, collect_frame_limit: u8) -> Self {
        self.collect_frame_limit = collect_frame_limit;
        self
    }

    pub const fn with_idle_countdown_frames(mut self, idle_countdown_frames: u32) -> Self {
        self.idle_countdown_frames = idle_countdown_frames;
        self
    }

    pub const fn with_restart_hold_ms(mut self, restart_hold_ms: u64) -> Self {
        self.restart_hold_ms = restart_hold_ms;
        self
    }

    /// Frames between focus re-randomizations (never zero).
    pub const fn focus_period_frames(&self) -> u32 {
        let frames = self.fps.saturating_mul(self.focus_period_secs);
        if frames == 0 { 1 } else { frames }
    }

    pub const fn frame_interval_us(&self) -> u64 {
        let fps = if self.fps == 0 { 1 } else { self.fps };
        1_000_000 / fps as u64
    }

    /// Canvas position of a cell's slot, before jitter and flight.
    pub const fn cell_origin(&self, col: u8, row: u8) -> (i32, i32) {
        (
            self.grid_origin.0 + col as i32 * (self.cell_width + self.cell_spacing) as i32,
            self.grid_origin.1 + row as i32 * (self.cell_height + self.cell_spacing) as i32,
        )
    }
}
