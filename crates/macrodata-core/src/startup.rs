//! Boot animation: the logo slides up from below the panel.

use alloc::vec::Vec;

use crate::image::{Rgba, RgbaImage};

pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

pub struct LogoIntro {
    logo: RgbaImage,
    frame: RgbaImage,
    pixels: Vec<u8>,
    steps: u32,
    next: u32,
}

impl LogoIntro {
    /// `logo` is expected at panel size; see [`crate::assets::prepare_logo`].
    pub fn new(logo: RgbaImage, fps: u32, slide_secs: u32) -> Self {
        let frame = RgbaImage::filled(logo.width(), logo.height(), Rgba::BLACK);
        Self {
            logo,
            frame,
            pixels: Vec::new(),
            steps: fps.saturating_mul(slide_secs).max(1),
            next: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// Total frames, both end positions included.
    pub fn frame_count(&self) -> u32 {
        self.steps + 1
    }

    /// Vertical offset of the logo on frame `index`.
    pub fn offset_for(&self, index: u32) -> i32 {
        let height = self.frame.height() as f32;
        let progress = ease_out_cubic(index.min(self.steps) as f32 / self.steps as f32);
        (height + (0.0 - height) * progress) as i32
    }

    /// Renders the next RGB565 frame, or `None` once the logo has settled.
    pub fn next_frame(&mut self) -> Option<&[u8]> {
        if self.next > self.steps {
            return None;
        }

        let y = self.offset_for(self.next);
        self.next += 1;
        self.frame.clear(Rgba::BLACK);
        self.logo.blend_onto(&mut self.frame, 0, y);
        self.frame.write_rgb565_be(&mut self.pixels);
        Some(&self.pixels)
    }
}
