//! RGBA raster images and the compositing operations a frame is built from.

use alloc::{vec, vec::Vec};
use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Rgb888, RgbColor},
};

/// Straight (non-premultiplied) 8-bit RGBA colour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Packs the colour as RGB565, ignoring alpha.
    pub const fn to_rgb565(self) -> u16 {
        ((self.r as u16 >> 3) << 11) | ((self.g as u16 >> 2) << 5) | (self.b as u16 >> 3)
    }
}

#[inline]
fn mix(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

/// Row-major RGBA image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl RgbaImage {
    /// Creates a fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Wraps existing pixels; returns `None` when the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }

        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.pixels[self.index(x, y)])
    }

    /// Overwrites one pixel. Returns `false` when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }

        let index = self.index(x, y);
        self.pixels[index] = color;
        true
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn reshape(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }

        self.width = width;
        self.height = height;
        self.pixels
            .resize(width as usize * height as usize, Rgba::TRANSPARENT);
    }

    /// Fills a clipped rectangle, replacing the pixels underneath.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x.saturating_add(w as i32)).clamp(0, self.width as i32) as u32;
        let y1 = (y.saturating_add(h as i32)).clamp(0, self.height as i32) as u32;

        for py in y0..y1 {
            let start = self.index(x0, py);
            let end = start + x1.saturating_sub(x0) as usize;
            if start < end {
                self.pixels[start..end].fill(color);
            }
        }
    }

    /// Draws a rectangle outline `stroke` pixels thick, inside the given bounds.
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: u32, h: u32, stroke: u32, color: Rgba) {
        if w == 0 || h == 0 || stroke == 0 {
            return;
        }

        let stroke_w = stroke.min(w);
        let stroke_h = stroke.min(h);
        self.fill_rect(x, y, w, stroke_h, color);
        self.fill_rect(x, y + (h - stroke_h) as i32, w, stroke_h, color);
        self.fill_rect(x, y, stroke_w, h, color);
        self.fill_rect(x + (w - stroke_w) as i32, y, stroke_w, h, color);
    }

    /// Alpha-composites `self` onto `dst` with its top-left corner at `(x, y)`.
    ///
    /// The source alpha is the mask for all four channels, so compositing onto a
    /// transparent canvas keeps the glyph's own coverage.
    pub fn blend_onto(&self, dst: &mut RgbaImage, x: i32, y: i32) {
        let src_x0 = (-x).max(0) as u32;
        let src_y0 = (-y).max(0) as u32;
        let src_x1 = (dst.width as i32 - x).clamp(0, self.width as i32) as u32;
        let src_y1 = (dst.height as i32 - y).clamp(0, self.height as i32) as u32;

        for sy in src_y0..src_y1 {
            let dy = (sy as i32 + y) as u32;
            for sx in src_x0..src_x1 {
                let src = self.pixels[self.index(sx, sy)];
                if src.a == 0 {
                    continue;
                }

                let dx = (sx as i32 + x) as u32;
                let index = dst.index(dx, dy);
                if src.a == 255 {
                    dst.pixels[index] = src;
                    continue;
                }

                let under = dst.pixels[index];
                dst.pixels[index] = Rgba::new(
                    mix(src.r, under.r, src.a),
                    mix(src.g, under.g, src.a),
                    mix(src.b, under.b, src.a),
                    mix(src.a, under.a, src.a),
                );
            }
        }
    }

    /// Rotates 90 degrees clockwise into `dst`, resizing it to `height x width`.
    pub fn rotate_cw_into(&self, dst: &mut RgbaImage) {
        dst.reshape(self.height, self.width);

        for dy in 0..dst.height {
            let sx = dy;
            for dx in 0..dst.width {
                let sy = self.height - 1 - dx;
                let index = dst.index(dx, dy);
                dst.pixels[index] = self.pixels[self.index(sx, sy)];
            }
        }
    }

    pub fn rotated_cw(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.height, self.width);
        self.rotate_cw_into(&mut out);
        out
    }

    /// Bilinear resample into `dst`, keeping `dst`'s dimensions.
    ///
    /// Colour channels are weighted by alpha so transparent texels do not bleed
    /// dark fringes into glyph edges.
    pub fn resize_bilinear_into(&self, dst: &mut RgbaImage) {
        if dst.is_empty() {
            return;
        }
        if self.is_empty() {
            dst.clear(Rgba::TRANSPARENT);
            return;
        }

        let scale_x = self.width as f32 / dst.width as f32;
        let scale_y = self.height as f32 / dst.height as f32;
        let max_x = self.width - 1;
        let max_y = self.height - 1;

        for dy in 0..dst.height {
            let fy = ((dy as f32 + 0.5) * scale_y - 0.5).max(0.0);
            let y0 = (fy as u32).min(max_y);
            let y1 = (y0 + 1).min(max_y);
            let wy = fy - y0 as f32;

            for dx in 0..dst.width {
                let fx = ((dx as f32 + 0.5) * scale_x - 0.5).max(0.0);
                let x0 = (fx as u32).min(max_x);
                let x1 = (x0 + 1).min(max_x);
                let wx = fx - x0 as f32;

                let taps = [
                    (self.pixels[self.index(x0, y0)], (1.0 - wx) * (1.0 - wy)),
                    (self.pixels[self.index(x1, y0)], wx * (1.0 - wy)),
                    (self.pixels[self.index(x0, y1)], (1.0 - wx) * wy),
                    (self.pixels[self.index(x1, y1)], wx * wy),
                ];

                let mut alpha = 0.0f32;
                let mut r = 0.0f32;
                let mut g = 0.0f32;
                let mut b = 0.0f32;
                for (texel, weight) in taps {
                    let coverage = texel.a as f32 * weight;
                    alpha += coverage;
                    r += texel.r as f32 * coverage;
                    g += texel.g as f32 * coverage;
                    b += texel.b as f32 * coverage;
                }

                let index = dst.index(dx, dy);
                dst.pixels[index] = if alpha <= 0.0 {
                    Rgba::TRANSPARENT
                } else {
                    Rgba::new(
                        (r / alpha + 0.5).min(255.0) as u8,
                        (g / alpha + 0.5).min(255.0) as u8,
                        (b / alpha + 0.5).min(255.0) as u8,
                        (alpha + 0.5).min(255.0) as u8,
                    )
                };
            }
        }
    }

    pub fn resized_bilinear(&self, width: u32, height: u32) -> RgbaImage {
        let mut out = RgbaImage::new(width, height);
        self.resize_bilinear_into(&mut out);
        out
    }

    /// Copies another image of identical size over this one.
    ///
    /// Returns `false` (and leaves `self` untouched) on a size mismatch.
    pub fn copy_from(&mut self, src: &RgbaImage) -> bool {
        if self.width != src.width || self.height != src.height {
            return false;
        }

        self.pixels.copy_from_slice(&src.pixels);
        true
    }

    /// Encodes the image as big-endian RGB565, two bytes per pixel.
    pub fn write_rgb565_be(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 2);
        for pixel in &self.pixels {
            out.extend_from_slice(&pixel.to_rgb565().to_be_bytes());
        }
    }
}

impl DrawTarget for RgbaImage {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }

            let _ = self.set_pixel(
                point.x as u32,
                point.y as u32,
                Rgba::opaque(color.r(), color.g(), color.b()),
            );
        }

        Ok(())
    }
}

impl OriginDimensions for RgbaImage {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
