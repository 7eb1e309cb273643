//! Glyph rasterisation and the per-digit image cache.

use alloc::collections::{BTreeMap, btree_map::Entry};

use embedded_graphics::{
    Drawable,
    geometry::Point,
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::Rgb888,
    text::{Baseline, Text},
};
use log::trace;

use crate::image::{Rgba, RgbaImage};

/// Opaque text-rendering primitive.
pub trait GlyphRasterizer {
    /// Renders `text` on a transparent image sized to the text.
    fn rasterize(&self, text: &str, color: Rgba) -> RgbaImage;
}

/// Renders an embedded-graphics mono font, optionally resampled to a pixel height.
#[derive(Clone, Copy)]
pub struct MonoRasterizer {
    font: &'static MonoFont<'static>,
    pixel_height: Option<u32>,
}

impl MonoRasterizer {
    pub const fn new(font: &'static MonoFont<'static>) -> Self {
        Self {
            font,
            pixel_height: None,
        }
    }

    pub const fn with_pixel_height(mut self, pixel_height: u32) -> Self {
        self.pixel_height = Some(pixel_height);
        self
    }
}

impl GlyphRasterizer for MonoRasterizer {
    fn rasterize(&self, text: &str, color: Rgba) -> RgbaImage {
        let chars = text.chars().count() as u32;
        let char_size = self.font.character_size;
        let width = chars * char_size.width + chars.saturating_sub(1) * self.font.character_spacing;
        let height = char_size.height;
        if width == 0 || height == 0 {
            return RgbaImage::new(0, 0);
        }

        let mut image = RgbaImage::new(width, height);
        let style = MonoTextStyle::new(self.font, Rgb888::new(color.r, color.g, color.b));
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut image);

        if color.a != 255 {
            let pixels: alloc::vec::Vec<Rgba> = image
                .pixels()
                .iter()
                .map(|p| if p.a == 0 { *p } else { Rgba { a: color.a, ..*p } })
                .collect();
            if let Some(tinted) = RgbaImage::from_pixels(width, height, pixels) {
                image = tinted;
            }
        }

        match self.pixel_height {
            Some(target) if target != height && target > 0 => {
                let target_width = (width * target / height).max(1);
                image.resized_bilinear(target_width, target)
            }
            _ => image,
        }
    }
}

/// Rasterizers for the three text roles on screen.
#[derive(Clone, Copy)]
pub struct FontSet<G> {
    pub digit: G,
    pub title: G,
    pub clock: G,
}

impl FontSet<MonoRasterizer> {
    /// 10x20 mono font resampled to the digit, title and clock heights.
    pub const fn mono(digit_px: u32, title_px: u32, clock_px: u32) -> Self {
        let base = MonoRasterizer::new(&FONT_10X20);
        Self {
            digit: base.with_pixel_height(digit_px),
            title: base.with_pixel_height(title_px),
            clock: base.with_pixel_height(clock_px),
        }
    }
}

impl Default for FontSet<MonoRasterizer> {
    fn default() -> Self {
        Self::mono(24, 32, 60)
    }
}

/// Rounds a render scale to its integer-percent cache bucket.
pub fn scale_bucket(scale: f32) -> u16 {
    (scale.max(0.0) * 100.0 + 0.5) as u16
}

/// Cache key of one fully composed cell image.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CellKey {
    pub digit: u8,
    pub scale_pct: u16,
}

impl CellKey {
    pub fn new(digit: u8, scale: f32) -> Self {
        Self {
            digit,
            scale_pct: scale_bucket(scale),
        }
    }
}

/// A digit with no drawable pixels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GlyphUnavailable {
    pub digit: u8,
}

/// Append-only memo of digit glyphs and scaled cell images.
///
/// Keys are finite (10 digits x a few dozen scale buckets), so nothing is evicted.
pub struct GlyphCache {
    base: BTreeMap<u8, RgbaImage>,
    cells: BTreeMap<CellKey, RgbaImage>,
    cell_width: u32,
    cell_height: u32,
    padding: u32,
    color: Rgba,
    rasterized: u32,
}

impl GlyphCache {
    pub fn new(cell_width: u32, cell_height: u32, padding: u32, color: Rgba) -> Self {
        Self {
            base: BTreeMap::new(),
            cells: BTreeMap::new(),
            cell_width,
            cell_height,
            padding,
            color,
            rasterized: 0,
        }
    }

    /// Number of times the rasterizer has been invoked.
    pub fn rasterized(&self) -> u32 {
        self.rasterized
    }

    pub fn cached_cells(&self) -> usize {
        self.cells.len()
    }

    /// Unscaled glyph for `digit`, with transparent padding below it.
    pub fn base_glyph<G: GlyphRasterizer>(&mut self, digit: u8, raster: &G) -> &RgbaImage {
        Self::base_entry(
            &mut self.base,
            &mut self.rasterized,
            digit,
            self.padding,
            self.color,
            raster,
        )
    }

    fn base_entry<'a, G: GlyphRasterizer>(
        base: &'a mut BTreeMap<u8, RgbaImage>,
        rasterized: &mut u32,
        digit: u8,
        padding: u32,
        color: Rgba,
        raster: &G,
    ) -> &'a RgbaImage {
        base.entry(digit).or_insert_with(|| {
            *rasterized = rasterized.saturating_add(1);
            let mut text = [0u8; 4];
            let glyph = raster.rasterize(char::from(b'0' + digit % 10).encode_utf8(&mut text), color);
            let mut padded = RgbaImage::new(glyph.width(), glyph.height() + padding);
            glyph.blend_onto(&mut padded, 0, 0);
            trace!("glyph: rasterized digit={} size={}x{}", digit, glyph.width(), glyph.height());
            padded
        })
    }

    /// Cell-sized image of `digit` drawn at `scale` and centred.
    pub fn cell_image<G: GlyphRasterizer>(
        &mut self,
        digit: u8,
        scale: f32,
        raster: &G,
    ) -> Result<&RgbaImage, GlyphUnavailable> {
        let key = CellKey::new(digit, scale);
        match self.cells.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let base = Self::base_entry(
                    &mut self.base,
                    &mut self.rasterized,
                    digit,
                    self.padding,
                    self.color,
                    raster,
                );
                if base.is_empty() {
                    return Err(GlyphUnavailable { digit });
                }

                let scaled_width = base.width() * key.scale_pct as u32 / 100;
                let scaled_height = base.height() * key.scale_pct as u32 / 100;
                let mut cell = RgbaImage::new(self.cell_width, self.cell_height);
                if scaled_width > 0 && scaled_height > 0 {
                    let scaled = base.resized_bilinear(scaled_width, scaled_height);
                    let x = (self.cell_width as i32 - scaled_width as i32).div_euclid(2);
                    let y = (self.cell_height as i32 - scaled_height as i32).div_euclid(2);
                    scaled.blend_onto(&mut cell, x, y);
                }

                Ok(entry.insert(cell))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYAN: Rgba = Rgba::opaque(170, 250, 255);

    struct BlankRasterizer;

    impl GlyphRasterizer for BlankRasterizer {
        fn rasterize(&self, _text: &str, _color: Rgba) -> RgbaImage {
            RgbaImage::new(0, 0)
        }
    }

    #[test]
    fn mono_rasterizer_sizes_to_text() {
        let raster = MonoRasterizer::new(&FONT_10X20);
        let image = raster.rasterize("12:34", CYAN);

        assert_eq!((image.width(), image.height()), (50, 20));
        assert!(image.pixels().iter().any(|p| *p == CYAN));
    }

    #[test]
    fn mono_rasterizer_resamples_to_pixel_height() {
        let raster = MonoRasterizer::new(&FONT_10X20).with_pixel_height(60);
        let image = raster.rasterize("7", CYAN);

        assert_eq!((image.width(), image.height()), (30, 60));
    }

    #[test]
    fn scale_buckets_absorb_float_drift() {
        let mut scale = 0.7f32;
        for _ in 0..16 {
            scale += 0.05;
        }
        scale -= 0.05 * 16.0;

        assert_eq!(scale_bucket(scale), 70);
        assert_eq!(scale_bucket(0.2), 20);
        assert_eq!(scale_bucket(1.5), 150);
    }

    #[test]
    fn repeated_requests_reuse_cached_images() {
        let raster = MonoRasterizer::new(&FONT_10X20);
        let mut cache = GlyphCache::new(40, 40, 10, CYAN);

        let first = cache.cell_image(3, 0.9, &raster).unwrap().clone();
        let second = cache.cell_image(3, 0.9000001, &raster).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(cache.rasterized(), 1);
        assert_eq!(cache.cached_cells(), 1);
    }

    #[test]
    fn new_scale_reuses_base_glyph() {
        let raster = MonoRasterizer::new(&FONT_10X20);
        let mut cache = GlyphCache::new(40, 40, 10, CYAN);

        let _ = cache.cell_image(5, 0.7, &raster).unwrap();
        let _ = cache.cell_image(5, 1.5, &raster).unwrap();
        let _ = cache.cell_image(6, 1.5, &raster).unwrap();

        assert_eq!(cache.rasterized(), 2);
        assert_eq!(cache.cached_cells(), 3);
    }

    #[test]
    fn cell_image_is_cell_sized_and_padded_base_is_taller() {
        let raster = MonoRasterizer::new(&FONT_10X20);
        let mut cache = GlyphCache::new(40, 40, 10, CYAN);

        let base = cache.base_glyph(8, &raster);
        assert_eq!((base.width(), base.height()), (10, 30));

        let cell = cache.cell_image(8, 1.5, &raster).unwrap();
        assert_eq!((cell.width(), cell.height()), (40, 40));
        assert!(cell.pixels().iter().any(|p| p.a > 0));
    }

    #[test]
    fn empty_glyph_is_reported() {
        let mut cache = GlyphCache::new(40, 40, 10, CYAN);

        assert_eq!(
            cache.cell_image(4, 1.0, &BlankRasterizer).err(),
            Some(GlyphUnavailable { digit: 4 })
        );
    }
}
