//! Bundled image assets: zlib-compressed raw RGB888.

use log::{info, warn};
use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;

use crate::image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AssetError {
    Missing,
    Corrupt,
    SizeMismatch { expected: usize, actual: usize },
}

/// Inflates an opaque RGB888 image of the given dimensions.
pub fn decode_rgb_zlib(bytes: &[u8], width: u32, height: u32) -> Result<RgbaImage, AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::Missing);
    }

    let expected = width as usize * height as usize * 3;
    let raw = decompress_to_vec_zlib_with_limit(bytes, expected).map_err(|_| AssetError::Corrupt)?;
    if raw.len() != expected {
        return Err(AssetError::SizeMismatch {
            expected,
            actual: raw.len(),
        });
    }

    let pixels = raw
        .chunks_exact(3)
        .map(|rgb| Rgba::opaque(rgb[0], rgb[1], rgb[2]))
        .collect();
    RgbaImage::from_pixels(width, height, pixels).ok_or(AssetError::SizeMismatch {
        expected,
        actual: raw.len(),
    })
}

/// Decodes an optional asset; absent or unreadable assets yield `None`.
pub fn load_optional(
    name: &str,
    bytes: Option<&[u8]>,
    width: u32,
    height: u32,
) -> Option<RgbaImage> {
    let Some(bytes) = bytes else {
        info!("assets: {} not bundled, skipping", name);
        return None;
    };

    match decode_rgb_zlib(bytes, width, height) {
        Ok(image) => {
            info!("assets: loaded {} size={}x{}", name, width, height);
            Some(image)
        }
        Err(err) => {
            warn!("assets: {} unusable err={:?}", name, err);
            None
        }
    }
}

/// Scales a landscape background and turns it to the panel's mounting orientation.
pub fn prepare_background(image: &RgbaImage, panel_width: u32, panel_height: u32) -> RgbaImage {
    image
        .resized_bilinear(panel_height, panel_width)
        .rotated_cw()
}

pub fn prepare_logo(image: &RgbaImage, panel_width: u32, panel_height: u32) -> RgbaImage {
    if image.width() == panel_width && image.height() == panel_height {
        return image.clone();
    }
    image.resized_bilinear(panel_width, panel_height)
}
