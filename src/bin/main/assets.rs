use macrodata_core::{assets, image::RgbaImage};

const LOGO_SIZE: (u32, u32) = (240, 280);
const BACKGROUND_SIZE: (u32, u32) = (280, 240);

#[cfg(has_logo_asset)]
const LOGO: Option<&[u8]> = Some(include_bytes!("../../../assets/logo.rgb.zlib"));
#[cfg(not(has_logo_asset))]
const LOGO: Option<&[u8]> = None;

#[cfg(has_background_asset)]
const BACKGROUND: Option<&[u8]> = Some(include_bytes!("../../../assets/background.rgb.zlib"));
#[cfg(not(has_background_asset))]
const BACKGROUND: Option<&[u8]> = None;

/// Logo scaled to the panel, if one was bundled and decodes.
pub(super) fn load_logo(panel_width: u32, panel_height: u32) -> Option<RgbaImage> {
    assets::load_optional("logo", LOGO, LOGO_SIZE.0, LOGO_SIZE.1)
        .map(|logo| assets::prepare_logo(&logo, panel_width, panel_height))
}

/// Landscape background turned to panel orientation.
pub(super) fn load_background(panel_width: u32, panel_height: u32) -> Option<RgbaImage> {
    assets::load_optional("background", BACKGROUND, BACKGROUND_SIZE.0, BACKGROUND_SIZE.1)
        .map(|image| assets::prepare_background(&image, panel_width, panel_height))
}
