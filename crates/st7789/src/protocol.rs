//! Command set and addressing helpers for the ST7789 controller.

pub const SWRESET: u8 = 0x01;
pub const SLPIN: u8 = 0x10;
pub const SLPOUT: u8 = 0x11;
pub const NORON: u8 = 0x13;
pub const INVON: u8 = 0x21;
pub const DISPOFF: u8 = 0x28;
pub const DISPON: u8 = 0x29;
pub const CASET: u8 = 0x2A;
pub const RASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;
pub const MADCTL: u8 = 0x36;
pub const COLMOD: u8 = 0x3A;

/// 16 bits per pixel on both the RGB and MCU interfaces.
pub const COLMOD_RGB565: u8 = 0x55;

pub const SWRESET_DELAY_MS: u32 = 150;
pub const SLPOUT_DELAY_MS: u32 = 120;
pub const SLPIN_DELAY_MS: u32 = 5;

const MADCTL_MY: u8 = 0x80;
const MADCTL_MX: u8 = 0x40;
const MADCTL_MV: u8 = 0x20;

/// Memory scan direction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
}

impl Orientation {
    pub const fn madctl(self) -> u8 {
        match self {
            Self::Portrait => 0x00,
            Self::Landscape => MADCTL_MX | MADCTL_MV,
            Self::PortraitFlipped => MADCTL_MX | MADCTL_MY,
            Self::LandscapeFlipped => MADCTL_MY | MADCTL_MV,
        }
    }

    pub const fn is_landscape(self) -> bool {
        matches!(self, Self::Landscape | Self::LandscapeFlipped)
    }
}

/// Visible area of a panel inside the controller's 240x320 RAM.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PanelGeometry {
    pub width: u16,
    pub height: u16,
    pub col_offset: u16,
    pub row_offset: u16,
}

impl PanelGeometry {
    /// 1.69" 240x280 module, centred vertically in controller RAM.
    pub const PANEL_240X280: Self = Self {
        width: 240,
        height: 280,
        col_offset: 0,
        row_offset: 20,
    };

    /// Geometry as seen after applying `orientation`.
    pub const fn oriented(self, orientation: Orientation) -> Self {
        if orientation.is_landscape() {
            Self {
                width: self.height,
                height: self.width,
                col_offset: self.row_offset,
                row_offset: self.col_offset,
            }
        } else {
            self
        }
    }

    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the window starting at `(x, y)` of size `w x h` is on the panel.
    pub const fn contains(self, x: u16, y: u16, w: u16, h: u16) -> bool {
        w > 0
            && h > 0
            && x as u32 + w as u32 <= self.width as u32
            && y as u32 + h as u32 <= self.height as u32
    }
}

/// CASET and RASET payloads for an inclusive window, offsets applied.
pub const fn window_params(
    geometry: PanelGeometry,
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
) -> ([u8; 4], [u8; 4]) {
    let x0 = x0 + geometry.col_offset;
    let x1 = x1 + geometry.col_offset;
    let y0 = y0 + geometry.row_offset;
    let y1 = y1 + geometry.row_offset;

    (
        [(x0 >> 8) as u8, x0 as u8, (x1 >> 8) as u8, x1 as u8],
        [(y0 >> 8) as u8, y0 as u8, (y1 >> 8) as u8, y1 as u8],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_applies_row_offset() {
        let (caset, raset) = window_params(PanelGeometry::PANEL_240X280, 0, 0, 239, 279);

        assert_eq!(caset, [0x00, 0x00, 0x00, 0xEF]);
        assert_eq!(raset, [0x00, 0x14, 0x01, 0x2B]);
    }

    #[test]
    fn landscape_swaps_axes_and_offsets() {
        let geometry = PanelGeometry::PANEL_240X280.oriented(Orientation::Landscape);

        assert_eq!((geometry.width, geometry.height), (280, 240));
        let (caset, raset) = window_params(geometry, 0, 0, 279, 239);
        assert_eq!(caset, [0x00, 0x14, 0x01, 0x2B]);
        assert_eq!(raset, [0x00, 0x00, 0x00, 0xEF]);
    }

    #[test]
    fn madctl_bits_match_datasheet() {
        assert_eq!(Orientation::Portrait.madctl(), 0x00);
        assert_eq!(Orientation::Landscape.madctl(), 0x60);
        assert_eq!(Orientation::PortraitFlipped.madctl(), 0xC0);
        assert_eq!(Orientation::LandscapeFlipped.madctl(), 0xA0);
    }

    #[test]
    fn bounds_check_rejects_overflowing_windows() {
        let geometry = PanelGeometry::PANEL_240X280;

        assert!(geometry.contains(0, 0, 240, 280));
        assert!(geometry.contains(239, 279, 1, 1));
        assert!(!geometry.contains(1, 0, 240, 1));
        assert!(!geometry.contains(0, 0, 0, 1));
        assert!(!geometry.contains(u16::MAX, 0, 2, 1));
    }
}
