#![cfg_attr(not(test), no_std)]

//! ST7789 (240x280 IPS, RGB565) SPI driver primitives.

pub mod protocol;

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

use protocol::{Orientation, PanelGeometry};

const FILL_CHUNK_PIXELS: usize = 128;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Expected SPI clock in Hz (documented for board glue).
    pub spi_hz: u32,
    pub geometry: PanelGeometry,
    pub orientation: Orientation,
    /// IPS modules need colour inversion enabled to show true colours.
    pub invert_colors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi_hz: 40_000_000,
            geometry: PanelGeometry::PANEL_240X280,
            orientation: Orientation::Portrait,
            invert_colors: true,
        }
    }
}

impl Config {
    pub const fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub const fn with_invert_colors(mut self, invert_colors: bool) -> Self {
        self.invert_colors = invert_colors;
        self
    }

    pub const fn with_spi_hz(mut self, spi_hz: u32) -> Self {
        self.spi_hz = spi_hz;
        self
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DcErr, RstErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// Data/command pin operation failed.
    Dc(DcErr),
    /// Reset pin operation failed.
    Rst(RstErr),
    /// Window or buffer does not fit the panel.
    InvalidInput,
}

pub type DriverResult<SpiErr, DcErr, RstErr> = Result<(), Error<SpiErr, DcErr, RstErr>>;

/// ST7789 driver over a 4-wire SPI device.
#[derive(Debug)]
pub struct St7789<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
    config: Config,
    geometry: PanelGeometry,
    sleeping: bool,
}

impl<SPI, DC, RST> St7789<SPI, DC, RST>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, config: Config) -> Self {
        Self {
            spi,
            dc,
            rst,
            config,
            geometry: config.geometry.oriented(config.orientation),
            sleeping: true,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Visible size in the configured orientation.
    pub fn size(&self) -> (u16, u16) {
        (self.geometry.width, self.geometry.height)
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Releases owned bus and pins.
    pub fn release(self) -> (SPI, DC, RST) {
        (self.spi, self.dc, self.rst)
    }

    /// Hardware reset followed by the power-on command sequence.
    pub fn init<D>(&mut self, delay: &mut D) -> DriverResult<SPI::Error, DC::Error, RST::Error>
    where
        D: DelayNs,
    {
        self.rst.set_high().map_err(Error::Rst)?;
        delay.delay_ms(10);
        self.rst.set_low().map_err(Error::Rst)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(Error::Rst)?;
        delay.delay_ms(protocol::SLPOUT_DELAY_MS);

        self.command(protocol::SWRESET, &[])?;
        delay.delay_ms(protocol::SWRESET_DELAY_MS);
        self.command(protocol::SLPOUT, &[])?;
        delay.delay_ms(protocol::SLPOUT_DELAY_MS);
        self.command(protocol::COLMOD, &[protocol::COLMOD_RGB565])?;
        self.command(protocol::MADCTL, &[self.config.orientation.madctl()])?;
        if self.config.invert_colors {
            self.command(protocol::INVON, &[])?;
        }
        self.command(protocol::NORON, &[])?;
        self.command(protocol::DISPON, &[])?;
        self.sleeping = false;

        Ok(())
    }

    /// Sends one command byte followed by its parameters.
    pub fn command(
        &mut self,
        cmd: u8,
        params: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        self.dc.set_low().map_err(Error::Dc)?;
        self.spi.write(&[cmd]).map_err(Error::Spi)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(Error::Dc)?;
            self.spi.write(params).map_err(Error::Spi)?;
        }

        Ok(())
    }

    /// Addresses an inclusive window and opens RAM for writing.
    pub fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        if x1 < x0 || y1 < y0 || !self.geometry.contains(x0, y0, x1 - x0 + 1, y1 - y0 + 1) {
            return Err(Error::InvalidInput);
        }

        let (caset, raset) = protocol::window_params(self.geometry, x0, y0, x1, y1);
        self.command(protocol::CASET, &caset)?;
        self.command(protocol::RASET, &raset)?;
        self.command(protocol::RAMWR, &[])
    }

    /// Streams big-endian RGB565 bytes into the open window.
    pub fn write_pixels(
        &mut self,
        pixels: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        self.dc.set_high().map_err(Error::Dc)?;
        self.spi.write(pixels).map_err(Error::Spi)
    }

    /// Blits a `width x height` RGB565 image with its top-left corner at `(x, y)`.
    pub fn draw_image(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        if pixels.len() != width as usize * height as usize * 2
            || !self.geometry.contains(x, y, width, height)
        {
            return Err(Error::InvalidInput);
        }

        self.set_window(x, y, x + width - 1, y + height - 1)?;
        self.write_pixels(pixels)
    }

    /// Fills the whole panel with one RGB565 colour.
    pub fn fill(&mut self, color: u16) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        let (width, height) = self.size();
        self.set_window(0, 0, width - 1, height - 1)?;

        let mut chunk = [0u8; FILL_CHUNK_PIXELS * 2];
        for pair in chunk.chunks_exact_mut(2) {
            pair.copy_from_slice(&color.to_be_bytes());
        }

        let mut remaining = self.geometry.pixel_count();
        while remaining > 0 {
            let pixels = remaining.min(FILL_CHUNK_PIXELS);
            self.write_pixels(&chunk[..pixels * 2])?;
            remaining -= pixels;
        }

        Ok(())
    }

    pub fn display_off(&mut self) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        self.command(protocol::DISPOFF, &[])
    }

    /// Turns the panel off and enters sleep mode.
    pub fn sleep<D>(&mut self, delay: &mut D) -> DriverResult<SPI::Error, DC::Error, RST::Error>
    where
        D: DelayNs,
    {
        self.display_off()?;
        self.command(protocol::SLPIN, &[])?;
        delay.delay_ms(protocol::SLPIN_DELAY_MS);
        self.sleeping = true;
        Ok(())
    }

    pub fn wake<D>(&mut self, delay: &mut D) -> DriverResult<SPI::Error, DC::Error, RST::Error>
    where
        D: DelayNs,
    {
        self.command(protocol::SLPOUT, &[])?;
        delay.delay_ms(protocol::SLPOUT_DELAY_MS);
        self.command(protocol::DISPON, &[])?;
        self.sleeping = false;
        Ok(())
    }
}
