//! SH1106 128×64 OLED driver.
//!
//! Register-level driver over any [`embedded_hal::i2c::I2c`] bus.  Text is
//! rendered into a local page-organised framebuffer with
//! `embedded-graphics` fonts, then the whole buffer is flushed; at the
//! update rates this firmware needs (one readout every 30 s) partial
//! updates are not worth the bookkeeping.
//!
//! The SH1106 is a 132-column controller driving a 128-column glass, so
//! every page write starts at column offset 2.

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_hal::i2c::I2c;

use crate::display::GlyphScale;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;
const COLUMN_OFFSET: u8 = 2;

const CTRL_COMMAND: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

/// Page-organised framebuffer: byte = column + page×128, bit = y within
/// the page.
struct Framebuffer {
    bytes: [u8; WIDTH * PAGES],
}

impl Framebuffer {
    fn new() -> Self {
        Self {
            bytes: [0; WIDTH * PAGES],
        }
    }

    fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, colour) in pixels {
            let (x, y) = (point.x, point.y);
            if x < 0 || x >= WIDTH as i32 || y < 0 || y >= HEIGHT as i32 {
                continue;
            }
            let index = x as usize + (y as usize / 8) * WIDTH;
            let mask = 1u8 << (y as usize % 8);
            if colour.is_on() {
                self.bytes[index] |= mask;
            } else {
                self.bytes[index] &= !mask;
            }
        }
        Ok(())
    }
}

pub struct OledDisplay {
    addr: u8,
    buffer: Framebuffer,
}

impl OledDisplay {
    pub fn new(addr: u8) -> Self {
        Self {
            addr,
            buffer: Framebuffer::new(),
        }
    }

    /// Power-up sequence, blank panel, panel on.
    pub fn init<I: I2c>(&mut self, i2c: &mut I, flipped: bool) -> Result<(), I::Error> {
        self.command(i2c, &[0xAE])?; // panel off while configuring
        self.command(i2c, &[0xD5, 0x80])?; // clock divide
        self.command(i2c, &[0xA8, 0x3F])?; // multiplex 1/64
        self.command(i2c, &[0xD3, 0x00])?; // display offset
        self.command(i2c, &[0x40])?; // start line 0
        self.command(i2c, &[0xAD, 0x8B])?; // charge pump on
        self.set_flipped(i2c, flipped)?;
        self.command(i2c, &[0xDA, 0x12])?; // COM pins
        self.command(i2c, &[0x81, 0xCF])?; // contrast
        self.command(i2c, &[0xD9, 0x1F])?; // pre-charge
        self.command(i2c, &[0xDB, 0x40])?; // VCOM deselect
        self.command(i2c, &[0xA4, 0xA6])?; // RAM content, non-inverted
        self.buffer.clear();
        self.flush(i2c)?;
        self.command(i2c, &[0xAF]) // panel on
    }

    pub fn clear<I: I2c>(&mut self, i2c: &mut I) -> Result<(), I::Error> {
        self.buffer.clear();
        self.flush(i2c)
    }

    /// Draw text at a character-cell position.  Cells are 8×8 pixels;
    /// large glyphs spill over their cell by design, matching the 2×2-cell
    /// layout the display engine plans for.
    pub fn draw_text<I: I2c>(
        &mut self,
        i2c: &mut I,
        col: u8,
        row: u8,
        scale: GlyphScale,
        text: &str,
    ) -> Result<(), I::Error> {
        let style = match scale {
            GlyphScale::Large => MonoTextStyle::new(&FONT_10X20, BinaryColor::On),
            GlyphScale::Small => MonoTextStyle::new(&FONT_6X10, BinaryColor::On),
        };
        let origin = Point::new(i32::from(col) * 8, i32::from(row) * 8);
        // Drawing into the framebuffer is infallible.
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.buffer);
        self.flush(i2c)
    }

    /// Rotate the panel 180° in hardware; the framebuffer is untouched.
    pub fn set_flipped<I: I2c>(&mut self, i2c: &mut I, flipped: bool) -> Result<(), I::Error> {
        if flipped {
            self.command(i2c, &[0xA0, 0xC0])
        } else {
            self.command(i2c, &[0xA1, 0xC8])
        }
    }

    pub fn set_contrast<I: I2c>(&mut self, i2c: &mut I, contrast: u8) -> Result<(), I::Error> {
        self.command(i2c, &[0x81, contrast])
    }

    fn flush<I: I2c>(&mut self, i2c: &mut I) -> Result<(), I::Error> {
        for page in 0..PAGES {
            self.command(
                i2c,
                &[
                    0xB0 | page as u8,
                    COLUMN_OFFSET & 0x0F,
                    0x10 | (COLUMN_OFFSET >> 4),
                ],
            )?;
            let mut chunk = [0u8; WIDTH + 1];
            chunk[0] = CTRL_DATA;
            chunk[1..].copy_from_slice(&self.buffer.bytes[page * WIDTH..(page + 1) * WIDTH]);
            i2c.write(self.addr, &chunk)?;
        }
        Ok(())
    }

    fn command<I: I2c>(&mut self, i2c: &mut I, bytes: &[u8]) -> Result<(), I::Error> {
        // Command payloads are at most 3 bytes; one control byte in front.
        let mut buf = [0u8; 4];
        buf[0] = CTRL_COMMAND;
        buf[1..=bytes.len()].copy_from_slice(bytes);
        i2c.write(self.addr, &buf[..=bytes.len()])
    }
}
