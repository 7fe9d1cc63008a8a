//! Bi-level drawing canvas
//!
//! A [`Canvas`] is a fixed W×H raster, one bit per pixel, that implements the
//! embedded-graphics [`DrawTarget`] trait. Readers and the menu compose a
//! frame into a fresh canvas and hand it to a [`Surface`](crate::Surface);
//! there is no incremental diffing between frames.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::{
//!     mono_font::{ascii::FONT_6X10, MonoTextStyle},
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//!     text::Text,
//! };
//! use lume::{Canvas, Color};
//!
//! let mut canvas = Canvas::new(64, 32);
//! let _ = Rectangle::new(Point::new(0, 0), Size::new(8, 8))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Black))
//!     .draw(&mut canvas);
//! let _ = Text::new("Hi", Point::new(10, 20), MonoTextStyle::new(&FONT_6X10, Color::Black))
//!     .draw(&mut canvas);
//!
//! assert_eq!(canvas.pixel(0, 0), Color::Black);
//! assert_eq!(canvas.pixel(63, 31), Color::White);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    prelude::Pixel,
};

use crate::color::Color;

/// Fixed-size 1-bit raster (bit 1 = blank, bit 0 = ink)
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// Packed rows, `ceil(width / 8)` bytes each, MSB = leftmost pixel
    bits: Vec<u8>,
}

impl Canvas {
    /// Create a blank canvas
    pub fn new(width: u32, height: u32) -> Self {
        let row_bytes = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            bits: vec![Color::White.fill_byte(); row_bytes * height as usize],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    fn row_bytes(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    fn locate(&self, x: u32, y: u32) -> (usize, u8) {
        let index = y as usize * self.row_bytes() + (x / 8) as usize;
        (index, 0x80 >> (x % 8))
    }

    /// Read one pixel; out-of-bounds reads are blank
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::White;
        }
        let (index, mask) = self.locate(x, y);
        Color::from_bit(self.bits[index] & mask != 0)
    }

    /// Write one pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (index, mask) = self.locate(x, y);
        if color.bit() {
            self.bits[index] |= mask;
        } else {
            self.bits[index] &= !mask;
        }
    }

    /// Fill the whole canvas with one colour
    pub fn fill(&mut self, color: Color) {
        self.bits.fill(color.fill_byte());
    }

    /// Number of ink pixels
    pub fn ink_count(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pixel(x, y) == Color::Black)
            .count()
    }

    /// Nearest-neighbour resample to `width`×`height`
    ///
    /// Returns a clone when the size already matches.
    pub fn resample(&self, width: u32, height: u32) -> Canvas {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Canvas::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let src_y = (u64::from(y) * u64::from(self.height) / u64::from(height)) as u32;
            for x in 0..width {
                let src_x = (u64::from(x) * u64::from(self.width) / u64::from(width)) as u32;
                out.set_pixel(x, y, self.pixel(src_x, src_y));
            }
        }
        out
    }
}

impl core::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("ink", &self.ink_count())
            .finish()
    }
}

impl DrawTarget for Canvas {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            self.set_pixel(x as u32, y as u32, color);
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
