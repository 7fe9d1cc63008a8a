//! Panel wire format
//!
//! A [`PanelFrame`] is the byte stream that follows the write-image-data
//! command: `ceil(W/8) * H` bytes, row-major, most significant bit first
//! within each byte, bit set for a blank pixel. Padding bits past the last
//! column of a row are blank.

use crate::canvas::Canvas;
use crate::color::Color;

/// Encoded frame ready for transmission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelFrame {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PanelFrame {
    /// Pack a canvas into the wire format
    pub fn encode(canvas: &Canvas) -> Self {
        let width = canvas.width();
        let height = canvas.height();
        let row_bytes = width.div_ceil(8) as usize;
        let mut bytes = Vec::with_capacity(row_bytes * height as usize);

        for y in 0..height {
            for byte_x in 0..row_bytes as u32 {
                let mut byte = 0u8;
                for bit in 0..8 {
                    let x = byte_x * 8 + bit;
                    // Pixels past the right edge read as blank.
                    if canvas.pixel(x, y).bit() {
                        byte |= 0x80 >> bit;
                    }
                }
                bytes.push(byte);
            }
        }

        Self {
            width,
            height,
            bytes,
        }
    }

    /// Unpack the frame back into a canvas
    pub fn decode(&self) -> Canvas {
        let row_bytes = self.width.div_ceil(8) as usize;
        let mut canvas = Canvas::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let byte = self.bytes[y as usize * row_bytes + (x / 8) as usize];
                let blank = byte & (0x80 >> (x % 8)) != 0;
                canvas.set_pixel(x, y, Color::from_bit(blank));
            }
        }
        canvas
    }

    /// Frame payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}
