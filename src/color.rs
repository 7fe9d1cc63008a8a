//! Pixel colours for bi-level e-paper panels
//!
//! Each pixel is a single bit in the panel frame:
//!
//! | Color | Bit |
//! |-------|-----|
//! | Black | 0   |
//! | White | 1   |
//!
//! ## Example
//!
//! ```
//! use lume::Color;
//!
//! assert_eq!(Color::Black.bit(), false);
//! assert_eq!(Color::White.fill_byte(), 0xFF);
//! assert_eq!(Color::Black.inverted(), Color::White);
//! ```

use embedded_graphics_core::pixelcolor::raw::RawU1;

/// Colours supported by a bi-level panel
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Color {
    /// Ink
    Black,
    /// Blank paper
    #[default]
    White,
}

impl embedded_graphics_core::prelude::PixelColor for Color {
    type Raw = RawU1;
}

impl Color {
    /// Frame bit for this colour (`true` = blank)
    pub fn bit(self) -> bool {
        match self {
            Self::Black => false,
            Self::White => true,
        }
    }

    /// Colour for a frame bit
    pub fn from_bit(bit: bool) -> Self {
        if bit { Self::White } else { Self::Black }
    }

    /// Byte value that fills eight pixels with this colour
    pub fn fill_byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White => 0xFF,
        }
    }

    /// The opposite polarity, used for highlighted rows
    pub fn inverted(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_round_trip() {
        for color in [Color::Black, Color::White] {
            assert_eq!(Color::from_bit(color.bit()), color);
        }
    }

    #[test]
    fn test_default_is_blank() {
        assert_eq!(Color::default(), Color::White);
        assert_eq!(Color::default().fill_byte(), 0xFF);
    }
}
