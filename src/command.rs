//! UC81xx command definitions
//!
//! Command bytes understood by the UC8179/UC8151 family of e-paper
//! controllers fitted to 800x480 panels. Commands are sent over SPI with the
//! DC pin low; their parameters follow with the DC pin high.
//!
//! ## Command Structure
//!
//! Every command follows the pattern:
//! 1. Assert CS (Chip Select)
//! 2. Set DC low (command mode)
//! 3. Send command byte
//! 4. Deassert CS
//! 5. Assert CS, set DC high (data mode), send parameter bytes, deassert CS
//!
//! ## Example
//!
//! ```rust,no_run
//! use lume::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//! # let frame = [0xFFu8; 4];
//! let _ = interface.send_command(command::WRITE_IMAGE_DATA);
//! let _ = interface.send_data(&frame);
//! let _ = interface.send_command(command::DISPLAY_REFRESH);
//! ```

// Initialization commands

/// Panel setting (0x00)
///
/// Selects LUT source, resolution and scan direction.
/// Requires 1 byte.
pub const PANEL_SETTING: u8 = 0x00;

/// Power setting (0x01)
///
/// Selects internal/external power and the VGH/VGL/VDH/VDL levels.
/// Requires 4 bytes.
pub const POWER_SETTING: u8 = 0x01;

/// Power off (0x02)
///
/// Turns the charge pumps off. BUSY is asserted until power-down completes.
pub const POWER_OFF: u8 = 0x02;

/// Power on (0x04)
///
/// Turns the charge pumps on. Must wait for BUSY to clear before drawing.
pub const POWER_ON: u8 = 0x04;

/// Booster soft-start (0x06)
///
/// Controls soft-start timing of the booster phases.
/// Requires 4 bytes.
pub const BOOSTER_SOFT_START: u8 = 0x06;

/// Deep sleep (0x07)
///
/// Requires 1 byte, the check code 0xA5. Only a hardware reset wakes the panel.
pub const DEEP_SLEEP: u8 = 0x07;

/// Check code that must accompany [`DEEP_SLEEP`]
pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

// Runtime commands

/// Write image data, "new" frame (0x13)
///
/// Followed by `ceil(width / 8) * height` bytes, MSB first per row byte.
/// Bit=0: ink, Bit=1: blank.
pub const WRITE_IMAGE_DATA: u8 = 0x13;

/// Display refresh (0x12)
///
/// Drives the waveform for the frame last written. BUSY is asserted during
/// the refresh, typically a few seconds on a full-panel update.
pub const DISPLAY_REFRESH: u8 = 0x12;
