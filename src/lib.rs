//! Lume: an e-paper book reader
//!
//! Drives a UC81xx-family monochrome e-paper panel over SPI, listens to a
//! handful of GPIO buttons and pages through plain text, PDF and EPUB files.
//!
//! ## Layers
//!
//! - [`Display`] and [`Interface`]: panel command sequences over `embedded-hal` 1.0
//! - [`Canvas`] and [`PanelFrame`]: off-screen 1-bit drawing and the panel's
//!   packed frame format
//! - [`Surface`]: the seam between page rendering and the panel
//! - [`Reader`]: per-format pagination and page rendering
//! - [`InputRouter`]: debounced button edges to [`Action`]s
//! - [`Navigator`]: menu and reading state machine
//!
//! The `linux` feature builds the `lume` binary, which wires these to spidev
//! and gpio-cdev.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use lume::{Builder, Canvas, Color, Dimensions, Display, Interface};
//!
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
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let busy = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, dc, rst, busy);
//! let dims = match Dimensions::new(480, 800) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = Display::new(interface, config);
//! let _ = display.initialize(&mut delay);
//!
//! let mut canvas = Canvas::new(800, 480);
//! canvas.set_pixel(10, 10, Color::Black);
//! let _ = display.present(&canvas, &mut delay);
//! ```

/// Off-screen 1-bit drawing target
pub mod canvas;
/// Monochrome pixel colour
pub mod color;
/// UC81xx command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Board configuration file
pub mod device;
/// Panel power and refresh sequences
pub mod display;
/// Error types
pub mod error;
/// Packed panel frame format
pub mod frame;
/// Button mapping and debouncing
pub mod input;
/// Hardware interface abstraction
pub mod interface;
/// Book directory listing
pub mod library;
/// Menu and reading state machine
pub mod navigation;
/// Per-format book readers
pub mod reader;
/// Persisted user settings
pub mod settings;
/// Presentation surfaces
pub mod surface;

pub use canvas::Canvas;
pub use color::Color;
pub use config::{Builder, Config, Dimensions, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
pub use device::{DeviceConfig, DeviceConfigError};
pub use display::Display;
pub use error::{BuilderError, Error, LoadError, SettingsError, UnsupportedFormat};
pub use frame::PanelFrame;
pub use input::{Action, DEBOUNCE_WINDOW, InputMap, InputMapError, InputRouter};
pub use interface::InterfaceError;
pub use interface::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_MAX_TRANSFER, DisplayInterface, Interface};
pub use library::Library;
pub use navigation::{Mode, Navigator};
pub use reader::{Format, Formats, Pager, Reader};
pub use settings::{Settings, SettingsStore};
pub use surface::{EpdSurface, Surface};
