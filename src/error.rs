//! Error types
//!
//! Driver errors ([`Error`], [`BuilderError`]) are generic over the bus so
//! callers can match on the underlying SPI/GPIO failure. Everything above the
//! driver uses the `thiserror` types at the bottom of this module:
//!
//! - [`Error`] - hardware failures while talking to the panel (fatal)
//! - [`BuilderError`] - invalid panel configuration
//! - [`LoadError`] - a document could not be opened or rendered (recovered
//!   into a diagnostic page)
//! - [`UnsupportedFormat`] - a file extension no reader handles (logged)
//! - [`SettingsError`] - settings could not be read or written (recovered
//!   into defaults, or dropped)
//!
//! ## Example
//!
//! ```
//! use lume::{Builder, BuilderError, Dimensions};
//!
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! let result = Dimensions::new(1000, 500);
//! assert!(result.is_err());
//! ```

use std::io;
use std::path::PathBuf;

use crate::interface::DisplayInterface;

/// Maximum gate outputs (rows) supported by the UC8179 controller
pub const MAX_GATE_OUTPUTS: u16 = 600;

/// Maximum source outputs (columns) supported by the UC8179 controller
pub const MAX_SOURCE_OUTPUTS: u16 = 800;

/// Errors that can occur when interacting with the panel
///
/// Generic over the interface type to preserve the specific error type.
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO/busy timeout)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// Raw frame does not match the panel frame size
    FrameSize {
        /// Required frame size in bytes
        expected: usize,
        /// Provided frame size in bytes
        provided: usize,
    },
}

impl<I: DisplayInterface> core::fmt::Debug for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => f.debug_tuple("Interface").field(e).finish(),
            Self::FrameSize { expected, provided } => f
                .debug_struct("FrameSize")
                .field("expected", expected)
                .field("provided", provided)
                .finish(),
        }
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
            Self::FrameSize { expected, provided } => {
                write!(
                    f,
                    "Frame size mismatch: expected {expected} bytes, provided {provided}"
                )
            }
        }
    }
}

impl<I: DisplayInterface> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
#[derive(Debug)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Number of rows (height) requested
        rows: u16,
        /// Number of columns (width) requested
        cols: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_GATE_OUTPUTS}x{MAX_SOURCE_OUTPUTS})"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}

/// A document could not be opened, parsed or rasterized
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Reading the file failed
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The content converter rejected the document
    #[error("cannot open {}: {message}", .path.display())]
    Backend {
        /// Document path
        path: PathBuf,
        /// Converter diagnostic
        message: String,
    },
    /// A rasterized page could not be decoded
    #[error("cannot decode page image: {0}")]
    Image(#[from] image::ImageError),
    /// Requested page does not exist
    #[error("page {index} out of range ({count} pages)")]
    PageOutOfRange {
        /// Zero-based page index
        index: usize,
        /// Document page count
        count: usize,
    },
}

/// No reader handles this file extension
#[derive(Debug, thiserror::Error)]
#[error("unsupported format: {}", .path.display())]
pub struct UnsupportedFormat {
    /// The rejected file
    pub path: PathBuf,
}

/// Settings persistence failure
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed
    #[error("settings I/O: {0}")]
    Io(#[from] io::Error),
    /// The settings file is not valid TOML for [`Settings`](crate::Settings)
    #[error("settings parse: {0}")]
    Decode(#[from] toml::de::Error),
    /// The settings could not be serialized
    #[error("settings encode: {0}")]
    Encode(#[from] toml::ser::Error),
}
