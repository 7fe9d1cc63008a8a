//! Board configuration
//!
//! Where the books live, which SPI device and GPIO chip the panel hangs
//! off, and which line offsets carry the buttons. Read once at startup from
//! a TOML file; every field has a default matching the reference board
//! (Raspberry Pi with a 7.5" HAT and a five-way joystick).
//!
//! ```toml
//! book_dir = "/home/pi/books"
//!
//! [panel]
//! width = 800
//! height = 480
//!
//! [input]
//! up = 5
//! down = 6
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::config::{Builder, Config, Dimensions};
use crate::error::BuilderError;
use crate::input::{InputMap, InputMapError};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/lume/lume.toml";

/// Environment variable overriding [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_ENV: &str = "LUME_CONFIG";

/// Errors reading the board configuration
#[derive(Debug, thiserror::Error)]
pub enum DeviceConfigError {
    /// The file exists but could not be read
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The file is not valid configuration TOML
    #[error("invalid {}: {source}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser diagnostic
        #[source]
        source: toml::de::Error,
    },
    /// Panel size out of range
    #[error("panel: {0}")]
    Panel(#[from] BuilderError),
    /// Button lines are not distinct
    #[error("input: {0}")]
    Input(#[from] InputMapError),
}

/// Full board configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Directory scanned for books
    pub book_dir: PathBuf,
    /// Settings file
    pub settings_path: PathBuf,
    /// Panel wiring and geometry
    pub panel: PanelConfig,
    /// Button wiring
    pub input: InputLines,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let home = env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/home/pi"));
        Self {
            book_dir: home.join("books"),
            settings_path: home.join(".config").join("lume").join("settings.toml"),
            panel: PanelConfig::default(),
            input: InputLines::default(),
        }
    }
}

/// Panel bus, control lines and geometry
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// spidev node
    pub spi_device: PathBuf,
    /// SPI clock in Hz
    pub spi_hz: u32,
    /// Largest single SPI message, at most the kernel's `spidev.bufsiz`
    pub spi_max_transfer: usize,
    /// GPIO character device
    pub gpio_chip: PathBuf,
    /// Data/command line offset
    pub dc: u32,
    /// Reset line offset
    pub rst: u32,
    /// Busy line offset
    pub busy: u32,
    /// BUSY reads high while the panel is busy
    pub busy_active_high: bool,
    /// Busy-wait bound in milliseconds
    pub busy_timeout_ms: u32,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            spi_device: PathBuf::from("/dev/spidev0.0"),
            spi_hz: 4_000_000,
            spi_max_transfer: crate::interface::DEFAULT_MAX_TRANSFER,
            gpio_chip: PathBuf::from("/dev/gpiochip0"),
            dc: 25,
            rst: 17,
            busy: 24,
            busy_active_high: false,
            busy_timeout_ms: crate::interface::DEFAULT_BUSY_TIMEOUT_MS,
            width: 800,
            height: 480,
        }
    }
}

impl PanelConfig {
    /// Driver configuration for this panel
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError`] if the size is out of range.
    pub fn driver_config(&self) -> Result<Config, BuilderError> {
        Builder::new()
            .dimensions(Dimensions::new(self.height, self.width)?)
            .build()
    }
}

/// GPIO line offset for each button
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputLines {
    /// Joystick up
    pub up: u32,
    /// Joystick down
    pub down: u32,
    /// Joystick left
    pub left: u32,
    /// Joystick right
    pub right: u32,
    /// Joystick press
    pub select: u32,
    /// Menu button
    pub menu: u32,
    /// Back button
    pub back: u32,
    /// Bookmark button
    pub bookmark: u32,
    /// Settings button
    pub settings: u32,
}

impl Default for InputLines {
    fn default() -> Self {
        Self {
            up: 5,
            down: 6,
            left: 13,
            right: 19,
            select: 26,
            menu: 21,
            back: 20,
            bookmark: 16,
            settings: 12,
        }
    }
}

impl InputLines {
    /// Validated line table
    ///
    /// # Errors
    ///
    /// Returns [`InputMapError`] if two buttons share a line.
    pub fn map(&self) -> Result<InputMap, InputMapError> {
        InputMap::new([
            self.up,
            self.down,
            self.left,
            self.right,
            self.select,
            self.menu,
            self.back,
            self.bookmark,
            self.settings,
        ])
    }
}

impl DeviceConfig {
    /// Path named by `LUME_CONFIG`, or the default location
    pub fn locate() -> PathBuf {
        env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Parse configuration text
    ///
    /// `path` is only used in error messages.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, DeviceConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| DeviceConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`; a missing file yields the defaults
    ///
    /// # Errors
    ///
    /// Returns [`DeviceConfigError`] if the file exists but cannot be read,
    /// parsed or validated.
    pub fn load(path: &Path) -> Result<Self, DeviceConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!("loading configuration from {}", path.display());
                Self::from_toml(&text, path)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using built-in configuration", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(DeviceConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn validate(&self) -> Result<(), DeviceConfigError> {
        self.panel.driver_config()?;
        self.input.map()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = DeviceConfig::from_toml("", Path::new("lume.toml")).unwrap();
        assert_eq!(config, DeviceConfig::default());
        assert_eq!(config.panel.spi_device, PathBuf::from("/dev/spidev0.0"));
        assert_eq!(config.panel.width, 800);
        assert_eq!(config.panel.spi_max_transfer, 4096);
        assert_eq!(config.input.select, 26);
    }

    #[test]
    fn test_partial_override() {
        let text = r#"
            book_dir = "/media/books"

            [panel]
            busy_active_high = true
            spi_max_transfer = 65536

            [input]
            up = 22
        "#;
        let config = DeviceConfig::from_toml(text, Path::new("lume.toml")).unwrap();
        assert_eq!(config.book_dir, PathBuf::from("/media/books"));
        assert!(config.panel.busy_active_high);
        assert_eq!(config.panel.dc, 25);
        assert_eq!(config.panel.spi_max_transfer, 65536);
        assert_eq!(config.input.up, 22);
        assert_eq!(config.input.down, 6);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let result = DeviceConfig::from_toml("book_dir = [", Path::new("lume.toml"));
        assert!(matches!(result, Err(DeviceConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_key_is_error() {
        let result = DeviceConfig::from_toml("[panel]\nwidht = 800\n", Path::new("lume.toml"));
        assert!(matches!(result, Err(DeviceConfigError::Parse { .. })));
    }

    #[test]
    fn test_duplicate_button_line_is_error() {
        let result = DeviceConfig::from_toml("[input]\nup = 6\n", Path::new("lume.toml"));
        assert!(matches!(result, Err(DeviceConfigError::Input(_))));
    }

    #[test]
    fn test_oversize_panel_is_error() {
        let result = DeviceConfig::from_toml("[panel]\nwidth = 1200\n", Path::new("lume.toml"));
        assert!(matches!(result, Err(DeviceConfigError::Panel(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = DeviceConfig::load(Path::new("/nonexistent/lume/lume.toml")).unwrap();
        assert_eq!(config.input, InputLines::default());
    }

    #[test]
    fn test_driver_config_dimensions() {
        let config = PanelConfig::default().driver_config().unwrap();
        assert_eq!(config.dimensions.cols, 800);
        assert_eq!(config.dimensions.rows, 480);
    }
}
