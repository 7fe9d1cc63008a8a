//! Panel configuration types and builder

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};

/// Panel dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Number of rows (height in pixels, corresponds to gate outputs)
    pub rows: u16,
    /// Number of columns (width in pixels, corresponds to source outputs)
    pub cols: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero or
    /// exceeds the controller limits.
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        if rows == 0 || rows > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        if cols == 0 || cols > MAX_SOURCE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Bytes per packed row, `ceil(cols / 8)`
    pub fn row_bytes(&self) -> usize {
        (self.cols as usize).div_ceil(8)
    }

    /// Size of a full panel frame in bytes
    pub fn buffer_size(&self) -> usize {
        self.row_bytes() * self.rows as usize
    }
}

/// Panel configuration
///
/// Holds the vendor initialization parameters sent by
/// [`Display::initialize`](crate::Display::initialize). Use [`Builder`] to
/// create one.
#[derive(Clone, Debug)]
pub struct Config {
    /// Panel dimensions
    pub dimensions: Dimensions,
    /// Power setting parameters (4 bytes for command 0x01)
    pub power_setting: [u8; 4],
    /// Panel setting byte (command 0x00)
    pub panel_setting: u8,
    /// Booster soft-start parameters (4 bytes for command 0x06)
    pub booster_soft_start: [u8; 4],
}

/// Builder for constructing panel configuration
///
/// # Example
///
/// ```
/// use lume::{Builder, Dimensions};
///
/// let dims = match Dimensions::new(480, 800) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new().dimensions(dims).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.dimensions.buffer_size(), 100 * 480);
/// ```
#[must_use]
pub struct Builder {
    dimensions: Option<Dimensions>,
    power_setting: [u8; 4],
    panel_setting: u8,
    booster_soft_start: [u8; 4],
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            // VGH=20V, VGL=-20V, VDH=15V, VDL=-15V
            power_setting: [0x07, 0x07, 0x3F, 0x3F],
            // KW mode, LUT from OTP, scan up, shift right, booster on
            panel_setting: 0x1F,
            booster_soft_start: [0x17, 0x17, 0x28, 0x17],
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set power setting parameters
    pub fn power_setting(mut self, values: [u8; 4]) -> Self {
        self.power_setting = values;
        self
    }

    /// Set the panel setting byte
    pub fn panel_setting(mut self, value: u8) -> Self {
        self.panel_setting = value;
        self
    }

    /// Set booster soft-start parameters
    pub fn booster_soft_start(mut self, values: [u8; 4]) -> Self {
        self.booster_soft_start = values;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            power_setting: self.power_setting,
            panel_setting: self.panel_setting,
            booster_soft_start: self.booster_soft_start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_bytes_rounds_up() {
        let dims = Dimensions::new(10, 13).unwrap();
        assert_eq!(dims.row_bytes(), 2);
        assert_eq!(dims.buffer_size(), 20);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Dimensions::new(0, 800),
            Err(BuilderError::InvalidDimensions { rows: 0, .. })
        ));
        assert!(Dimensions::new(480, 0).is_err());
    }

    #[test]
    fn test_oversize_dimensions_rejected() {
        assert!(Dimensions::new(MAX_GATE_OUTPUTS + 1, 800).is_err());
        assert!(Dimensions::new(480, MAX_SOURCE_OUTPUTS + 1).is_err());
    }

    #[test]
    fn test_build_without_dimensions_fails() {
        assert!(matches!(
            Builder::new().build(),
            Err(BuilderError::MissingDimensions)
        ));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Builder::new()
            .dimensions(Dimensions::new(480, 800).unwrap())
            .panel_setting(0x0F)
            .power_setting([1, 2, 3, 4])
            .booster_soft_start([5, 6, 7, 8])
            .build()
            .unwrap();
        assert_eq!(config.panel_setting, 0x0F);
        assert_eq!(config.power_setting, [1, 2, 3, 4]);
        assert_eq!(config.booster_soft_start, [5, 6, 7, 8]);
    }
}
