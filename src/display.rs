//! Core display operations

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::canvas::Canvas;
use crate::command::{
    BOOSTER_SOFT_START, DEEP_SLEEP, DEEP_SLEEP_CHECK, DISPLAY_REFRESH, PANEL_SETTING, POWER_OFF,
    POWER_ON, POWER_SETTING, WRITE_IMAGE_DATA,
};
use crate::config::{Config, Dimensions};
use crate::error::Error;
use crate::frame::PanelFrame;
use crate::interface::DisplayInterface;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Core display driver for UC81xx bi-level panels
///
/// Every frame is a full refresh: the whole image is written with
/// [`WRITE_IMAGE_DATA`] and then [`DISPLAY_REFRESH`] drives the waveform.
/// Failures are returned to the caller without retrying.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Whether the charge pumps are on
    is_powered: bool,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            is_powered: false,
        }
    }

    /// Reset the controller and send the power-up sequence
    ///
    /// Blocks until the panel reports ready after power-on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Interface` if the bus fails or BUSY never clears.
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.reset(delay).map_err(Error::Interface)?;
        self.busy_wait(delay)?;

        self.send_command(POWER_SETTING)?;
        let power = self.config.power_setting;
        self.send_data(&power)?;

        self.send_command(PANEL_SETTING)?;
        self.send_data(&[self.config.panel_setting])?;

        self.send_command(BOOSTER_SOFT_START)?;
        let booster = self.config.booster_soft_start;
        self.send_data(&booster)?;

        self.send_command(POWER_ON)?;
        self.busy_wait(delay)?;
        self.is_powered = true;

        info!(
            "panel initialized ({}x{})",
            self.config.dimensions.cols, self.config.dimensions.rows
        );
        Ok(())
    }

    /// Show a canvas, resampling it to the panel size first if needed
    pub fn present<D: DelayNs>(&mut self, canvas: &Canvas, delay: &mut D) -> DisplayResult<I> {
        let width = u32::from(self.config.dimensions.cols);
        let height = u32::from(self.config.dimensions.rows);
        let frame = if canvas.width() == width && canvas.height() == height {
            PanelFrame::encode(canvas)
        } else {
            debug!(
                "resampling {}x{} canvas to {}x{}",
                canvas.width(),
                canvas.height(),
                width,
                height
            );
            PanelFrame::encode(&canvas.resample(width, height))
        };
        self.write_frame(frame.as_bytes(), delay)
    }

    /// Blank the whole panel
    pub fn clear<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let canvas = Canvas::new(
            u32::from(self.config.dimensions.cols),
            u32::from(self.config.dimensions.rows),
        );
        self.present(&canvas, delay)
    }

    /// Write a pre-encoded frame and refresh
    ///
    /// # Errors
    ///
    /// Returns `Error::FrameSize` if `frame` is not exactly
    /// [`Dimensions::buffer_size`] bytes. Nothing is sent in that case.
    pub fn write_frame<D: DelayNs>(&mut self, frame: &[u8], delay: &mut D) -> DisplayResult<I> {
        let expected = self.config.dimensions.buffer_size();
        if frame.len() != expected {
            return Err(Error::FrameSize {
                expected,
                provided: frame.len(),
            });
        }

        self.send_command(WRITE_IMAGE_DATA)?;
        self.send_data(frame)?;
        self.send_command(DISPLAY_REFRESH)?;
        self.busy_wait(delay)?;
        debug!("refresh complete");
        Ok(())
    }

    /// Turn the charge pumps off
    ///
    /// Does nothing if the panel is already powered off.
    pub fn power_off<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        if !self.is_powered {
            return Ok(());
        }
        self.send_command(POWER_OFF)?;
        self.busy_wait(delay)?;
        self.is_powered = false;
        Ok(())
    }

    /// Power off and enter deep sleep
    ///
    /// Only [`initialize`](Self::initialize) (which pulses reset) wakes the
    /// panel again.
    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.power_off(delay)?;
        self.send_command(DEEP_SLEEP)?;
        self.send_data(&[DEEP_SLEEP_CHECK])?;
        info!("panel asleep");
        Ok(())
    }

    /// Whether the charge pumps are currently on
    pub fn is_powered(&self) -> bool {
        self.is_powered
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.busy_wait(delay).map_err(Error::Interface)
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    /// Send data to the display controller
    fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}
