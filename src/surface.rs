//! Presentation seam between the application and the panel
//!
//! Readers and the menu draw into a [`Canvas`] and hand it to a [`Surface`].
//! On hardware the surface is an [`EpdSurface`], which owns the driver and
//! puts the panel to sleep when dropped.

use core::fmt::Debug;
use embedded_graphics_core::geometry::Size;
use embedded_hal::delay::DelayNs;
use log::{error, warn};

use crate::canvas::Canvas;
use crate::display::Display;
use crate::error::Error;
use crate::interface::DisplayInterface;

/// Something a full frame can be shown on
pub trait Surface {
    /// Hardware failure type
    type Error: Debug;

    /// Native size; canvases are composed at this size
    fn size(&self) -> Size;

    /// Show `canvas`, blocking until the frame is visible
    fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error>;

    /// A blank canvas at the native size
    fn blank_canvas(&self) -> Canvas {
        let size = self.size();
        Canvas::new(size.width, size.height)
    }

    /// Show an all-blank frame
    fn clear(&mut self) -> Result<(), Self::Error> {
        let canvas = self.blank_canvas();
        self.present(&canvas)
    }
}

/// [`Surface`] backed by the e-paper driver
///
/// Dropping the surface powers the panel off and puts it into deep sleep.
/// Errors at that point are logged.
pub struct EpdSurface<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    display: Display<I>,
    delay: D,
}

impl<I, D> EpdSurface<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    /// Wrap an already initialized display
    pub fn new(display: Display<I>, delay: D) -> Self {
        Self { display, delay }
    }
}

impl<I, D> Surface for EpdSurface<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    type Error = Error<I>;

    fn size(&self) -> Size {
        let dims = self.display.dimensions();
        Size::new(u32::from(dims.cols), u32::from(dims.rows))
    }

    fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error> {
        self.display.present(canvas, &mut self.delay).inspect_err(|e| {
            error!("present failed: {e}");
        })
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.display.clear(&mut self.delay)
    }
}

impl<I, D> Drop for EpdSurface<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    fn drop(&mut self) {
        if let Err(e) = self.display.sleep(&mut self.delay) {
            warn!("could not put panel to sleep: {e}");
        }
    }
}

/// In-memory surface that keeps every presented frame
#[cfg(test)]
pub(crate) struct RecordingSurface {
    pub(crate) size: Size,
    pub(crate) frames: Vec<Canvas>,
    pub(crate) fail: bool,
}

#[cfg(test)]
impl RecordingSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            frames: Vec::new(),
            fail: false,
        }
    }

    pub(crate) fn last(&self) -> &Canvas {
        self.frames.last().expect("nothing presented")
    }
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
pub(crate) struct SurfaceDown;

#[cfg(test)]
impl Surface for RecordingSurface {
    type Error = SurfaceDown;

    fn size(&self) -> Size {
        self.size
    }

    fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error> {
        if self.fail {
            return Err(SurfaceDown);
        }
        self.frames.push(canvas.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::command::{DEEP_SLEEP, WRITE_IMAGE_DATA};
    use crate::config::{Builder, Dimensions};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct SharedInterface {
        commands: Rc<RefCell<Vec<u8>>>,
    }

    impl DisplayInterface for SharedInterface {
        type Error = core::convert::Infallible;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.commands.borrow_mut().push(command);
            Ok(())
        }

        fn send_data(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            Ok(())
        }

        fn busy_wait<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockDelay;
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn surface(commands: &Rc<RefCell<Vec<u8>>>) -> EpdSurface<SharedInterface, MockDelay> {
        let config = Builder::new()
            .dimensions(Dimensions::new(480, 800).unwrap())
            .build()
            .unwrap();
        let interface = SharedInterface {
            commands: Rc::clone(commands),
        };
        EpdSurface::new(Display::new(interface, config), MockDelay)
    }

    #[test]
    fn test_size_is_panel_size() {
        let commands = Rc::new(RefCell::new(Vec::new()));
        let surface = surface(&commands);
        assert_eq!(surface.size(), Size::new(800, 480));
        assert_eq!(surface.blank_canvas().width(), 800);
    }

    #[test]
    fn test_present_reaches_panel() {
        let commands = Rc::new(RefCell::new(Vec::new()));
        let mut surface = surface(&commands);
        let mut canvas = surface.blank_canvas();
        canvas.set_pixel(1, 1, Color::Black);
        surface.present(&canvas).unwrap();
        assert_eq!(commands.borrow().first(), Some(&WRITE_IMAGE_DATA));
    }

    #[test]
    fn test_drop_puts_panel_to_sleep() {
        let commands = Rc::new(RefCell::new(Vec::new()));
        drop(surface(&commands));
        assert_eq!(commands.borrow().last(), Some(&DEEP_SLEEP));
    }

    #[test]
    fn test_recording_surface_clear() {
        let mut surface = RecordingSurface::new(16, 4);
        surface.clear().unwrap();
        assert_eq!(surface.last().ink_count(), 0);
    }
}
