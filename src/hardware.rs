//! Linux hardware bring-up: spidev panel and gpio-cdev button watchers

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use linux_embedded_hal::gpio_cdev::{Chip, EventRequestFlags, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
use log::{debug, info, warn};

use lume::device::PanelConfig;
use lume::{Display, EpdSurface, InputRouter, Interface};

const CONSUMER: &str = "lume";

/// Panel bus and control lines
pub type PanelInterface = Interface<SpidevDevice, CdevPin, CdevPin, CdevPin>;

/// The panel as a presentation surface
pub type PanelSurface = EpdSurface<PanelInterface, Delay>;

/// Open the SPI device and control lines, reset and power up the panel
pub fn open_panel(config: &PanelConfig) -> Result<PanelSurface> {
    let mut spi = SpidevDevice::open(&config.spi_device)
        .with_context(|| format!("opening {}", config.spi_device.display()))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(config.spi_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options)
        .with_context(|| format!("configuring {}", config.spi_device.display()))?;

    let mut chip = open_chip(&config.gpio_chip)?;
    let mut output = |offset: u32, name: &str| -> Result<CdevPin> {
        let handle = chip
            .get_line(offset)
            .and_then(|line| line.request(LineRequestFlags::OUTPUT, 1, CONSUMER))
            .with_context(|| format!("requesting {name} line {offset}"))?;
        CdevPin::new(handle).with_context(|| format!("configuring {name} line {offset}"))
    };
    let dc = output(config.dc, "DC")?;
    let rst = output(config.rst, "RST")?;
    let busy_handle = chip
        .get_line(config.busy)
        .and_then(|line| line.request(LineRequestFlags::INPUT, 0, CONSUMER))
        .with_context(|| format!("requesting BUSY line {}", config.busy))?;
    let busy = CdevPin::new(busy_handle)
        .with_context(|| format!("configuring BUSY line {}", config.busy))?;

    let mut interface = Interface::new(spi, dc, rst, busy);
    interface
        .set_busy_timeout(config.busy_timeout_ms)
        .set_busy_active_high(config.busy_active_high)
        .set_max_transfer(config.spi_max_transfer);

    let driver_config = config.driver_config()?;
    let mut display = Display::new(interface, driver_config);
    let mut delay = Delay;
    display
        .initialize(&mut delay)
        .map_err(|e| anyhow!("panel did not come up: {e}"))?;
    Ok(EpdSurface::new(display, delay))
}

/// Start one thread per button line feeding falling edges into `router`
pub fn spawn_watchers(chip_path: &Path, router: &Arc<InputRouter>) -> Result<()> {
    let mut chip = open_chip(chip_path)?;
    for (offset, action) in router.map().iter() {
        let events = chip
            .get_line(offset)
            .and_then(|line| {
                line.events(
                    LineRequestFlags::INPUT,
                    EventRequestFlags::FALLING_EDGE,
                    CONSUMER,
                )
            })
            .with_context(|| format!("watching {action} on line {offset}"))?;

        let router = Arc::clone(router);
        thread::Builder::new()
            .name(format!("input-{action}"))
            .spawn(move || {
                let mut anchor = None;
                for event in events {
                    match event {
                        Ok(event) => {
                            debug!("edge on line {offset} at {}ns", event.timestamp());
                            router.on_edge(offset, edge_instant(&mut anchor, event.timestamp()));
                        }
                        Err(e) => {
                            warn!("stopped watching line {offset}: {e}");
                            break;
                        }
                    }
                }
            })
            .with_context(|| format!("spawning watcher for {action}"))?;
    }
    info!("watching {} input lines", router.map().iter().count());
    Ok(())
}

fn open_chip(path: &Path) -> Result<Chip> {
    Chip::new(path).with_context(|| format!("opening {}", path.display()))
}

/// Place a kernel edge timestamp on the `Instant` timeline
///
/// The first edge a watcher sees anchors the mapping; later edges keep their
/// kernel spacing however late the thread gets to them.
fn edge_instant(anchor: &mut Option<(Instant, u64)>, stamp_ns: u64) -> Instant {
    let (base, base_ns) = *anchor.get_or_insert_with(|| (Instant::now(), stamp_ns));
    base + Duration::from_nanos(stamp_ns.saturating_sub(base_ns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_spacing_follows_kernel_stamps() {
        let mut anchor = None;
        let first = edge_instant(&mut anchor, 5_000_000_000);
        std::thread::sleep(Duration::from_millis(50));
        // 150 ms after the first edge by the kernel clock, handled late.
        let second = edge_instant(&mut anchor, 5_150_000_000);
        assert_eq!(second - first, Duration::from_millis(150));
    }

    #[test]
    fn test_stamp_before_anchor_does_not_go_back() {
        let mut anchor = None;
        let first = edge_instant(&mut anchor, 1_000);
        assert_eq!(edge_instant(&mut anchor, 10), first);
    }
}
