//! `lume` binary: reads the board configuration, brings up the panel and
//! buttons, and runs the navigator until interrupted.

mod hardware;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info};

use lume::{Action, DeviceConfig, Formats, InputRouter, Library, Navigator, SettingsStore};

/// Upper bound on one idle wait of the main loop
const IDLE_WAIT: Duration = Duration::from_secs(1);

enum Event {
    Input(Action),
    Shutdown,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let config_path = DeviceConfig::locate();
    let config = DeviceConfig::load(&config_path)?;
    let map = config.input.map()?;

    let surface = hardware::open_panel(&config.panel).context("panel startup failed")?;

    // One slot: a press arriving while a page is still refreshing is kept,
    // further presses are dropped.
    let (tx, rx) = mpsc::sync_channel::<Event>(1);

    let router = Arc::new(InputRouter::new(map));
    for action in Action::ALL {
        let tx = tx.clone();
        router.set_handler(action, move || {
            if let Err(TrySendError::Full(_)) = tx.try_send(Event::Input(action)) {
                debug!("dropping {action}, previous action still pending");
            }
        });
    }
    hardware::spawn_watchers(&config.panel.gpio_chip, &router)
        .context("button startup failed")?;

    let shutdown = tx;
    ctrlc::set_handler(move || {
        let _ = shutdown.send(Event::Shutdown);
    })
    .context("installing signal handler")?;

    let mut navigator = Navigator::new(
        surface,
        Library::new(&config.book_dir),
        Formats::default(),
        SettingsStore::new(&config.settings_path),
    );

    let code = match navigator.start() {
        Ok(()) => event_loop(&mut navigator, &rx),
        Err(e) => {
            error!("display failure: {e}");
            ExitCode::FAILURE
        }
    };

    navigator.shutdown();
    // Dropping the navigator puts the panel to sleep.
    drop(navigator);
    info!("stopped");
    Ok(code)
}

fn event_loop(
    navigator: &mut Navigator<hardware::PanelSurface>,
    rx: &mpsc::Receiver<Event>,
) -> ExitCode {
    loop {
        match rx.recv_timeout(IDLE_WAIT) {
            Ok(Event::Input(action)) => {
                debug!("handling {action}");
                if let Err(e) = navigator.handle(action) {
                    error!("display failure: {e}");
                    return ExitCode::FAILURE;
                }
            }
            Ok(Event::Shutdown) => {
                info!("interrupted, shutting down");
                return ExitCode::SUCCESS;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return ExitCode::SUCCESS,
        }
    }
}
