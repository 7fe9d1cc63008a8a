//! Debounced button input
//!
//! Nine GPIO lines map 1:1 onto the nine [`Action`]s. Edge delivery happens
//! on watcher threads, so [`InputRouter`] is `Send + Sync`: it keeps the
//! per-line debounce state behind a mutex and serializes handler calls
//! behind a dispatch lock, so at most one handler runs at a time.
//!
//! ## Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use lume::{Action, InputMap, InputRouter};
//!
//! let map = InputMap::new([5, 6, 13, 19, 26, 21, 20, 16, 12]).unwrap();
//! let router = InputRouter::new(map);
//! let presses = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&presses);
//! router.set_handler(Action::Down, move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let t0 = Instant::now();
//! assert_eq!(router.on_edge(6, t0), Some(Action::Down));
//! assert_eq!(router.on_edge(6, t0 + Duration::from_millis(50)), None);
//! assert_eq!(presses.load(Ordering::SeqCst), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, trace};

/// Minimum spacing between two accepted edges on the same line
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Symbolic user action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Joystick up
    Up,
    /// Joystick down
    Down,
    /// Joystick left
    Left,
    /// Joystick right
    Right,
    /// Joystick press
    Select,
    /// Return to the book list
    Menu,
    /// Return to the book list
    Back,
    /// Save the current page
    Bookmark,
    /// Reserved
    Settings,
}

impl Action {
    /// Every action, in input-map order
    pub const ALL: [Action; 9] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Select,
        Action::Menu,
        Action::Back,
        Action::Bookmark,
        Action::Settings,
    ];

    /// Lower-case name, as used in configuration files and logs
    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::Select => "select",
            Action::Menu => "menu",
            Action::Back => "back",
            Action::Bookmark => "bookmark",
            Action::Settings => "settings",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two actions were assigned the same GPIO line
#[derive(Debug, thiserror::Error)]
#[error("GPIO line {line} assigned to both {first} and {second}")]
pub struct InputMapError {
    /// Offending line offset
    pub line: u32,
    /// First action using the line
    pub first: Action,
    /// Second action using the line
    pub second: Action,
}

/// Fixed 1:1 table from GPIO line offset to action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputMap {
    lines: [(u32, Action); 9],
}

impl InputMap {
    /// Build the table from nine line offsets, given in [`Action::ALL`] order
    ///
    /// # Errors
    ///
    /// Returns [`InputMapError`] if a line offset appears twice.
    pub fn new(lines: [u32; 9]) -> Result<Self, InputMapError> {
        for (i, &line) in lines.iter().enumerate() {
            if let Some(j) = lines[..i].iter().position(|&other| other == line) {
                return Err(InputMapError {
                    line,
                    first: Action::ALL[j],
                    second: Action::ALL[i],
                });
            }
        }
        let mut table = [(0, Action::Up); 9];
        for (slot, (line, action)) in table.iter_mut().zip(lines.into_iter().zip(Action::ALL)) {
            *slot = (line, action);
        }
        Ok(Self { lines: table })
    }

    /// Action bound to `line`, if any
    pub fn action(&self, line: u32) -> Option<Action> {
        self.lines
            .iter()
            .find(|(offset, _)| *offset == line)
            .map(|(_, action)| *action)
    }

    /// Every `(line, action)` pair
    pub fn iter(&self) -> impl Iterator<Item = (u32, Action)> + '_ {
        self.lines.iter().copied()
    }
}

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Debounces edges and dispatches the bound handler
pub struct InputRouter {
    map: InputMap,
    window: Duration,
    last_accepted: Mutex<HashMap<u32, Instant>>,
    handlers: Mutex<HashMap<Action, Handler>>,
    dispatch: Mutex<()>,
}

impl InputRouter {
    /// Create a router with the default [`DEBOUNCE_WINDOW`]
    pub fn new(map: InputMap) -> Self {
        Self::with_window(map, DEBOUNCE_WINDOW)
    }

    /// Create a router with a custom debounce window
    pub fn with_window(map: InputMap, window: Duration) -> Self {
        Self {
            map,
            window,
            last_accepted: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
            dispatch: Mutex::new(()),
        }
    }

    /// Line table in use
    pub fn map(&self) -> &InputMap {
        &self.map
    }

    /// Bind `handler` to `action`, replacing any previous binding
    pub fn set_handler<F>(&self, action: Action, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(action, Arc::new(handler));
    }

    /// Process one falling edge on `line` observed at `at`
    ///
    /// Returns the action that was dispatched, or `None` if the edge was
    /// debounced or the line is not mapped. Unbound actions are still
    /// reported but invoke nothing.
    pub fn on_edge(&self, line: u32, at: Instant) -> Option<Action> {
        let Some(action) = self.map.action(line) else {
            trace!("edge on unmapped line {line}");
            return None;
        };

        {
            let mut last = self
                .last_accepted
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let bouncing = last
                .get(&line)
                .is_some_and(|prev| at.saturating_duration_since(*prev) < self.window);
            if bouncing {
                debug!("debounced {action} on line {line}");
                return None;
            }
            last.insert(line, at);
        }

        let handler = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&action)
            .cloned();

        let _serial = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        match handler {
            Some(handler) => handler(),
            None => trace!("no handler for {action}"),
        }
        Some(action)
    }
}
