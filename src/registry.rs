//! The main orchestrator that ties tray state, the platform backend, and
//! command sources together.
//!
//! [`TrayRegistry`] owns every live tray and reacts to [`Command`]s by
//! updating its bookkeeping and issuing calls through the
//! [`TrayBackend`] / [`TrayWidget`] traits.

use crate::command::{Action, Command};
use crate::traits::{TrayBackend, TrayWidget};
use log::{debug, info, warn};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Possible errors from the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The platform backend could not create a tray icon.
    #[error("backend error: {0}")]
    Backend(String),
    /// An icon image could not be loaded or applied.
    #[error("icon error: {0}")]
    Icon(String),
}

/// Mirror of the user-visible state of one tray.
///
/// The registry is the source of truth; the platform widget is only ever
/// written to, never read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayState {
    /// Path of the most recently applied icon image, if any.
    pub icon_path: Option<PathBuf>,
    /// Current tooltip text, if one was ever set.
    pub tooltip: Option<String>,
    /// Whether the icon is currently shown.
    pub visible: bool,
}

impl Default for TrayState {
    fn default() -> Self {
        // New trays come up visible, with no image and no tooltip.
        Self {
            icon_path: None,
            tooltip: None,
            visible: true,
        }
    }
}

/// Blink bookkeeping for one tray.
#[derive(Debug)]
struct BlinkState {
    /// Whether the image phase (as opposed to the blank phase) is showing.
    icon_shown: bool,
    /// When to flip to the other phase.
    next_toggle: Instant,
}

/// One live tray: its platform widget plus mirrored state.
struct TrayEntry<W> {
    widget: W,
    state: TrayState,
    blink: Option<BlinkState>,
}

impl<W> TrayEntry<W> {
    fn new(widget: W) -> Self {
        Self {
            widget,
            state: TrayState::default(),
            blink: None,
        }
    }
}

/// Orchestrates tray lifecycle and platform calls.
///
/// The registry is generic over any [`TrayBackend`] implementation, making
/// it completely independent of ksni or any other concrete tray protocol.
///
/// # Typical usage
///
/// ```ignore
/// let mut registry = TrayRegistry::new(SniBackend::new());
/// registry.handle(Command::parse("clock show")?)?;
/// registry.tick(Instant::now());
/// ```
pub struct TrayRegistry<B: TrayBackend> {
    backend: B,
    trays: HashMap<String, TrayEntry<B::Widget>>,
    blink_interval: Duration,
}

impl<B: TrayBackend> TrayRegistry<B> {
    /// Create an empty registry on top of `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            trays: HashMap::new(),
            blink_interval: Duration::from_millis(500),
        }
    }

    /// Set how long each blink phase lasts.  Only affects trays that start
    /// blinking afterwards and phase flips from the next
    /// [`tick`](TrayRegistry::tick) on.
    pub fn set_blink_interval(&mut self, interval: Duration) {
        self.blink_interval = interval;
    }

    /// Number of live trays.
    pub fn len(&self) -> usize {
        self.trays.len()
    }

    /// True when no trays are registered.
    pub fn is_empty(&self) -> bool {
        self.trays.is_empty()
    }

    /// Whether a tray named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.trays.contains_key(name)
    }

    /// The mirrored state of tray `name`, if it exists.
    pub fn state(&self, name: &str) -> Option<&TrayState> {
        self.trays.get(name).map(|e| &e.state)
    }

    /// Whether tray `name` is currently blinking.
    pub fn is_blinking(&self, name: &str) -> bool {
        self.trays.get(name).map_or(false, |e| e.blink.is_some())
    }

    /// Process a single [`Command`].
    ///
    /// Any verb other than `remove` creates the tray on first reference; a
    /// failure to create or to load an icon leaves the registry exactly as
    /// it was.  `remove` on an unknown name is a no-op.
    pub fn handle(&mut self, cmd: Command) -> Result<(), RegistryError> {
        let Command { tray: name, action } = cmd;

        if matches!(action, Action::Remove) {
            match self.trays.remove(&name) {
                Some(entry) => {
                    info!("{}: remove", name);
                    entry.widget.destroy();
                }
                None => debug!("{}: remove on unknown tray, nothing to do", name),
            }
            return Ok(());
        }

        let entry = match self.trays.entry(name.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                info!("{}: creating tray", v.key());
                let widget = self
                    .backend
                    .create(v.key())
                    .map_err(|e| RegistryError::Backend(e.to_string()))?;
                v.insert(TrayEntry::new(widget))
            }
        };

        match action {
            Action::SetIcon(path) => {
                info!("{}: set icon {}", name, path.display());
                entry
                    .widget
                    .set_icon(&path)
                    .map_err(|e| RegistryError::Icon(e.to_string()))?;
                entry.state.icon_path = Some(path);
                // A blinking tray keeps blinking; the new image becomes the
                // bright phase.
                if let Some(blink) = &mut entry.blink {
                    blink.icon_shown = true;
                }
            }

            Action::SetTooltip(text) => {
                info!("{}: set tooltip {:?}", name, text);
                entry.widget.set_tooltip(&text);
                entry.state.tooltip = Some(text);
            }

            Action::Show => {
                info!("{}: show", name);
                entry.widget.set_visible(true);
                entry.state.visible = true;
            }

            Action::Hide => {
                info!("{}: hide", name);
                entry.widget.set_visible(false);
                entry.state.visible = false;
            }

            Action::Blink => {
                if entry.state.icon_path.is_none() {
                    warn!("{}: blink requested but no icon is set", name);
                } else if entry.blink.is_none() {
                    info!("{}: blink", name);
                    entry.blink = Some(BlinkState {
                        icon_shown: true,
                        next_toggle: Instant::now() + self.blink_interval,
                    });
                }
            }

            Action::Unblink => {
                if entry.blink.take().is_some() {
                    info!("{}: unblink", name);
                    // Restore even if the blank phase was up.
                    entry.widget.restore_icon();
                }
            }

            // Removed before the lookup above.
            Action::Remove => {}
        }

        Ok(())
    }

    /// Advance blink timers.
    ///
    /// Call this periodically from the event loop.  `now` is passed in so
    /// tests can drive time explicitly.
    pub fn tick(&mut self, now: Instant) {
        for (name, entry) in &mut self.trays {
            if let Some(blink) = &mut entry.blink {
                if now >= blink.next_toggle {
                    blink.icon_shown = !blink.icon_shown;
                    blink.next_toggle = now + self.blink_interval;
                    debug!(
                        "{}: blink {}",
                        name,
                        if blink.icon_shown { "on" } else { "off" }
                    );
                    if blink.icon_shown {
                        entry.widget.restore_icon();
                    } else {
                        entry.widget.clear_icon();
                    }
                }
            }
        }
    }

    /// Destroy every remaining tray icon.
    pub fn shutdown(self) {
        for (name, entry) in self.trays {
            debug!("{}: destroying tray", name);
            entry.widget.destroy();
        }
    }
}

//  Tests 
