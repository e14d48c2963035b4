//! Core traits that decouple multitray from any specific tray protocol or
//! transport mechanism.
//!
//! Every concrete backend (StatusNotifierItem via ksni, a named-pipe reader,
//! a test harness, …) implements one of these traits.  The
//! [`TrayRegistry`](crate::registry::TrayRegistry) only depends on these
//! abstractions.

use crate::command::Command;
use std::path::Path;
use std::sync::mpsc;

/// A factory for live tray icons.
///
/// An implementation might spawn StatusNotifierItems on the session bus, or
/// it might be a recording stub used in tests.
pub trait TrayBackend {
    /// The widget type this backend produces.
    type Widget: TrayWidget;

    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Create a new platform tray icon registered under `name`.
    ///
    /// The new icon starts visible, with no image and no tooltip.
    fn create(&mut self, name: &str) -> Result<Self::Widget, Self::Error>;
}

/// One live tray icon.
///
/// All methods are called from the thread that owns the
/// [`TrayRegistry`](crate::registry::TrayRegistry); implementations marshal
/// to their own service internally if they need to.
pub trait TrayWidget {
    /// The error type produced by this widget.
    type Error: std::error::Error + Send + 'static;

    /// Load the image file at `path` and use it as the icon.
    ///
    /// On error the previously shown icon must remain in place.
    fn set_icon(&mut self, path: &Path) -> Result<(), Self::Error>;

    /// Show a blank icon, keeping the most recently loaded image around.
    ///
    /// Used for the dark phase of blinking.
    fn clear_icon(&mut self);

    /// Show the most recently loaded image again after [`clear_icon`].
    ///
    /// A no-op if no image has been loaded.
    ///
    /// [`clear_icon`]: TrayWidget::clear_icon
    fn restore_icon(&mut self);

    /// Set the hover tooltip text.
    fn set_tooltip(&mut self, text: &str);

    /// Show or hide the icon without destroying it.
    fn set_visible(&mut self, visible: bool);

    /// Destroy the platform icon.
    fn destroy(self);
}

//  Command Source 

/// A source of [`Command`]s.
///
/// Implementations listen on some transport — a named pipe, an in-memory
/// channel, a test harness, … — and forward parsed commands into the
/// provided [`mpsc::Sender`].
///
/// The trait is deliberately transport-agnostic: the registry does not know
/// (or care) whether commands come from a FIFO, a script, or a test harness.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
