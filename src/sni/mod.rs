//! StatusNotifierItem tray backend.
//!
//! When the `tray-sni` feature is enabled, [`backend::SniBackend`] registers
//! one item per tray on the session bus via ksni, which runs the D-Bus
//! service on its own thread.

#[cfg(feature = "tray-sni")]
pub mod backend;
#[cfg(feature = "tray-sni")]
pub mod item;
