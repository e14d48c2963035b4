//! **multitray** — drive multiple system tray icons from a named pipe.
//!
//! Shell scripts write one-line commands (`<name> <verb> [params...]`) to a
//! FIFO on disk; the daemon keeps one StatusNotifierItem per name.  Trays
//! are created the first time a name is referenced and live until a
//! `remove` command (or daemon shutdown) destroys them.
//!
//! # Architecture
//!
//! The crate is organised around three core traits:
//!
//! * [`traits::CommandSource`] — abstracts the transport that delivers
//!   commands (a named pipe, a test harness, …) so the main loop is not
//!   coupled to any specific IPC mechanism.
//! * [`traits::TrayBackend`] / [`traits::TrayWidget`] — abstract tray
//!   creation and mutation so the registry logic is not coupled to any
//!   specific tray protocol.
//!
//! Concrete implementations live in [`ipc`] (named-pipe command source) and
//! [`sni`] (StatusNotifierItem backend via ksni).

pub mod command;
pub mod config;
pub mod ipc;
pub mod registry;
pub mod sni;
pub mod traits;
