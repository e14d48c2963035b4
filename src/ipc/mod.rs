//! IPC source that accepts commands over a named pipe.
//!
//! External tools (shell scripts, cron jobs, etc.) can write
//! newline-delimited plain-text commands to the FIFO without linking
//! against anything.

pub mod fifo;
