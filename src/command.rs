//! Commands and types used throughout multitray.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] pairs a tray name with the [`Action`] to apply to it, and
//! [`Command::parse`] turns one line of pipe input into a command or a
//! [`ParseError`].
//!
//! # Wire format
//!
//! Every message is a single line of plain text followed by `\n`:
//!
//! ```text
//! <NAME> <VERB> [PARAMS...]
//! ```
//!
//! The line is split on whitespace.  `NAME` and `VERB` are single tokens;
//! everything after the verb is re-joined with single spaces into one
//! parameter string, so interior runs of whitespace collapse.

use std::fmt;
use std::path::PathBuf;

/// What to do with a tray icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load the image file at the given path and use it as the icon.
    ///
    /// If the file cannot be read or decoded the tray keeps its previous
    /// icon.
    SetIcon(PathBuf),

    /// Set the hover tooltip text.  May be empty.
    SetTooltip(String),

    /// Make the icon visible.
    Show,

    /// Hide the icon without destroying it.  Icon and tooltip are kept.
    Hide,

    /// Destroy the icon and forget the tray.  A no-op for unknown names.
    Remove,

    /// Alternate the icon between blank and the configured image at the
    /// blink interval.  Requires an icon to have been set.
    Blink,

    /// Stop blinking and restore the configured image.
    Unblink,
}

impl Action {
    /// The verb token that produces this action on the wire.
    pub fn verb(&self) -> &'static str {
        match self {
            Action::SetIcon(_) => "set-icon",
            Action::SetTooltip(_) => "set-tooltip",
            Action::Show => "show",
            Action::Hide => "hide",
            Action::Remove => "remove",
            Action::Blink => "blink",
            Action::Unblink => "unblink",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb())
    }
}

/// One parsed line of pipe input: a tray name plus the action to apply.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the
/// [`TrayRegistry`](crate::registry::TrayRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Name of the tray the action targets (first token of the line).
    pub tray: String,
    /// The action to apply to it.
    pub action: Action,
}

/// Why a line of pipe input could not be turned into a [`Command`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The line contained no tokens at all.
    #[error("empty line")]
    Empty,
    /// The line had a tray name but no verb.
    #[error("missing verb after tray name {0:?}")]
    MissingVerb(String),
    /// The verb is not one of the known verbs.
    #[error("unknown verb {0:?}")]
    UnknownVerb(String),
    /// The verb requires a parameter and none was given.
    #[error("verb {0:?} requires a parameter")]
    MissingParam(&'static str),
}

impl Command {
    /// Parse one line of pipe input.
    ///
    /// The first token is the tray name, the second the verb, and the rest
    /// is re-joined with single spaces as the parameter.  Verbs that take no
    /// parameter ignore trailing tokens.  Validation happens here, before
    /// any registry lookup, so a malformed line never creates a tray.
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let mut tokens = line.split_whitespace();
        let tray = tokens.next().ok_or(ParseError::Empty)?;
        let verb = tokens
            .next()
            .ok_or_else(|| ParseError::MissingVerb(tray.to_string()))?;
        let params = tokens.collect::<Vec<_>>().join(" ");

        let action = match verb {
            "set-icon" => {
                if params.is_empty() {
                    return Err(ParseError::MissingParam("set-icon"));
                }
                Action::SetIcon(PathBuf::from(params))
            }
            "set-tooltip" => Action::SetTooltip(params),
            "show" => Action::Show,
            "hide" => Action::Hide,
            "remove" => Action::Remove,
            "blink" => Action::Blink,
            "unblink" => Action::Unblink,
            _ => return Err(ParseError::UnknownVerb(verb.to_string())),
        };

        Ok(Command {
            tray: tray.to_string(),
            action,
        })
    }
}
