//! A server plugin which posts every executed command to a Discord webhook,
//! for auditing what players and the console run

#![warn(
    clippy::doc_markdown,
    clippy::tabs_in_doc_comments,
    missing_debug_implementations,
    clippy::unwrap_used
)]

pub mod config;
pub mod console;
pub mod dispatch;
mod errors;
pub mod event;
pub mod format;
pub mod host;
pub mod listener;
pub mod plugin;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
pub use event::{CommandEvent, CommandKind, Sender};
pub use plugin::CommandLogger;
