//! Async SeedLink client for the command/response handshake phase.
//!
//! Connect to a SeedLink server, send HELLO, USERAGENT and other commands, and
//! receive the replies as typed [`Message`]s, or relay the raw lines to
//! standard output for interactive use.

pub mod client;
pub mod codec;
mod connection;
mod dispatcher;
pub mod error;
pub mod marker;
#[cfg(test)]
mod mock;
pub mod state;
pub mod stream;
mod transmitter;

pub use client::SeedLinkClient;
pub use crystalline_protocol::{Command, ErrorType, Message};
pub use error::{ClientError, Result};
pub use marker::Outstanding;
pub use state::{ClientConfig, ListenMode};
