//! SeedLink handshake vocabulary: commands, replies, and their wire grammar.
//!
//! This crate is pure text processing. Reading and writing the transport is
//! the client crate's job.

pub mod command;
pub mod error;
pub mod message;

pub use command::{CRLF, Command, format_command, terminate};
pub use error::{Result, SeedlinkError};
pub use message::{ErrorType, Message};
