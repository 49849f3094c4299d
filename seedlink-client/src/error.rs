use std::time::Duration;

use crystalline_protocol::Command;

/// Errors that can occur during SeedLink client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Socket write or shutdown failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reply did not match the SeedLink grammar (unknown ERROR type, stray line, ...).
    #[error("protocol error: {0}")]
    Protocol(#[from] crystalline_protocol::SeedlinkError),

    /// Address is not of the form `host:port`.
    #[error("invalid address {0:?}: expected host:port")]
    InvalidAddress(String),

    /// TCP dial failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// TCP dial exceeded the configured timeout.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Operation attempted without an open session.
    #[error("not connected")]
    NotConnected,

    /// Transport read failed while a reply was being decoded.
    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    /// Server closed the connection (before or in the middle of a reply).
    #[error("disconnected")]
    Disconnected,

    /// The previous reply cannot be queued until pending messages are read.
    #[error("message queue full: read pending messages before sending")]
    QueueFull,

    /// One step of the session setup failed.
    #[error("failed to send {command} command: {source}")]
    Setup {
        command: Command,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Whether the transport itself is gone, as opposed to a single bad reply.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Io(_) | Self::Read(_) | Self::Disconnected => true,
            Self::Setup { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    pub(crate) fn setup(command: Command, source: ClientError) -> Self {
        Self::Setup {
            command,
            source: Box::new(source),
        }
    }
}

/// Convenience alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
