use std::time::Duration;

/// How the background listener treats incoming bytes.
///
/// Chosen once per connection; it cannot change while the session is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListenMode {
    /// Replies are decoded into [`Message`](crystalline_protocol::Message)s and queued.
    #[default]
    Structured,
    /// Incoming lines are copied verbatim to standard output, each followed by a `> ` prompt.
    Raw,
}

impl ListenMode {
    /// Returns the mode name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "Structured",
            Self::Raw => "Raw",
        }
    }
}

/// Configuration for [`SeedLinkClient`](crate::SeedLinkClient) connections.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Timeout for the initial TCP connection. Default: 10 seconds.
    pub connect_timeout: Duration,
    /// Listener mode. Default: [`ListenMode::Structured`].
    pub mode: ListenMode,
    /// Capacity of the decoded-message queue. Default: 16, minimum 1.
    ///
    /// A full queue stalls the listener until the consumer catches up; while it
    /// is stalled, [`send()`](crate::SeedLinkClient::send) fails with
    /// [`ClientError::QueueFull`](crate::ClientError::QueueFull) instead of waiting.
    pub queue_capacity: usize,
    /// Agent string sent with USERAGENT by
    /// [`setup_connection()`](crate::SeedLinkClient::setup_connection). Default: `None`.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            mode: ListenMode::Structured,
            queue_capacity: 16,
            user_agent: None,
        }
    }
}
