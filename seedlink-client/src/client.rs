use crystalline_protocol::{Command, Message};
use futures_core::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::dispatcher;
use crate::error::{ClientError, Result};
use crate::marker::{Outstanding, ReplyGate};
use crate::state::{ClientConfig, ListenMode};
use crate::transmitter::Transmitter;

/// Everything that exists only while a connection is open.
struct Session {
    transmitter: Transmitter,
    gate: ReplyGate,
    events: Option<mpsc::Receiver<Result<Message>>>,
    shutdown: watch::Sender<bool>,
    listener: JoinHandle<()>,
}

/// Async SeedLink client for the command/response handshake phase.
///
/// Commands go out on the caller's task; a single background listener reads
/// the replies, decodes them according to the command that is outstanding, and
/// queues them for [`next_message()`](Self::next_message).
///
/// # Example
///
/// ```no_run
/// # async fn example() -> crystalline_client::Result<()> {
/// use crystalline_client::{Command, Message, SeedLinkClient};
///
/// let mut client = SeedLinkClient::connect("seisrequest.iag.usp.br:18000").await?;
/// client.send(Command::Hello, None).await?;
///
/// if let Some(Message::Hello { client_name, institution }) = client.next_message().await? {
///     println!("connected to {client_name}, run by {institution}");
/// }
///
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct SeedLinkClient {
    addr: String,
    config: ClientConfig,
    session: Option<Session>,
}

impl SeedLinkClient {
    /// Connect to a SeedLink server with default configuration.
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_config(addr, ClientConfig::default()).await
    }

    /// Connect to a SeedLink server with custom [`ClientConfig`].
    ///
    /// Opens the TCP connection and starts the listener in `config.mode`.
    /// Nothing is sent; see [`setup_connection()`](Self::setup_connection).
    pub async fn connect_with_config(addr: &str, config: ClientConfig) -> Result<Self> {
        info!(addr, "connecting");
        let (reader, writer) = Connection::connect(addr, config.connect_timeout)
            .await?
            .into_split();

        let gate = ReplyGate::new();
        let (events_tx, events_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = dispatcher::spawn(config.mode, reader, gate.clone(), events_tx, shutdown_rx);
        let transmitter = Transmitter::new(
            writer,
            gate.clone(),
            config.mode == ListenMode::Structured,
        );

        info!(addr, mode = config.mode.as_str(), "connected");

        Ok(Self {
            addr: addr.to_owned(),
            config,
            session: Some(Session {
                transmitter,
                gate,
                events: Some(events_rx),
                shutdown: shutdown_tx,
                listener,
            }),
        })
    }

    // -- Accessors --

    /// Returns the address this client was connected to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Returns the configuration used for this connection.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the listener mode chosen at connect time.
    pub fn mode(&self) -> ListenMode {
        self.config.mode
    }

    /// Whether [`disconnect()`](Self::disconnect) has not yet been called.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// The command whose reply has not been handled yet, if any.
    pub fn outstanding(&self) -> Option<Command> {
        match self.session.as_ref()?.gate.current() {
            Outstanding::Awaiting(command) | Outstanding::Stalled(command) => Some(command),
            Outstanding::Idle | Outstanding::Closed => None,
        }
    }

    // -- Sending --

    /// Send `command` with an optional argument and expect a reply to it.
    ///
    /// In structured mode this first waits until the previous reply has been
    /// decoded, so at most one reply is ever outstanding. Fails with
    /// [`ClientError::Disconnected`] if the listener has stopped, and with
    /// [`ClientError::QueueFull`] if the previous reply is waiting for room in
    /// the message queue; read pending messages and send again.
    ///
    /// Commands that start binary streaming (END, FETCH) or close the session
    /// (BYE) get no text reply; send those with [`send_raw()`](Self::send_raw).
    pub async fn send(&mut self, command: Command, data: Option<&str>) -> Result<()> {
        self.session_mut()?.transmitter.send(command, data).await
    }

    /// Send a line verbatim (CRLF appended if missing) without expecting a reply.
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.session_mut()?.transmitter.send_raw(text).await
    }

    /// Send HELLO, then USERAGENT if [`ClientConfig::user_agent`] is set.
    ///
    /// The first send error is returned as [`ClientError::Setup`], naming the
    /// command that failed. Replies arrive through the message queue.
    pub async fn setup_connection(&mut self) -> Result<()> {
        self.session_mut()?;

        self.send(Command::Hello, None)
            .await
            .map_err(|e| ClientError::setup(Command::Hello, e))?;

        if let Some(agent) = self.config.user_agent.clone() {
            self.send(Command::UserAgent, Some(&agent))
                .await
                .map_err(|e| ClientError::setup(Command::UserAgent, e))?;
        }
        Ok(())
    }

    /// Send BYE and close the connection.
    pub async fn bye(&mut self) -> Result<()> {
        self.send_raw(Command::Bye.as_str()).await?;
        self.disconnect().await
    }

    // -- Receiving --

    /// Wait for the next decoded reply.
    ///
    /// Returns `Ok(Some(msg))` for a reply, `Err` if the reply could not be
    /// decoded or the transport failed, and `Ok(None)` once the queue is closed
    /// or has been taken with [`take_messages()`](Self::take_messages).
    /// In raw mode the queue is closed from the start.
    pub async fn next_message(&mut self) -> Result<Option<Message>> {
        let session = self.session_mut()?;
        let Some(events) = session.events.as_mut() else {
            return Ok(None);
        };
        events.recv().await.transpose()
    }

    /// Detach the message queue as a [`Stream`], e.g. to consume it on another task.
    ///
    /// Returns `None` if not connected or already taken.
    pub fn take_messages(&mut self) -> Option<impl Stream<Item = Result<Message>> + use<>> {
        let events = self.session.as_mut()?.events.take()?;
        Some(crate::stream::message_stream(events))
    }

    // -- Teardown --

    /// Stop the listener and close the connection.
    ///
    /// Idempotent: calling it on a disconnected client succeeds and does nothing.
    pub async fn disconnect(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        info!(addr = %self.addr, "disconnecting");
        session.shutdown.send_replace(true);
        if let Err(e) = session.transmitter.shutdown().await {
            debug!(error = %e, "socket shutdown failed");
        }
        if let Err(e) = session.listener.await {
            warn!(error = %e, "listener task failed");
        }

        info!(addr = %self.addr, "disconnected");
        Ok(())
    }

    // -- Private helpers --

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(ClientError::NotConnected)
    }
}
