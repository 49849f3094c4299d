use crystalline_protocol::{Command, format_command, terminate};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{debug, trace};

use crate::error::{ClientError, Result};
use crate::marker::ReplyGate;

/// Write side of a session.
///
/// When replies are tracked, [`send`](Self::send) waits for the previous reply
/// to be handled before writing, then records the new command in the gate so
/// the listener knows how to decode what comes back.
pub(crate) struct Transmitter<W = OwnedWriteHalf> {
    writer: BufWriter<W>,
    gate: ReplyGate,
    track_replies: bool,
}

impl<W: AsyncWrite + Unpin> Transmitter<W> {
    pub fn new(writer: BufWriter<W>, gate: ReplyGate, track_replies: bool) -> Self {
        Self {
            writer,
            gate,
            track_replies,
        }
    }

    pub async fn send(&mut self, command: Command, data: Option<&str>) -> Result<()> {
        if self.track_replies {
            self.gate.wait_idle().await?;
        }

        debug!(%command, ?data, "sending");
        let line = format_command(command, data);
        self.write_line(&line).await?;

        if self.track_replies && !self.gate.arm(command) {
            return Err(ClientError::Disconnected);
        }
        Ok(())
    }

    /// Write `text` as one line; the listener is not told to expect a reply.
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        let line = terminate(text);
        trace!(line = line.trim_end(), "sending raw");
        self.write_line(&line).await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await.map_err(ClientError::Io)
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(ClientError::Io)?;
        self.writer.flush().await.map_err(ClientError::Io)?;
        Ok(())
    }
}
