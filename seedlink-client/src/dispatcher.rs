//! Background listener: the only reader of the transport.

use crystalline_protocol::Message;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::codec;
use crate::error::Result;
use crate::marker::ReplyGate;
use crate::state::ListenMode;

/// Printed after every relayed line in raw mode.
pub(crate) const PROMPT: &[u8] = b"> ";

/// Start the listener task for `mode`.
///
/// In raw mode the event sender is dropped straight away, so the message queue
/// reads as closed.
pub(crate) fn spawn<R>(
    mode: ListenMode,
    reader: R,
    gate: ReplyGate,
    events: mpsc::Sender<Result<Message>>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    debug!(mode = mode.as_str(), "starting listener");
    match mode {
        ListenMode::Structured => tokio::spawn(run_structured(reader, gate, events, shutdown)),
        ListenMode::Raw => {
            drop(events);
            tokio::spawn(run_raw(reader, tokio::io::stdout(), shutdown))
        }
    }
}

/// Decode one reply per armed command and queue it.
///
/// A reply that fails to decode is queued as an error and the gate is cleared
/// anyway, so later exchanges stay in step. Transport failure ends the loop and
/// closes the gate. The gate is settled before the reply is queued; while the
/// queue is full it reads [`Stalled`](crate::marker::Outstanding::Stalled).
pub(crate) async fn run_structured<R>(
    mut reader: R,
    gate: ReplyGate,
    events: mpsc::Sender<Result<Message>>,
    mut shutdown: watch::Receiver<bool>,
) where
    R: AsyncBufRead + Unpin,
{
    loop {
        if *shutdown.borrow() {
            break;
        }

        let command = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            armed = gate.wait_armed() => match armed {
                Some(command) => command,
                None => break,
            },
        };

        let decoded = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            result = codec::decode_reply(&mut reader, command) => result,
        };

        let fatal = match &decoded {
            Ok(msg) => {
                trace!(%command, ?msg, "reply decoded");
                false
            }
            Err(e) if e.is_transport() => {
                warn!(%command, error = %e, "transport failed while awaiting reply");
                true
            }
            Err(e) => {
                warn!(%command, error = %e, "failed to decode reply");
                false
            }
        };

        let permit = match events.try_reserve() {
            Ok(permit) => Some(permit),
            Err(TrySendError::Full(())) => {
                debug!(%command, "message queue full, waiting for the consumer");
                gate.stall();
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    reserved = events.reserve() => reserved.ok(),
                }
            }
            Err(TrySendError::Closed(())) => None,
        };

        // The gate settles before the reply becomes visible to the consumer.
        if fatal {
            gate.close();
        } else {
            gate.clear();
        }
        match permit {
            Some(permit) => permit.send(decoded),
            None => trace!(%command, "message queue closed, reply dropped"),
        }

        if fatal {
            break;
        }
    }

    gate.close();
    debug!("structured listener stopped");
}

/// Copy incoming lines to `out` verbatim, prompting after each.
pub(crate) async fn run_raw<R, W>(mut reader: R, mut out: W, mut shutdown: watch::Receiver<bool>)
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        if *shutdown.borrow() {
            break;
        }

        buf.clear();
        let n = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            result = reader.read_until(b'\n', &mut buf) => match result {
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "read failed");
                    break;
                }
            },
        };
        if n == 0 {
            debug!("server closed connection");
            break;
        }

        trace!(line = %String::from_utf8_lossy(&buf).trim_end(), "raw line");
        if let Err(e) = relay(&mut out, &buf).await {
            warn!(error = %e, "failed to write to output");
            break;
        }
    }

    debug!("raw listener stopped");
}

async fn relay<W: AsyncWrite + Unpin>(out: &mut W, line: &[u8]) -> std::io::Result<()> {
    out.write_all(line).await?;
    out.write_all(PROMPT).await?;
    out.flush().await
}
