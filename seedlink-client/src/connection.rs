use std::time::Duration;

use tokio::io::{BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::debug;

use crate::error::{ClientError, Result};

/// A freshly dialed TCP connection, not yet split between the two session sides.
pub(crate) struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl Connection {
    pub async fn connect(addr: &str, connect_timeout: Duration) -> Result<Self> {
        validate_addr(addr)?;

        debug!(addr, "TCP connecting");
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout(connect_timeout))?
            .map_err(|source| ClientError::Connect {
                addr: addr.to_owned(),
                source,
            })?;

        stream.set_nodelay(true).ok();

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Hand the read side to the listener and the write side to the transmitter.
    pub fn into_split(self) -> (BufReader<OwnedReadHalf>, BufWriter<OwnedWriteHalf>) {
        (self.reader, self.writer)
    }
}

/// Check that `addr` looks like `host:port` before dialing.
fn validate_addr(addr: &str) -> Result<()> {
    let valid = match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ClientError::InvalidAddress(addr.to_owned()))
    }
}
