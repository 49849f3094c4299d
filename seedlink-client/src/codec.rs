//! Reply decoding over a line-buffered reader.
//!
//! The grammar itself lives in `crystalline-protocol`; this module only pulls
//! the right number of lines off the transport for the reply being awaited.

use crystalline_protocol::{Command, Message};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::{ClientError, Result};

/// Read one `\n`-terminated line, terminator included.
///
/// End of stream before the terminator is [`ClientError::Disconnected`].
pub async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    reader
        .read_until(b'\n', &mut buf)
        .await
        .map_err(ClientError::Read)?;
    if buf.last() != Some(&b'\n') {
        return Err(ClientError::Disconnected);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Decode the two-line HELLO banner.
pub async fn decode_hello<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Message> {
    let line1 = read_line(reader).await?;
    let line2 = read_line(reader).await?;
    Ok(Message::parse_hello(&line1, &line2))
}

/// Decode a single `OK` or `ERROR` line.
pub async fn decode_result<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Message> {
    let line = read_line(reader).await?;
    Ok(Message::parse_result(&line)?)
}

/// Decode the reply to `command`: HELLO gets the banner, everything else a result line.
pub async fn decode_reply<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    command: Command,
) -> Result<Message> {
    if command.has_banner_reply() {
        decode_hello(reader).await
    } else {
        decode_result(reader).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystalline_protocol::{ErrorType, SeedlinkError};

    #[tokio::test]
    async fn hello_banner() {
        let mut input: &[u8] = b"SeisComP SeedLink v3 (2024.020)\r\nInstitution X\r\n";
        let msg = decode_hello(&mut input).await.unwrap();
        assert_eq!(
            msg,
            Message::Hello {
                client_name: "SeisComP SeedLink v3 (2024.020)".into(),
                institution: "Institution X".into(),
            }
        );
        assert!(input.is_empty());
    }

    #[tokio::test]
    async fn hello_truncated() {
        let mut input: &[u8] = b"SeedLink v3.1\r\n";
        let err = decode_hello(&mut input).await.unwrap_err();
        assert!(matches!(err, ClientError::Disconnected));
    }

    #[tokio::test]
    async fn hello_partial_line() {
        let mut input: &[u8] = b"SeedLink v3.1\r\nIRIS";
        let err = decode_hello(&mut input).await.unwrap_err();
        assert!(matches!(err, ClientError::Disconnected));
    }

    #[tokio::test]
    async fn result_ok() {
        let mut input: &[u8] = b"OK\r\n";
        assert_eq!(decode_result(&mut input).await.unwrap(), Message::Ok);
    }

    #[tokio::test]
    async fn result_error() {
        let mut input: &[u8] = b"ERROR ARGUMENTS bad station code\r\n";
        assert_eq!(
            decode_result(&mut input).await.unwrap(),
            Message::Error {
                error_type: ErrorType::Arguments,
                message: "bad station code".into(),
            }
        );
    }

    #[tokio::test]
    async fn result_unknown_type_is_protocol_error() {
        let mut input: &[u8] = b"ERROR BOGUS oops\r\nOK\r\n";
        let err = decode_result(&mut input).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(SeedlinkError::UnknownErrorType(_))
        ));
        // The bad line is consumed; the next reply is intact.
        assert_eq!(decode_result(&mut input).await.unwrap(), Message::Ok);
    }

    #[tokio::test]
    async fn result_garbage_is_protocol_error() {
        let mut input: &[u8] = b"WAT\r\n";
        let err = decode_result(&mut input).await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn result_eof() {
        let mut input: &[u8] = b"";
        let err = decode_result(&mut input).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn reply_dispatch_by_command() {
        let mut input: &[u8] = b"SeedLink v3.1\r\nGFZ Potsdam\r\nOK\r\n";
        let hello = decode_reply(&mut input, Command::Hello).await.unwrap();
        assert!(matches!(hello, Message::Hello { .. }));

        let ok = decode_reply(&mut input, Command::UserAgent).await.unwrap();
        assert_eq!(ok, Message::Ok);
    }

    #[tokio::test]
    async fn reply_non_hello_reads_one_line() {
        // A banner-looking line under a non-HELLO command is a decode failure,
        // and only that one line is consumed.
        let mut input: &[u8] = b"SeedLink v3.1\r\nOK\r\n";
        assert!(decode_reply(&mut input, Command::Station).await.is_err());
        assert_eq!(
            decode_reply(&mut input, Command::Station).await.unwrap(),
            Message::Ok
        );
    }
}
