//! Replays scripted server conversations through a real TCP session.
//!
//! Each vector lists the commands the client sends, the exact bytes the
//! server answers with, and the message the client should decode.

use std::path::PathBuf;

use crystalline_client::{ClientError, Command, ErrorType, Message, SeedLinkClient};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Deserialize)]
struct Conversation {
    name: String,
    exchanges: Vec<Exchange>,
}

#[derive(Deserialize)]
struct Exchange {
    command: String,
    data: Option<String>,
    reply: String,
    expect: Expected,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Expected {
    Hello {
        client_name: String,
        institution: String,
    },
    Ok,
    Error {
        error_type: String,
        message: String,
    },
    Invalid,
}

fn load_conversations() -> Vec<Conversation> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/vectors/conversations.json");
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"));
    serde_json::from_str(&data).unwrap()
}

/// Answer the n-th received line with the n-th scripted reply; return what was received.
async fn scripted_server(listener: TcpListener, replies: Vec<String>) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    let mut received = Vec::new();

    for reply in replies {
        let mut line = String::new();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            break;
        }
        received.push(line);
        write.write_all(reply.as_bytes()).await.unwrap();
        write.flush().await.unwrap();
    }
    received
}

#[tokio::test]
async fn verify_conversations() {
    for conv in load_conversations() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let replies = conv.exchanges.iter().map(|e| e.reply.clone()).collect();
        let server = tokio::spawn(scripted_server(listener, replies));

        let mut client = SeedLinkClient::connect(&addr.to_string()).await.unwrap();

        for (i, exchange) in conv.exchanges.iter().enumerate() {
            let command: Command = exchange.command.parse().unwrap();
            client
                .send(command, exchange.data.as_deref())
                .await
                .unwrap_or_else(|e| panic!("{}: send {i} failed: {e}", conv.name));

            let decoded = client.next_message().await;
            match &exchange.expect {
                Expected::Hello {
                    client_name,
                    institution,
                } => assert_eq!(
                    decoded.unwrap(),
                    Some(Message::Hello {
                        client_name: client_name.clone(),
                        institution: institution.clone(),
                    }),
                    "{}: exchange {i}",
                    conv.name
                ),
                Expected::Ok => {
                    assert_eq!(decoded.unwrap(), Some(Message::Ok), "{}: exchange {i}", conv.name)
                }
                Expected::Error {
                    error_type,
                    message,
                } => {
                    let error_type: ErrorType = error_type.parse().unwrap();
                    assert_eq!(
                        decoded.unwrap(),
                        Some(Message::Error {
                            error_type,
                            message: message.clone(),
                        }),
                        "{}: exchange {i}",
                        conv.name
                    );
                }
                Expected::Invalid => assert!(
                    matches!(decoded, Err(ClientError::Protocol(_))),
                    "{}: exchange {i} should fail to decode",
                    conv.name
                ),
            }
            assert_eq!(client.outstanding(), None, "{}: exchange {i}", conv.name);
        }

        client.disconnect().await.unwrap();

        let received = server.await.unwrap();
        assert_eq!(received.len(), conv.exchanges.len(), "{}", conv.name);
        for line in &received {
            assert!(line.ends_with("\r\n") && !line.ends_with("\r\n\r\n"), "{line:?}");
        }
    }
}
