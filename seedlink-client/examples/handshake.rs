//! Connect to a SeedLink server, run the handshake and print the replies.
//!
//! ```bash
//! cargo run --example handshake -p crystalline-client
//!
//! SERVER=rtserve.iris.washington.edu:18000 AGENT=crystalline/1.0 \
//!     cargo run --example handshake -p crystalline-client
//! ```

use std::time::Duration;

use crystalline_client::{ClientConfig, Message, SeedLinkClient};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

#[tokio::main]
async fn main() -> crystalline_client::Result<()> {
    let addr = env_or("SERVER", "seisrequest.iag.usp.br:18000");
    let agent = env_or("AGENT", "crystalline/1.0");

    let config = ClientConfig {
        connect_timeout: Duration::from_secs(15),
        user_agent: Some(agent),
        ..ClientConfig::default()
    };

    let mut client = SeedLinkClient::connect_with_config(&addr, config).await?;
    println!("connected to {addr}");

    client.setup_connection().await?;

    for _ in 0..2 {
        match client.next_message().await {
            Ok(Some(Message::Hello {
                client_name,
                institution,
            })) => println!("server: {client_name}\ninstitution: {institution}"),
            Ok(Some(Message::Ok)) => println!("user agent accepted"),
            Ok(Some(Message::Error {
                error_type,
                message,
            })) => println!("server error {error_type}: {message}"),
            Ok(None) => break,
            Err(e) => println!("reply failed: {e}"),
        }
    }

    client.bye().await?;
    println!("disconnected");
    Ok(())
}
