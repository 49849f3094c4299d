use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub struct MockConfig {
    pub hello_line1: String,
    pub hello_line2: String,
    pub accept_useragent: bool,
    /// Verbatim replies (terminators included) keyed by upper-case command keyword.
    /// Checked before the built-in behavior.
    pub replies: Vec<(String, String)>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            hello_line1: "SeisComP SeedLink v3 (2024.020)".to_owned(),
            hello_line2: "Mock Institution".to_owned(),
            accept_useragent: true,
            replies: Vec::new(),
        }
    }
}

impl MockConfig {
    pub fn with_reply(mut self, keyword: &str, reply: &str) -> Self {
        self.replies.push((keyword.to_owned(), reply.to_owned()));
        self
    }
}

pub struct MockServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    pub async fn start(config: MockConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = received.clone();
        tokio::spawn(async move {
            Self::handle_connection(listener, config, log).await;
        });

        Self { addr, received }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Raw lines received so far, terminators included.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    async fn handle_connection(
        listener: TcpListener,
        config: MockConfig,
        received: Arc<Mutex<Vec<String>>>,
    ) {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();

        loop {
            line.clear();
            let n = match reader.read_line(&mut line).await {
                Ok(n) => n,
                Err(_) => break,
            };
            if n == 0 {
                break;
            }
            received.lock().unwrap().push(line.clone());

            let trimmed = line.trim().to_uppercase();
            let keyword = trimmed.split_whitespace().next().unwrap_or("").to_owned();

            let reply = if let Some((_, reply)) = config.replies.iter().find(|(k, _)| *k == keyword)
            {
                reply.clone()
            } else {
                match keyword.as_str() {
                    "HELLO" => format!("{}\r\n{}\r\n", config.hello_line1, config.hello_line2),
                    "USERAGENT" if config.accept_useragent => "OK\r\n".to_owned(),
                    "USERAGENT" => "ERROR UNSUPPORTED command not supported\r\n".to_owned(),
                    "STATION" | "SELECT" | "DATA" | "TIME" | "SLPROTO" => "OK\r\n".to_owned(),
                    "BYE" => {
                        let _ = write_half.shutdown().await;
                        break;
                    }
                    "" => continue,
                    _ => "ERROR UNSUPPORTED unknown command\r\n".to_owned(),
                }
            };

            if write_half.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
            let _ = write_half.flush().await;
        }
    }
}
