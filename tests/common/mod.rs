//! Shared helpers for integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use kic::control::{Request, Response};
use kic::irq::SimulatedLine;
use kic::{KicConfig, Service};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

/// Configuration with the control socket inside `dir`.
pub fn config_in(dir: &Path, drain_timeout_secs: u64) -> KicConfig {
    let mut config = KicConfig::default();
    config.control.socket_path = dir.join("kic.sock");
    config.shutdown.drain_timeout_secs = drain_timeout_secs;
    config
}

/// Start a service on a fresh simulated line.
pub async fn start_simulated(config: &KicConfig) -> (Arc<SimulatedLine>, Service<SimulatedLine>) {
    let line = Arc::new(SimulatedLine::new());
    let service = kic::lifecycle::start(config, line.clone())
        .await
        .expect("service should start");
    (line, service)
}

/// Poll until `f` holds or a second passes.
#[allow(dead_code)]
pub async fn eventually(mut f: impl FnMut() -> bool) {
    for _ in 0..100 {
        if f() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within a second");
}

/// Minimal line-protocol client.
pub struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect(path: &Path) -> Self {
        let stream = UnixStream::connect(path).await.expect("control socket reachable");
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    pub async fn send(&mut self, request: Request) -> Response {
        let line = serde_json::to_string(&request).unwrap();
        self.send_raw(&line).await
    }

    pub async fn send_raw(&mut self, line: &str) -> Response {
        self.send_bytes(line.as_bytes()).await
    }

    /// Send arbitrary bytes followed by a newline and read one response.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> Response {
        self.writer.write_all(bytes).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        let reply = self
            .lines
            .next_line()
            .await
            .unwrap()
            .expect("service closed the channel");
        serde_json::from_str(&reply).unwrap()
    }

    /// Read the next line, or `None` once the service hung up.
    #[allow(dead_code)]
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.next_line().await.ok().flatten()
    }
}
