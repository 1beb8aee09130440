//! Mock host for integration testing
//!
//! Plays the host side of the NDJSON protocol over a real TCP socket. It
//! keeps the persisted show-again setting, answers requests for it (echoing
//! the request id when there is one), and records every line the view sends.
//!
//! The host stops once the view closes its write half, which happens after
//! the view unmounts and its outbox drains.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use startpage_channel::test_utils::kinds_of;

/// What the host saw during one session
#[derive(Debug)]
pub struct HostLog {
    /// Raw lines from the view, in arrival order
    pub received: Vec<String>,
    /// Persisted setting when the view left
    pub show_again: bool,
}

impl HostLog {
    pub fn kinds(&self) -> Vec<String> {
        kinds_of(&self.received)
    }
}

/// Scripted host listening on a loopback port
pub struct MockHost {
    listener: TcpListener,
    show_again: bool,
    pushes: Vec<String>,
}

impl MockHost {
    /// Bind to a free port. Returns the host and the address to dial.
    pub async fn bind(show_again: bool) -> (Self, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (
            Self {
                listener,
                show_again,
                pushes: Vec::new(),
            },
            addr,
        )
    }

    /// Write `line` to the view as soon as it connects
    pub fn with_push(mut self, line: impl Into<String>) -> Self {
        self.pushes.push(line.into());
        self
    }

    /// Serve one view connection to completion
    pub async fn serve(self) -> HostLog {
        let (stream, _) = self.listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();

        for line in &self.pushes {
            writer
                .write_all(format!("{}\n", line).as_bytes())
                .await
                .unwrap();
        }

        let mut log = HostLog {
            received: Vec::new(),
            show_again: self.show_again,
        };
        let mut lines = BufReader::new(reader).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let value: Value = serde_json::from_str(&line).unwrap();
            match value["kind"].as_str() {
                Some("RequestShowAgainSetting") => {
                    let mut reply = json!({
                        "kind": "SendSetting",
                        "payload": { "showAgainSetting": log.show_again },
                    });
                    if let Some(id) = value.get("id") {
                        reply["id"] = id.clone();
                    }
                    // The view may already be gone.
                    let _ = writer.write_all(format!("{}\n", reply).as_bytes()).await;
                }
                Some("update_settings") => {
                    log.show_again = value["payload"].as_bool().unwrap();
                }
                _ => {}
            }
            log.received.push(line);
        }

        log
    }
}
