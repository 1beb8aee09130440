//! Headless mode - NDJSON view snapshots for hosts and test scripts
//!
//! The view has no screen of its own here. Instead every engine event is
//! written as one JSON object per line, so a host or an E2E script can follow
//! what the start page would be showing.
//!
//! # Event Format
//!
//! Each event carries an "event" field naming its type, plus a millisecond
//! timestamp.
//!
//! ```json
//! {"event":"mounted","flow":"changelog","correlated":false,"timestamp":1704700001000}
//! {"event":"state","menu_expanded":true,"active_tab":0,"tab_count":4,"show_again_setting":false,"checkbox_checked":true,"setting_confirmed":false,"phase":"ready","timestamp":1704700001002}
//! {"event":"shutdown","timestamp":1704700009000}
//! ```
//!
//! With the stdio transport stdout carries the protocol, so events go to
//! stderr. With tcp they go to stdout.

pub mod actions;
pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use startpage_app::config::TransportKind;
use startpage_app::{EngineEvent, ViewFlow, ViewSnapshot};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// The view registered and announced itself to the host
    Mounted {
        flow: ViewFlow,
        correlated: bool,
        timestamp: i64,
    },

    /// What the view currently shows
    State {
        #[serde(flatten)]
        snapshot: ViewSnapshot,
        timestamp: i64,
    },

    /// An inbound message was rejected before reaching the view
    MessageDropped { reason: String, timestamp: i64 },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    /// The view unmounted
    Shutdown { timestamp: i64 },
}

/// Where headless events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSink {
    Stdout,
    Stderr,
}

impl EventSink {
    /// Keep events off whichever stream carries the protocol
    pub fn for_transport(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Stdio => EventSink::Stderr,
            TransportKind::Tcp => EventSink::Stdout,
        }
    }
}

impl HeadlessEvent {
    /// Emit this event as one NDJSON line
    pub fn emit(&self, sink: EventSink) {
        let result = match sink {
            EventSink::Stdout => self.write_to(&mut io::stdout().lock()),
            EventSink::Stderr => self.write_to(&mut io::stderr().lock()),
        };

        if let Err(e) = result {
            error!("Failed to write headless event: {}", e);
        }
    }

    /// Serialize, write a trailing newline and flush
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let json = serde_json::to_string(self)?;
        writeln!(writer, "{}", json)?;
        writer.flush()
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn state(snapshot: ViewSnapshot) -> Self {
        Self::State {
            snapshot,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    pub fn shutdown() -> Self {
        Self::Shutdown {
            timestamp: Self::now(),
        }
    }
}

impl From<&EngineEvent> for HeadlessEvent {
    fn from(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::Mounted { flow, correlated } => HeadlessEvent::Mounted {
                flow: *flow,
                correlated: *correlated,
                timestamp: Self::now(),
            },
            EngineEvent::StateChanged(snapshot) => HeadlessEvent::state(*snapshot),
            EngineEvent::MessageDropped { reason } => HeadlessEvent::MessageDropped {
                reason: reason.to_string(),
                timestamp: Self::now(),
            },
            EngineEvent::Shutdown => HeadlessEvent::shutdown(),
        }
    }
}
