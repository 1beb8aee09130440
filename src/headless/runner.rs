//! Headless mode runner - drives the engine and reports it as NDJSON

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;

use startpage_app::config::{Settings, TransportKind};
use startpage_app::{Engine, EngineEvent, Message};
use startpage_channel::Transport;
use startpage_core::prelude::*;

use super::actions::read_actions_blocking;
use super::{EventSink, HeadlessEvent};

/// Capacity of the local action queue
const ACTION_CHANNEL_CAPACITY: usize = 64;

/// Run the start page against its host until either side ends the session.
///
/// User actions come from `actions` when given. Otherwise a tcp run reads
/// them from stdin and a stdio run has none.
pub async fn run_headless(settings: &Settings, actions: Option<&Path>) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("Start page starting in HEADLESS mode");
    info!("Transport: {}", settings.transport.kind);
    info!("Flow: {}", settings.view.flow);
    info!("═══════════════════════════════════════════════════════");

    let sink = EventSink::for_transport(settings.transport.kind);

    let transport = match settings.transport.kind {
        TransportKind::Stdio => Transport::stdio(),
        TransportKind::Tcp => match Transport::connect_tcp(&settings.transport.addr).await {
            Ok(transport) => transport,
            Err(e) => {
                HeadlessEvent::error(e.to_string(), true).emit(sink);
                return Err(e);
            }
        },
    };

    let engine = Engine::new(settings, transport);
    let events = engine.subscribe();

    let (action_tx, action_rx) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
    spawn_action_reader(settings.transport.kind, actions, action_tx)?;

    tokio::join!(engine.run(action_rx), forward_events(events, sink));

    info!("Start page headless mode exiting");
    Ok(())
}

/// Start the thread feeding user actions, if this run has a source for them
fn spawn_action_reader(
    kind: TransportKind,
    actions: Option<&Path>,
    tx: mpsc::Sender<Message>,
) -> Result<()> {
    match (actions, kind) {
        (Some(path), _) => {
            let file = File::open(path).map_err(|e| {
                Error::config(format!("cannot open actions file {}: {}", path.display(), e))
            })?;
            info!("Replaying actions from {}", path.display());
            std::thread::spawn(move || {
                read_actions_blocking(BufReader::new(file), tx, false);
            });
        }
        (None, TransportKind::Tcp) => {
            info!("Reading actions from stdin");
            std::thread::spawn(move || {
                read_actions_blocking(std::io::stdin().lock(), tx, true);
            });
        }
        (None, TransportKind::Stdio) => {
            debug!("No action source; serving the host only");
        }
    }
    Ok(())
}

/// Write engine events until the engine shuts down
async fn forward_events(mut events: broadcast::Receiver<EngineEvent>, sink: EventSink) {
    loop {
        match events.recv().await {
            Ok(event) => {
                HeadlessEvent::from(&event).emit(sink);
                if event == EngineEvent::Shutdown {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Headless output fell behind; {} event(s) skipped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
