//! Engine - drives the view from transport events and user input
//!
//! The Engine owns the PostOffice, the ViewController and the transport's
//! inbound queue. Every event is processed to completion before the next one
//! is taken, on a single thread.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use startpage_channel::{Delivery, PostOffice, Transport};
use startpage_core::prelude::*;
use startpage_core::TransportEvent;

use crate::config::Settings;
use crate::controller::ViewController;
use crate::engine_event::EngineEvent;
use crate::message::Message;
use crate::state::{ViewSnapshot, ViewState};

/// Capacity of the engine event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Orchestration engine for one mounted view
pub struct Engine {
    post_office: PostOffice,
    controller: Rc<RefCell<ViewController>>,
    transport_events: mpsc::Receiver<TransportEvent>,
    /// Transport writer; awaited on shutdown so queued lines reach the host
    writer: Option<JoinHandle<()>>,
    event_tx: broadcast::Sender<EngineEvent>,
    /// Last snapshot broadcast in a StateChanged event
    last_snapshot: ViewSnapshot,
    mounted: bool,
    shut_down: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("post_office", &self.post_office)
            .field("last_snapshot", &self.last_snapshot)
            .field("mounted", &self.mounted)
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

impl Engine {
    /// Create an engine over `transport`. The view is not mounted yet.
    pub fn new(settings: &Settings, transport: Transport) -> Self {
        let (line_tx, transport_events, writer) = transport.into_parts();
        let post_office = PostOffice::new(line_tx, settings.protocol.correlate_requests);

        let state = ViewState::new(settings.view.flow, settings.view.tab_count);
        let last_snapshot = state.snapshot();
        let controller = Rc::new(RefCell::new(ViewController::new(
            state,
            post_office.outbox(),
        )));

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            post_office,
            controller,
            transport_events,
            writer,
            event_tx,
            last_snapshot,
            mounted: false,
            shut_down: false,
        }
    }

    /// Subscribe to engine events.
    ///
    /// Subscribers that fall more than the channel capacity behind lose the
    /// oldest events (`RecvError::Lagged`).
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Register the view and announce it to the host. Only the first call has
    /// any effect.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        ViewController::mount(&self.controller, &mut self.post_office);
        self.emit(EngineEvent::Mounted {
            flow: self.controller.borrow().state().flow,
            correlated: self.post_office.outbox().is_correlated(),
        });
        self.emit_state_change();
    }

    /// Process one local input (user action or lifecycle message)
    pub fn process_message(&mut self, msg: Message) {
        if msg == Message::Unmount {
            self.shutdown();
            return;
        }

        let consumed = self.controller.borrow_mut().dispatch(msg);
        trace!("Local message consumed: {}", consumed);
        self.emit_state_change();
    }

    /// Process one transport event. Returns false once the host has closed.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::Line(line) => {
                if let Delivery::Dropped(reason) = self.post_office.deliver_line(&line) {
                    self.emit(EngineEvent::MessageDropped { reason });
                }
                self.emit_state_change();
                true
            }
            TransportEvent::Closed { reason } => {
                match reason {
                    Some(reason) => warn!("Host connection lost: {}", reason),
                    None => info!("Host closed the connection"),
                }
                false
            }
        }
    }

    /// Mount, then run until the host closes, the view unmounts, or the
    /// transport goes away. `input` carries local user actions; when it
    /// closes the engine keeps serving the host.
    pub async fn run(mut self, mut input: mpsc::Receiver<Message>) {
        self.mount();
        let mut input_open = true;

        loop {
            tokio::select! {
                event = self.transport_events.recv() => match event {
                    Some(event) => {
                        if !self.handle_transport_event(event) {
                            break;
                        }
                    }
                    None => {
                        info!("Transport reader finished");
                        break;
                    }
                },
                msg = input.recv(), if input_open => match msg {
                    Some(msg) => {
                        self.process_message(msg);
                        if self.should_quit() {
                            break;
                        }
                    }
                    None => {
                        debug!("Local input closed");
                        input_open = false;
                    }
                },
            }
        }

        self.shutdown();
        self.flush().await;
    }

    /// Unmount the view and announce shutdown. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        info!("Shutting down");
        ViewController::unmount(&self.controller, &mut self.post_office);
        self.emit_state_change();
        self.emit(EngineEvent::Shutdown);
    }

    /// Drop every sender and wait for the writer to finish queued lines
    async fn flush(self) {
        let Engine {
            post_office,
            controller,
            writer,
            ..
        } = self;
        drop(controller);
        drop(post_office);

        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                error!("Transport writer task failed: {}", e);
            }
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.controller.borrow().snapshot()
    }

    pub fn should_quit(&self) -> bool {
        self.shut_down || self.controller.borrow().state().is_unmounted()
    }

    fn emit_state_change(&mut self) {
        let snapshot = self.snapshot();
        if snapshot != self.last_snapshot {
            self.last_snapshot = snapshot;
            self.emit(EngineEvent::StateChanged(snapshot));
        }
    }

    /// send() only fails when nobody is subscribed, which is fine.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
