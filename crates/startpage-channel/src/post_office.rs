//! Handler registry and inbound fan-out

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tokio::sync::mpsc;

use startpage_core::prelude::*;
use startpage_core::{Correlation, Direction, MessageKind, OutboundMessage, PostMessage};

use crate::correlation::lock;
use crate::outbox::Outbox;
use crate::protocol::decode_line;

/// Receives every validated inbound message.
///
/// The return value reports whether the message was consumed meaningfully.
/// It is bookkeeping only and never signals an error.
#[cfg_attr(test, mockall::automock)]
pub trait MessageHandler {
    fn handle_message(&mut self, message: &PostMessage) -> bool;
}

/// Identifies one registration with a [`PostOffice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    handler: Weak<RefCell<dyn MessageHandler>>,
}

/// Why an inbound line never reached the handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    Malformed(String),
    UnknownKind(String),
    SchemaViolation(String),
}

impl DropReason {
    fn from_error(err: &Error) -> Self {
        match err {
            Error::UnknownKind { kind } => DropReason::UnknownKind(kind.clone()),
            Error::SchemaViolation { .. } => DropReason::SchemaViolation(err.to_string()),
            other => DropReason::Malformed(other.to_string()),
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::Malformed(message) => write!(f, "malformed: {}", message),
            DropReason::UnknownKind(kind) => write!(f, "unknown kind: {}", kind),
            DropReason::SchemaViolation(message) => f.write_str(message),
        }
    }
}

/// Outcome of delivering one inbound line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Failed validation at the boundary
    Dropped(DropReason),
    /// Fanned out to `handlers` live handlers; `consumed` if any consumed it
    Delivered { handlers: usize, consumed: bool },
}

impl Delivery {
    pub fn consumed(&self) -> bool {
        matches!(self, Delivery::Delivered { consumed: true, .. })
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Delivery::Dropped(_))
    }
}

/// The view's end of the message channel.
///
/// Holds a non-owning list of handlers and the [`Outbox`] used to send.
/// Single-threaded: handlers live in `Rc<RefCell<_>>` and are invoked in
/// registration order for each inbound message, in arrival order.
pub struct PostOffice {
    handlers: Vec<Registration>,
    outbox: Outbox,
    next_handler_id: u64,
}

impl std::fmt::Debug for PostOffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostOffice")
            .field("handlers", &self.handlers.len())
            .field("outbox", &self.outbox)
            .finish()
    }
}

impl PostOffice {
    /// Create a PostOffice whose encoded outbound lines go to `line_tx`
    pub fn new(line_tx: mpsc::UnboundedSender<String>, correlate: bool) -> Self {
        Self::with_outbox(Outbox::with_correlation(line_tx, correlate))
    }

    pub fn with_outbox(outbox: Outbox) -> Self {
        Self {
            handlers: Vec::new(),
            outbox,
            next_handler_id: 1,
        }
    }

    /// A clone of the send half, for handlers that need to reply
    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    pub fn send(&self, message: OutboundMessage) -> Result<()> {
        self.outbox.send(message)
    }

    /// Register a handler without taking ownership of it
    pub fn add_handler<H>(&mut self, handler: &Rc<RefCell<H>>) -> HandlerId
    where
        H: MessageHandler + 'static,
    {
        let id = HandlerId(self.next_handler_id);
        self.next_handler_id += 1;

        let handler: Rc<RefCell<dyn MessageHandler>> = handler.clone();
        self.handlers.push(Registration {
            id,
            handler: Rc::downgrade(&handler),
        });
        debug!("Registered handler {:?} ({} total)", id, self.handlers.len());
        id
    }

    /// Returns false if `id` was not registered (or already removed)
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|registration| registration.id != id);
        let removed = self.handlers.len() != before;
        if removed {
            debug!("Removed handler {:?}", id);
        }
        removed
    }

    /// Number of registrations whose handler is still alive
    pub fn handler_count(&self) -> usize {
        self.handlers
            .iter()
            .filter(|registration| registration.handler.strong_count() > 0)
            .count()
    }

    /// Parse, validate and fan out one line received from the host
    pub fn deliver_line(&mut self, line: &str) -> Delivery {
        let decoded = match decode_line(line) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Dropping inbound message: {}", e);
                return Delivery::Dropped(DropReason::from_error(&e));
            }
        };

        let correlation = self.correlate(decoded.kind, decoded.id);
        let message = PostMessage {
            kind: decoded.kind,
            payload: decoded.payload,
            correlation,
        };
        self.deliver(&message)
    }

    /// Fan out an already-validated message to every live handler
    pub fn deliver(&mut self, message: &PostMessage) -> Delivery {
        // Drop registrations whose handler has gone away.
        self.handlers
            .retain(|registration| registration.handler.strong_count() > 0);

        // Snapshot so handlers may register or remove others while we deliver.
        let targets: Vec<(HandlerId, Rc<RefCell<dyn MessageHandler>>)> = self
            .handlers
            .iter()
            .filter_map(|registration| {
                registration
                    .handler
                    .upgrade()
                    .map(|handler| (registration.id, handler))
            })
            .collect();

        let mut handlers = 0;
        let mut consumed = false;
        for (id, handler) in targets {
            let Ok(mut handler) = handler.try_borrow_mut() else {
                error!(
                    "Handler {:?} is busy; skipping {} (re-entrant delivery)",
                    id, message.kind
                );
                continue;
            };
            handlers += 1;
            consumed |= handler.handle_message(message);
        }

        if consumed && message.kind.direction() == Direction::ViewToHost {
            debug!("{} flows view-to-host; not counted as consumed", message.kind);
            consumed = false;
        }

        trace!(
            "Delivered {} to {} handler(s), consumed: {}",
            message.kind,
            handlers,
            consumed
        );
        Delivery::Delivered { handlers, consumed }
    }

    /// Forget every outstanding correlated request. Returns how many there were.
    pub fn cancel_pending(&self) -> usize {
        self.outbox
            .tracker()
            .map(|tracker| lock(tracker).cancel_all())
            .unwrap_or(0)
    }

    fn correlate(&self, kind: MessageKind, id: Option<u64>) -> Correlation {
        let Some(id) = id else {
            return Correlation::Uncorrelated;
        };
        match self.outbox.tracker() {
            Some(tracker) if kind.answers().is_some() => lock(tracker).classify(kind, Some(id)),
            Some(_) => Correlation::Uncorrelated,
            None => {
                trace!("Ignoring id {} on {}: correlation disabled", id, kind);
                Correlation::Uncorrelated
            }
        }
    }
}
