//! Send half of the channel

use serde_json::Value;
use tokio::sync::mpsc;

use startpage_core::prelude::*;
use startpage_core::{Direction, MessageKind, OutboundMessage, Payload};

use crate::correlation::{lock, RequestTracker, SharedTracker};
use crate::protocol::encode_message;

/// Fire-and-forget sender for view-to-host messages.
///
/// Cheap to clone. Sending never blocks: lines are queued for the transport
/// writer, and there is no response to wait for.
#[derive(Clone)]
pub struct Outbox {
    /// Encoded lines for the transport writer
    line_tx: mpsc::UnboundedSender<String>,
    /// Present only when request correlation is enabled
    tracker: Option<SharedTracker>,
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("line_tx", &"<channel>")
            .field("correlated", &self.tracker.is_some())
            .finish()
    }
}

impl Outbox {
    pub fn new(line_tx: mpsc::UnboundedSender<String>, tracker: Option<SharedTracker>) -> Self {
        Self { line_tx, tracker }
    }

    /// Build an outbox, with a fresh tracker when `correlate` is set
    pub fn with_correlation(line_tx: mpsc::UnboundedSender<String>, correlate: bool) -> Self {
        let tracker = correlate.then(RequestTracker::shared);
        Self::new(line_tx, tracker)
    }

    /// Create an uncorrelated Outbox and the receiver for its lines (for tests)
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn new_for_test() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx, None), rx)
    }

    /// Send a typed message
    pub fn send(&self, message: OutboundMessage) -> Result<()> {
        self.dispatch(message.kind(), message.payload())
    }

    /// Send a message built at runtime, validating it against the schema first
    pub fn send_raw(&self, kind: MessageKind, payload: Option<Value>) -> Result<()> {
        if kind.direction() != Direction::ViewToHost {
            return Err(Error::schema_violation(
                kind.as_str(),
                "a view-to-host kind",
                "a host-to-view kind",
            ));
        }
        let payload = Payload::decode(kind, payload)?;
        self.dispatch(kind, payload)
    }

    fn dispatch(&self, kind: MessageKind, payload: Payload) -> Result<()> {
        let id = match &self.tracker {
            Some(tracker) if kind.expects_answer() => Some(lock(tracker).register(kind)),
            _ => None,
        };

        let result = encode_message(kind, &payload, id).and_then(|line| {
            match id {
                Some(id) => debug!("Sending {} #{}", kind, id),
                None => debug!("Sending {}", kind),
            }
            self.line_tx.send(line).map_err(|_| Error::ChannelClosed)
        });

        // A request that never left cannot be answered.
        if let (Err(_), Some(id), Some(tracker)) = (&result, id, &self.tracker) {
            lock(tracker).forget(id);
        }
        result
    }

    /// Whether answers can be correlated to requests
    pub fn is_correlated(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.line_tx.is_closed()
    }

    /// Number of correlated requests still awaiting an answer
    pub fn pending_requests(&self) -> usize {
        self.tracker
            .as_ref()
            .map(|tracker| lock(tracker).pending_count())
            .unwrap_or(0)
    }

    pub(crate) fn tracker(&self) -> Option<&SharedTracker> {
        self.tracker.as_ref()
    }
}
