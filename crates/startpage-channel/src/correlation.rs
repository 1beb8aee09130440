//! Opt-in request correlation
//!
//! The base protocol matches answers to requests by kind alone. When
//! correlation is enabled, requests that expect an answer are stamped with an
//! id, and answers echoing that id can be told apart from answers to older,
//! superseded requests of the same kind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use startpage_core::prelude::*;
use startpage_core::{Correlation, MessageKind};

/// Global request ID counter
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique request ID
pub fn next_request_id() -> u64 {
    REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Tracker shared between the send half and the delivery half
pub type SharedTracker = Arc<Mutex<RequestTracker>>;

/// Lock a shared tracker, recovering the data if a holder panicked
pub(crate) fn lock(tracker: &SharedTracker) -> MutexGuard<'_, RequestTracker> {
    tracker
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A request awaiting its answer
#[derive(Debug)]
struct PendingRequest {
    kind: MessageKind,
    created_at: Instant,
}

/// Tracks outstanding requests and classifies answers
#[derive(Debug, Default)]
pub struct RequestTracker {
    pending: HashMap<u64, PendingRequest>,
    /// Newest request id issued per kind
    latest: HashMap<MessageKind, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTracker {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Register a new outstanding request and return its id
    pub fn register(&mut self, kind: MessageKind) -> u64 {
        let id = next_request_id();
        self.pending.insert(
            id,
            PendingRequest {
                kind,
                created_at: Instant::now(),
            },
        );
        if let Some(previous) = self.latest.insert(kind, id) {
            debug!("Request #{} ({}) supersedes #{}", id, kind, previous);
        }
        id
    }

    /// Classify an answer of `answer_kind` carrying `id`.
    ///
    /// A matched request is no longer pending afterwards; answering it twice
    /// yields [`Correlation::Unknown`] the second time.
    pub fn classify(&mut self, answer_kind: MessageKind, id: Option<u64>) -> Correlation {
        let Some(id) = id else {
            return Correlation::Uncorrelated;
        };
        let Some(request_kind) = answer_kind.answers() else {
            return Correlation::Uncorrelated;
        };

        match self.pending.remove(&id) {
            Some(request) if request.kind == request_kind => {
                debug!(
                    "Request #{} ({}) answered after {:?}",
                    id,
                    request.kind,
                    request.created_at.elapsed()
                );
                if self.latest.get(&request_kind) == Some(&id) {
                    Correlation::Latest(id)
                } else {
                    Correlation::Superseded(id)
                }
            }
            Some(request) => {
                // Answer kind does not match the request; keep it pending.
                self.pending.insert(id, request);
                Correlation::Unknown(id)
            }
            None => Correlation::Unknown(id),
        }
    }

    /// Drop one request that was never delivered.
    ///
    /// If it was the newest of its kind, the newest request still pending
    /// takes its place.
    pub fn forget(&mut self, id: u64) {
        let Some(request) = self.pending.remove(&id) else {
            return;
        };
        if self.latest.get(&request.kind) != Some(&id) {
            return;
        }
        let previous = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.kind == request.kind)
            .map(|(pending_id, _)| *pending_id)
            .max();
        match previous {
            Some(previous) => {
                self.latest.insert(request.kind, previous);
            }
            None => {
                self.latest.remove(&request.kind);
            }
        }
    }

    /// Drop every outstanding request (view unmount). Returns how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        self.latest.clear();
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
