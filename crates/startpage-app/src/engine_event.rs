//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each processing cycle via `Engine::subscribe()`.
//! The headless runner turns them into NDJSON; tests use them to observe the
//! view without reaching into its state.

use startpage_channel::DropReason;

use crate::state::{ViewFlow, ViewSnapshot};

/// Domain events emitted by the Engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The view registered with the channel and announced itself
    Mounted { flow: ViewFlow, correlated: bool },

    /// The view state differs from the last broadcast snapshot
    StateChanged(ViewSnapshot),

    /// An inbound line failed validation and never reached the view
    MessageDropped { reason: DropReason },

    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Mounted { .. } => "mounted",
            Self::StateChanged(_) => "state_changed",
            Self::MessageDropped { .. } => "message_dropped",
            Self::Shutdown => "shutdown",
        }
    }
}
