//! Handler module - TEA update function
//!
//! - `update`: Main update() function and message dispatch

pub(crate) mod update;


use startpage_core::OutboundMessage;

use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// Actions the controller performs after update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Send a message to the host through the outbox
    Send(OutboundMessage),
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the controller to perform (runs before `message`)
    pub action: Option<UpdateAction>,
    /// Whether the message was handled meaningfully
    pub consumed: bool,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    /// Handled, with no further work
    pub fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::default()
        }
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
            consumed: true,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
            consumed: true,
        }
    }

    pub fn send(message: OutboundMessage) -> Self {
        Self::action(UpdateAction::Send(message))
    }

    /// Chain a follow-up message after this result's action
    pub fn then(mut self, msg: Message) -> Self {
        self.message = Some(msg);
        self
    }
}
