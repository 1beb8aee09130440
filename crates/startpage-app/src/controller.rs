//! ViewController - binds the view state machine to the channel

use std::cell::RefCell;
use std::rc::Rc;

use startpage_channel::{HandlerId, MessageHandler, Outbox, PostOffice};
use startpage_core::prelude::*;
use startpage_core::PostMessage;

use crate::handler::{update, UpdateAction};
use crate::message::Message;
use crate::state::{ViewSnapshot, ViewState};

/// Owns the view state and runs every input through [`update`].
///
/// Registered with the [`PostOffice`] as a handler; sends through its own
/// [`Outbox`] clone so replying never needs the PostOffice itself.
#[derive(Debug)]
pub struct ViewController {
    state: ViewState,
    outbox: Outbox,
    handler_id: Option<HandlerId>,
}

impl ViewController {
    pub fn new(state: ViewState, outbox: Outbox) -> Self {
        Self {
            state,
            outbox,
            handler_id: None,
        }
    }

    /// Register with `post_office`, then announce the view and request the
    /// persisted setting, in that order.
    pub fn mount(this: &Rc<RefCell<Self>>, post_office: &mut PostOffice) -> HandlerId {
        let id = post_office.add_handler(this);
        let mut controller = this.borrow_mut();
        controller.handler_id = Some(id);
        controller.dispatch(Message::Bootstrap);
        id
    }

    /// Tear down: stop handling input, unregister, forget pending requests
    pub fn unmount(this: &Rc<RefCell<Self>>, post_office: &mut PostOffice) {
        let handler_id = {
            let mut controller = this.borrow_mut();
            controller.dispatch(Message::Unmount);
            controller.handler_id.take()
        };

        if let Some(id) = handler_id {
            post_office.remove_handler(id);
        }
        let cancelled = post_office.cancel_pending();
        if cancelled > 0 {
            debug!("Cancelled {} outstanding request(s) on unmount", cancelled);
        }
    }

    /// Run a message, and any follow-ups it chains, to completion.
    /// Returns whether any step consumed it.
    pub fn dispatch(&mut self, message: Message) -> bool {
        let mut consumed = false;
        let mut next = Some(message);

        while let Some(msg) = next.take() {
            let result = update(&mut self.state, msg);
            consumed |= result.consumed;

            if let Some(action) = result.action {
                self.handle_action(action);
            }
            next = result.message;
        }

        consumed
    }

    fn handle_action(&self, action: UpdateAction) {
        match action {
            UpdateAction::Send(message) => {
                if let Err(e) = self.outbox.send(message) {
                    // Fire-and-forget: nothing to roll back.
                    warn!("Failed to send {}: {}", message.kind(), e);
                }
            }
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.snapshot()
    }

    pub fn handler_id(&self) -> Option<HandlerId> {
        self.handler_id
    }
}

impl MessageHandler for ViewController {
    fn handle_message(&mut self, message: &PostMessage) -> bool {
        self.dispatch(Message::Host(message.clone()))
    }
}
