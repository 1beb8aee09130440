//! Main update function - handles state transitions (TEA pattern)

use startpage_core::prelude::*;
use startpage_core::{MessageKind, OutboundMessage, PostMessage};

use super::UpdateResult;
use crate::message::Message;
use crate::state::{ViewPhase, ViewState};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut ViewState, message: Message) -> UpdateResult {
    if state.is_unmounted() {
        trace!("View unmounted; ignoring {:?}", message);
        return UpdateResult::none();
    }

    match message {
        // ─────────────────────────────────────────────────────────
        // Lifecycle
        // ─────────────────────────────────────────────────────────
        Message::Bootstrap => {
            if state.phase != ViewPhase::Mounting {
                debug!("Bootstrap ignored: view already {:?}", state.phase);
                return UpdateResult::none();
            }
            state.phase = ViewPhase::Ready;
            info!("View ready ({} flow)", state.flow);
            UpdateResult::send(OutboundMessage::Started).then(Message::RequestSetting)
        }

        Message::RequestSetting => UpdateResult::send(state.settings.mount()),

        Message::Unmount => {
            state.phase = ViewPhase::Unmounted;
            info!("View unmounted");
            UpdateResult::consumed()
        }

        // ─────────────────────────────────────────────────────────
        // Host Messages
        // ─────────────────────────────────────────────────────────
        Message::Host(post) => handle_host_message(state, &post),

        // ─────────────────────────────────────────────────────────
        // User Interaction
        // ─────────────────────────────────────────────────────────
        Message::ToggleMenu => {
            state.toggle_menu();
            UpdateResult::consumed()
        }

        Message::SelectTab(index) => {
            if state.select_tab(index) {
                UpdateResult::consumed()
            } else {
                warn!(
                    "Tab {} out of range (0..{}); keeping tab {}",
                    index,
                    state.tab_count(),
                    state.active_tab
                );
                UpdateResult::none()
            }
        }

        Message::ToggleShowAgain => UpdateResult::send(state.settings.toggle()),

        Message::Command(command) => UpdateResult::send(OutboundMessage::Command(command)),
    }
}

/// Route a validated inbound message. Kinds the view does not handle are
/// ignored so newer hosts can add host-to-view messages.
fn handle_host_message(state: &mut ViewState, post: &PostMessage) -> UpdateResult {
    match post.kind {
        MessageKind::SendSetting => match post.setting_package() {
            Some(package) => {
                if state.settings.apply(package, post.correlation) {
                    debug!("showAgainSetting = {}", package.show_again_setting);
                    UpdateResult::consumed()
                } else {
                    UpdateResult::none()
                }
            }
            None => UpdateResult::none(),
        },
        other => {
            debug!("Ignoring inbound {}", other);
            UpdateResult::none()
        }
    }
}
