//! The "show this page again" preference, kept in step with the host
//!
//! The host owns the durable copy. The view shows an optimistic local copy
//! that the host confirms or corrects by pushing `SendSetting`.

use serde::Serialize;

use startpage_core::prelude::*;
use startpage_core::{Correlation, OutboundMessage, SettingPackage};

/// Local and host-confirmed values of the preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SettingsState {
    /// What the view shows right now
    pub local: bool,
    /// Last value the host reported; `None` until it answers
    pub confirmed: Option<bool>,
}

impl SettingsState {
    /// True while the shown value has not been confirmed by the host
    pub fn is_stale(&self) -> bool {
        self.confirmed != Some(self.local)
    }
}

/// Owns the request/answer exchange for the preference
#[derive(Debug, Clone, Default)]
pub struct SettingsSynchronizer {
    state: SettingsState,
    /// Number of `UpdateSettings` sent since the last host answer
    unconfirmed_writes: u32,
}

impl SettingsSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SettingsState {
        self.state
    }

    pub fn show_again_setting(&self) -> bool {
        self.state.local
    }

    /// The checkbox reads "don't show again", so it is the inverse
    pub fn checkbox_checked(&self) -> bool {
        !self.state.local
    }

    pub fn is_stale(&self) -> bool {
        self.state.is_stale()
    }

    pub fn unconfirmed_writes(&self) -> u32 {
        self.unconfirmed_writes
    }

    /// Message to send when the view mounts. No timeout, no retry.
    pub fn mount(&self) -> OutboundMessage {
        OutboundMessage::RequestShowAgainSetting
    }

    /// Apply a value pushed by the host. Returns false if it was ignored.
    ///
    /// The host is authoritative: the newest answer overwrites both copies,
    /// including any optimistic local change. Answers to a superseded request
    /// are dropped when correlation is on.
    pub fn apply(&mut self, package: SettingPackage, correlation: Correlation) -> bool {
        if let Correlation::Superseded(id) = correlation {
            debug!("Ignoring setting from superseded request #{}", id);
            return false;
        }
        if let Correlation::Unknown(id) = correlation {
            debug!("Setting answer carries unknown id {}; treating as a push", id);
        }

        let value = package.show_again_setting;
        if self.unconfirmed_writes > 0 && value != self.state.local {
            warn!(
                "Host reported showAgainSetting={} after {} unconfirmed update(s); host wins",
                value, self.unconfirmed_writes
            );
        }

        self.state = SettingsState {
            local: value,
            confirmed: Some(value),
        };
        self.unconfirmed_writes = 0;
        true
    }

    /// Flip the local value and return the update for the host.
    ///
    /// Duplicate sends are not suppressed.
    pub fn toggle(&mut self) -> OutboundMessage {
        self.state.local = !self.state.local;
        self.unconfirmed_writes += 1;
        OutboundMessage::UpdateSettings(self.state.local)
    }
}
