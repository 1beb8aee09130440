//! Message types for the view (TEA pattern)

use startpage_core::{HostCommand, PostMessage};

/// All possible inputs to the view state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────
    /// The view was registered with the channel; announce it to the host
    Bootstrap,

    /// Ask the host for the persisted "show again" preference
    RequestSetting,

    /// The view is going away; later messages are ignored
    Unmount,

    // ─────────────────────────────────────────────────────────
    // Host Messages
    // ─────────────────────────────────────────────────────────
    /// A validated message delivered by the PostOffice
    Host(PostMessage),

    // ─────────────────────────────────────────────────────────
    // User Interaction
    // ─────────────────────────────────────────────────────────
    /// Expand or collapse the feature menu
    ToggleMenu,

    /// Switch to tab `i`
    SelectTab(usize),

    /// The "don't show this page again" checkbox was clicked
    ToggleShowAgain,

    /// A button asking the host to do something out of band
    Command(HostCommand),
}
