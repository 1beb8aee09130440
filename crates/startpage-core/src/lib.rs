//! # startpage-core - Core Domain Types
//!
//! Foundation crate for the start page view. Provides the message schema
//! shared with the host, error handling, transport events, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Message Schema (`messages`)
//! - [`MessageKind`] - Closed registry of wire tags
//! - [`PayloadShape`], [`Payload`] - Declared and validated payloads
//! - [`OutboundMessage`], [`HostCommand`] - Typed view-to-host messages
//! - [`PostMessage`], [`Correlation`] - Validated inbound messages
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! ```rust
//! use startpage_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod messages;
pub mod prelude;

pub use error::{Error, Result, ResultExt};
pub use events::TransportEvent;
pub use messages::{
    Correlation, Direction, HostCommand, MessageKind, OutboundMessage, Payload, PayloadShape,
    PostMessage, SettingPackage,
};
