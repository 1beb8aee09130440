//! # startpage-channel - Host/View Message Channel
//!
//! The PostOffice: newline-delimited JSON between the sandboxed view and its
//! host, validated against the message schema in [`startpage_core`].
//!
//! ## Public API
//!
//! ### Delivery
//! - [`PostOffice`] - Handler registry; validates inbound lines and fans them out
//! - [`MessageHandler`] - Implemented by anything that wants inbound messages
//! - [`Delivery`], [`DropReason`] - What happened to one inbound line
//!
//! ### Sending
//! - [`Outbox`] - Cloneable, non-blocking send half
//! - [`RequestTracker`] - Opt-in request/answer correlation
//!
//! ### Transports
//! - [`Transport`] - stdio, TCP, or in-memory line transport
//! - [`HostEnd`] - The host's side of an in-memory transport (tests, demos)
//!
//! ### Wire Format
//! - [`decode_line()`] / [`encode_message()`] - Envelope codec

pub mod correlation;
pub mod outbox;
pub mod post_office;
pub mod protocol;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod transport;

pub use correlation::{next_request_id, RequestTracker, SharedTracker};
pub use outbox::Outbox;
pub use post_office::{Delivery, DropReason, HandlerId, MessageHandler, PostOffice};
pub use protocol::{decode_line, encode_message, DecodedEnvelope};
pub use transport::{HostEnd, Transport};
