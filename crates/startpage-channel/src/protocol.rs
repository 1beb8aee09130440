//! Wire envelope encoding and validation
//!
//! Every message crosses the boundary as one line of JSON:
//! `{"kind": "...", "payload": ..., "id": N}` where `payload` and `id` are
//! omitted when absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use startpage_core::prelude::*;
use startpage_core::{MessageKind, Payload};

/// The raw envelope as it appears on the wire (before schema validation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Envelope {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

/// An envelope whose kind and payload passed the schema
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEnvelope {
    pub kind: MessageKind,
    pub payload: Payload,
    pub id: Option<u64>,
}

/// Parse and validate one line received from the host.
///
/// # Errors
/// * [`Error::MalformedEnvelope`] - not a JSON object with a string `kind`
/// * [`Error::UnknownKind`] - `kind` is not in the registry
/// * [`Error::SchemaViolation`] - payload does not match the kind's shape
pub fn decode_line(line: &str) -> Result<DecodedEnvelope> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(Error::malformed("empty line"));
    }

    let envelope: Envelope =
        serde_json::from_str(trimmed).map_err(|e| Error::malformed(e.to_string()))?;

    let kind =
        MessageKind::from_wire(&envelope.kind).ok_or_else(|| Error::unknown_kind(&envelope.kind))?;
    let payload = Payload::decode(kind, envelope.payload)?;

    Ok(DecodedEnvelope {
        kind,
        payload,
        id: envelope.id,
    })
}

/// Serialize a message into a single wire line (without the trailing newline)
pub fn encode_message(kind: MessageKind, payload: &Payload, id: Option<u64>) -> Result<String> {
    let envelope = Envelope {
        kind: kind.as_str().to_string(),
        payload: payload.to_value(),
        id,
    };
    Ok(serde_json::to_string(&envelope)?)
}
