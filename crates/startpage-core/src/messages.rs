//! Message schema shared by the view and its host
//!
//! The schema is a closed registry: every [`MessageKind`] has exactly one
//! [`PayloadShape`] and one [`Direction`]. New kinds may be added, but the
//! shape of an existing kind never changes, since both ends of the channel
//! ship together and there is no version field on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────
// Message Kinds
// ─────────────────────────────────────────────────────────

/// Every message kind the channel accepts, in either direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Started,
    RequestShowAgainSetting,
    SendSetting,
    UpdateSettings,
    OpenBlankNotebook,
    OpenBlankPythonFile,
    OpenInteractiveWindow,
    OpenCommandPalette,
    OpenCommandPaletteWithOpenNBSelected,
    OpenSampleNotebook,
    OpenFileBrowser,
    OpenFolder,
    OpenWorkspace,
    CloneRepo,
}

/// Shape of the payload a kind carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// No payload (absent or JSON `null`)
    None,
    /// A bare JSON boolean
    Bool,
    /// `{ "showAgainSetting": bool }`
    SettingPackage,
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadShape::None => write!(f, "no payload"),
            PayloadShape::Bool => write!(f, "boolean"),
            PayloadShape::SettingPackage => write!(f, "settings package"),
        }
    }
}

/// Which side of the boundary sends a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ViewToHost,
    HostToView,
}

impl MessageKind {
    /// All registered kinds
    pub const ALL: [MessageKind; 14] = [
        MessageKind::Started,
        MessageKind::RequestShowAgainSetting,
        MessageKind::SendSetting,
        MessageKind::UpdateSettings,
        MessageKind::OpenBlankNotebook,
        MessageKind::OpenBlankPythonFile,
        MessageKind::OpenInteractiveWindow,
        MessageKind::OpenCommandPalette,
        MessageKind::OpenCommandPaletteWithOpenNBSelected,
        MessageKind::OpenSampleNotebook,
        MessageKind::OpenFileBrowser,
        MessageKind::OpenFolder,
        MessageKind::OpenWorkspace,
        MessageKind::CloneRepo,
    ];

    /// Tag used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Started => "started",
            MessageKind::RequestShowAgainSetting => "RequestShowAgainSetting",
            MessageKind::SendSetting => "SendSetting",
            MessageKind::UpdateSettings => "update_settings",
            MessageKind::OpenBlankNotebook => "OpenBlankNotebook",
            MessageKind::OpenBlankPythonFile => "OpenBlankPythonFile",
            MessageKind::OpenInteractiveWindow => "OpenInteractiveWindow",
            MessageKind::OpenCommandPalette => "OpenCommandPalette",
            MessageKind::OpenCommandPaletteWithOpenNBSelected => {
                "OpenCommandPaletteWithOpenNBSelected"
            }
            MessageKind::OpenSampleNotebook => "OpenSampleNotebook",
            MessageKind::OpenFileBrowser => "OpenFileBrowser",
            MessageKind::OpenFolder => "OpenFolder",
            MessageKind::OpenWorkspace => "OpenWorkspace",
            MessageKind::CloneRepo => "CloneRepo",
        }
    }

    /// Look up a kind by its wire tag (case-sensitive)
    pub fn from_wire(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == tag)
    }

    pub fn payload_shape(&self) -> PayloadShape {
        match self {
            MessageKind::SendSetting => PayloadShape::SettingPackage,
            MessageKind::UpdateSettings => PayloadShape::Bool,
            _ => PayloadShape::None,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            MessageKind::SendSetting => Direction::HostToView,
            _ => Direction::ViewToHost,
        }
    }

    /// The request kind this kind answers, if it is a response
    pub fn answers(&self) -> Option<MessageKind> {
        match self {
            MessageKind::SendSetting => Some(MessageKind::RequestShowAgainSetting),
            _ => None,
        }
    }

    /// Whether the host is expected to answer this kind with another message
    pub fn expects_answer(&self) -> bool {
        Self::ALL.iter().any(|kind| kind.answers() == Some(*self))
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────

/// The persisted "show this page again" preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingPackage {
    pub show_again_setting: bool,
}

/// A payload that has been checked against the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    None,
    Bool(bool),
    Settings(SettingPackage),
}

impl Payload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            Payload::None => PayloadShape::None,
            Payload::Bool(_) => PayloadShape::Bool,
            Payload::Settings(_) => PayloadShape::SettingPackage,
        }
    }

    /// JSON form for the wire; `None` means the field is omitted
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Payload::None => None,
            Payload::Bool(value) => Some(Value::Bool(*value)),
            Payload::Settings(package) => Some(serde_json::json!({
                "showAgainSetting": package.show_again_setting
            })),
        }
    }

    /// Validate a raw JSON payload against the shape declared for `kind`
    pub fn decode(kind: MessageKind, raw: Option<Value>) -> Result<Self> {
        let expected = kind.payload_shape();
        match (expected, raw) {
            (PayloadShape::None, None) | (PayloadShape::None, Some(Value::Null)) => {
                Ok(Payload::None)
            }
            (PayloadShape::Bool, Some(Value::Bool(value))) => Ok(Payload::Bool(value)),
            (PayloadShape::SettingPackage, Some(Value::Object(map))) => {
                match map.get("showAgainSetting") {
                    Some(Value::Bool(show_again_setting)) => Ok(Payload::Settings(SettingPackage {
                        show_again_setting: *show_again_setting,
                    })),
                    Some(other) => Err(Error::schema_violation(
                        kind.as_str(),
                        "boolean showAgainSetting",
                        describe(Some(other)),
                    )),
                    None => Err(Error::schema_violation(
                        kind.as_str(),
                        expected.to_string(),
                        "object without showAgainSetting",
                    )),
                }
            }
            (expected, raw) => Err(Error::schema_violation(
                kind.as_str(),
                expected.to_string(),
                describe(raw.as_ref()),
            )),
        }
    }
}

/// Short JSON type name for error messages
fn describe(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

// ─────────────────────────────────────────────────────────
// Typed Messages
// ─────────────────────────────────────────────────────────

/// One-way requests for the host to perform an action out of band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommand {
    OpenBlankNotebook,
    OpenBlankPythonFile,
    OpenInteractiveWindow,
    OpenCommandPalette,
    OpenCommandPaletteWithSelection,
    OpenSampleNotebook,
    OpenFileBrowser,
    OpenFolder,
    OpenWorkspace,
    CloneRepo,
}

impl HostCommand {
    pub const ALL: [HostCommand; 10] = [
        HostCommand::OpenBlankNotebook,
        HostCommand::OpenBlankPythonFile,
        HostCommand::OpenInteractiveWindow,
        HostCommand::OpenCommandPalette,
        HostCommand::OpenCommandPaletteWithSelection,
        HostCommand::OpenSampleNotebook,
        HostCommand::OpenFileBrowser,
        HostCommand::OpenFolder,
        HostCommand::OpenWorkspace,
        HostCommand::CloneRepo,
    ];

    pub fn kind(&self) -> MessageKind {
        match self {
            HostCommand::OpenBlankNotebook => MessageKind::OpenBlankNotebook,
            HostCommand::OpenBlankPythonFile => MessageKind::OpenBlankPythonFile,
            HostCommand::OpenInteractiveWindow => MessageKind::OpenInteractiveWindow,
            HostCommand::OpenCommandPalette => MessageKind::OpenCommandPalette,
            HostCommand::OpenCommandPaletteWithSelection => {
                MessageKind::OpenCommandPaletteWithOpenNBSelected
            }
            HostCommand::OpenSampleNotebook => MessageKind::OpenSampleNotebook,
            HostCommand::OpenFileBrowser => MessageKind::OpenFileBrowser,
            HostCommand::OpenFolder => MessageKind::OpenFolder,
            HostCommand::OpenWorkspace => MessageKind::OpenWorkspace,
            HostCommand::CloneRepo => MessageKind::CloneRepo,
        }
    }
}

/// Messages the view may send. Construction cannot violate the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessage {
    Started,
    RequestShowAgainSetting,
    UpdateSettings(bool),
    Command(HostCommand),
}

impl OutboundMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            OutboundMessage::Started => MessageKind::Started,
            OutboundMessage::RequestShowAgainSetting => MessageKind::RequestShowAgainSetting,
            OutboundMessage::UpdateSettings(_) => MessageKind::UpdateSettings,
            OutboundMessage::Command(command) => command.kind(),
        }
    }

    pub fn payload(&self) -> Payload {
        match self {
            OutboundMessage::UpdateSettings(value) => Payload::Bool(*value),
            _ => Payload::None,
        }
    }
}

/// How an inbound answer relates to the requests the view has issued
///
/// Only meaningful when request correlation is enabled; otherwise every
/// message is [`Correlation::Uncorrelated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Correlation {
    /// No id on the message (unsolicited push, or kind-only protocol)
    #[default]
    Uncorrelated,
    /// Answers the newest outstanding request of its kind
    Latest(u64),
    /// Answers a request that a newer one has replaced
    Superseded(u64),
    /// Carries an id this view never issued
    Unknown(u64),
}

/// A validated message as delivered to handlers
#[derive(Debug, Clone, PartialEq)]
pub struct PostMessage {
    pub kind: MessageKind,
    pub payload: Payload,
    pub correlation: Correlation,
}

impl PostMessage {
    /// Build a message, checking the payload against the kind's shape
    pub fn new(kind: MessageKind, payload: Payload) -> Result<Self> {
        if payload.shape() != kind.payload_shape() {
            return Err(Error::schema_violation(
                kind.as_str(),
                kind.payload_shape().to_string(),
                payload.shape().to_string(),
            ));
        }
        Ok(Self {
            kind,
            payload,
            correlation: Correlation::Uncorrelated,
        })
    }

    pub fn with_correlation(mut self, correlation: Correlation) -> Self {
        self.correlation = correlation;
        self
    }

    /// The settings package, if this is a `SendSetting`
    pub fn setting_package(&self) -> Option<SettingPackage> {
        match (self.kind, self.payload) {
            (MessageKind::SendSetting, Payload::Settings(package)) => Some(package),
            _ => None,
        }
    }
}
