//! Configuration types for the start page
//!
//! Defines:
//! - `Settings` - Top-level settings from `config.toml`
//! - `ViewSettings`, `ProtocolSettings`, `TransportSettings`
//! - `TransportKind`

use serde::{Deserialize, Serialize};

use crate::state::{ViewFlow, DEFAULT_TAB_COUNT};

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub view: ViewSettings,

    #[serde(default)]
    pub protocol: ProtocolSettings,

    #[serde(default)]
    pub transport: TransportSettings,
}

/// Initial view state
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewSettings {
    /// Which start page variant to show
    #[serde(default)]
    pub flow: ViewFlow,

    /// Number of tabs (must be at least 1)
    #[serde(default = "default_tab_count")]
    pub tab_count: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            flow: ViewFlow::default(),
            tab_count: default_tab_count(),
        }
    }
}

fn default_tab_count() -> usize {
    DEFAULT_TAB_COUNT
}

/// Wire protocol options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtocolSettings {
    /// Stamp requests with an id and match answers to them.
    /// Off by default: plain hosts match by kind only.
    #[serde(default)]
    pub correlate_requests: bool,
}

/// How the view reaches its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// NDJSON over stdin/stdout
    #[default]
    Stdio,
    /// NDJSON over a TCP connection to the host
    Tcp,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Tcp => write!(f, "tcp"),
        }
    }
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportKind::Stdio),
            "tcp" => Ok(TransportKind::Tcp),
            other => Err(format!(
                "unknown transport '{}' (expected stdio or tcp)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransportSettings {
    #[serde(default)]
    pub kind: TransportKind,

    /// Host address for the TCP transport
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            addr: default_addr(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:7878".to_string()
}
