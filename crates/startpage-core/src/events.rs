//! Transport event definitions

/// Events produced by a transport's reader side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One raw line received from the host (not yet validated)
    Line(String),
    /// The host side closed the stream
    Closed { reason: Option<String> },
}

impl TransportEvent {
    pub fn is_closed(&self) -> bool {
        matches!(self, TransportEvent::Closed { .. })
    }
}
