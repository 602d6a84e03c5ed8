//! Transport events driving the session state machine

use heapless::Vec;

/// Largest text frame the session will carry.
///
/// Ledger close notifications run a few hundred bytes; anything larger
/// than this is a protocol change, not a bigger buffer problem.
pub const MAX_FRAME_LEN: usize = 2048;

/// Inbound transport events.
///
/// Push, not poll: the transport emits these as they happen and the
/// session consumes them one per pump.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamEvent {
    /// Secure handshake completed, frames can flow
    Connected,
    /// Connection lost, or a handshake attempt failed
    Disconnected,
    /// One complete text frame, delivered verbatim
    Text(Vec<u8, MAX_FRAME_LEN>),
}

impl StreamEvent {
    /// Build a text event from a raw payload.
    ///
    /// Returns None if the payload exceeds [`MAX_FRAME_LEN`].
    pub fn text(payload: &[u8]) -> Option<Self> {
        Vec::from_slice(payload).ok().map(StreamEvent::Text)
    }

    /// Check if this event reports a connectivity change
    pub fn is_transition(&self) -> bool {
        matches!(self, StreamEvent::Connected | StreamEvent::Disconnected)
    }
}
