//! Streaming transport and frame handler traits

use crate::config::Endpoint;
use crate::session::StreamEvent;

/// Driver side of the secure streaming connection.
///
/// Implementations own the socket plumbing (resolution, TLS, framing,
/// automatic retry). The session only ever kicks off handshakes, drains
/// events, writes text frames, and tears down.
pub trait StreamTransport {
    /// Begin (or re-issue) the secure handshake toward `endpoint`.
    ///
    /// Non-blocking: completion is reported later as a [`StreamEvent`].
    fn open(&mut self, endpoint: &Endpoint);

    /// Drain one pending transport event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<StreamEvent>;

    /// Transmit one text frame.
    ///
    /// Returns false if the transport could not accept the frame.
    fn send_text(&mut self, text: &str) -> bool;

    /// Tear the connection down.
    ///
    /// The transport's automatic retry stays armed; a later reconnect is
    /// reported as a fresh [`StreamEvent::Connected`].
    fn close(&mut self);
}

/// Receiver for inbound text frames.
///
/// Invoked synchronously from the session pump with the raw payload;
/// no parsing or validation happens before the call.
pub trait FrameHandler {
    fn on_frame(&mut self, payload: &[u8]);
}

// Any closure over a byte slice is a handler
impl<F: FnMut(&[u8])> FrameHandler for F {
    fn on_frame(&mut self, payload: &[u8]) {
        self(payload)
    }
}
