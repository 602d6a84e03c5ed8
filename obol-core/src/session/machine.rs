//! Session state machine
//!
//! States are {Disconnected, Connecting, Connected}, with Connecting
//! implicit: it is the stretch between a re-issued handshake and the
//! next Connected/Disconnected event. The cached connected flag is
//! mutated only here, never by polling the transport.

use crate::config::Endpoint;
use crate::screen;
use crate::session::events::StreamEvent;
use crate::traits::{DisplaySink, FrameHandler, StreamTransport};

/// Subscription request transmitted on every connect
pub const SUBSCRIBE_FRAME: &str = "{\"command\": \"subscribe\", \"streams\": [\"ledger\"]}";

/// Secure streaming session to the ledger feed.
///
/// Exactly one session exists per device. It owns the endpoint for its
/// lifetime and is driven by reference from the service loop; the
/// transport and display are collaborators passed into each call.
pub struct StreamSession<H> {
    endpoint: Endpoint,
    handler: Option<H>,
    connected: bool,
}

impl<H: FrameHandler> StreamSession<H> {
    /// Create a session for `endpoint`.
    ///
    /// With no handler, inbound text frames are logged and discarded.
    pub fn new(endpoint: Endpoint, handler: Option<H>) -> Self {
        Self {
            endpoint,
            handler,
            connected: false,
        }
    }

    /// Kick off the secure handshake and render the session status.
    ///
    /// Non-blocking: the handshake outcome arrives later as a
    /// [`StreamEvent`] through [`service`](Self::service). The transport
    /// keeps retrying on its own fixed interval after failures.
    pub fn begin<T: StreamTransport, D: DisplaySink>(&mut self, transport: &mut T, display: &mut D) {
        let _ = screen::stream_connecting(display, self.endpoint.host);
        transport.open(&self.endpoint);
    }

    /// Pump pending transport I/O.
    ///
    /// Drains at most one pending event per call and dispatches it, so
    /// the call never blocks; event latency is bounded by the caller's
    /// loop cadence.
    pub fn service<T: StreamTransport, D: DisplaySink>(
        &mut self,
        transport: &mut T,
        display: &mut D,
    ) {
        if let Some(event) = transport.poll_event() {
            self.dispatch(event, transport, display);
        }
    }

    fn dispatch<T: StreamTransport, D: DisplaySink>(
        &mut self,
        event: StreamEvent,
        transport: &mut T,
        display: &mut D,
    ) {
        match event {
            StreamEvent::Disconnected => {
                self.connected = false;
                let _ = screen::stream_connecting(display, self.endpoint.host);
                // Re-issue the handshake immediately; the transport's own
                // retry interval covers repeated failures.
                transport.open(&self.endpoint);
            }
            StreamEvent::Connected => {
                self.connected = true;
                let _ = screen::stream_connected(display);
                let _ = transport.send_text(SUBSCRIBE_FRAME);
            }
            StreamEvent::Text(payload) => match &mut self.handler {
                Some(handler) => handler.on_frame(&payload),
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("text frame dropped, no handler registered");
                }
            },
        }
    }

    /// Cached connectivity flag, updated only by event dispatch
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Transmit a text frame if connected.
    ///
    /// Not connected means the frame is dropped: no buffering, no
    /// delivery guarantee. Callers that care must check
    /// [`is_connected`](Self::is_connected) first.
    pub fn send<T: StreamTransport>(&mut self, transport: &mut T, text: &str) {
        if self.connected {
            let _ = transport.send_text(text);
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("stream not connected, dropping outbound frame");
        }
    }

    /// Explicit teardown.
    ///
    /// Clears the cached flag and closes the transport. The transport's
    /// automatic retry stays armed, so a reconnect may follow on its own;
    /// it will surface as a fresh Connected event.
    pub fn disconnect<T: StreamTransport>(&mut self, transport: &mut T) {
        transport.close();
        self.connected = false;
    }

    /// The endpoint every handshake is issued against
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use heapless::{Deque, String, Vec};

    use crate::traits::DisplayError;

    const TEST_ENDPOINT: Endpoint = Endpoint {
        host: "feed.example.org",
        port: 443,
        path: "/",
    };

    /// Transport double counting every driver call
    struct MockTransport {
        opens: usize,
        closes: usize,
        sent: Vec<String<64>, 8>,
        events: Deque<StreamEvent, 8>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                opens: 0,
                closes: 0,
                sent: Vec::new(),
                events: Deque::new(),
            }
        }

        fn push_event(&mut self, event: StreamEvent) {
            self.events.push_back(event).unwrap();
        }
    }

    impl StreamTransport for MockTransport {
        fn open(&mut self, endpoint: &Endpoint) {
            assert_eq!(endpoint, &TEST_ENDPOINT);
            self.opens += 1;
        }

        fn poll_event(&mut self) -> Option<StreamEvent> {
            self.events.pop_front()
        }

        fn send_text(&mut self, text: &str) -> bool {
            let mut frame = String::new();
            frame.push_str(text).unwrap();
            self.sent.push(frame).unwrap();
            true
        }

        fn close(&mut self) {
            self.closes += 1;
        }
    }

    /// Display double that accepts everything
    struct NullDisplay;

    impl DisplaySink for NullDisplay {
        fn clear(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }
        fn set_color(&mut self, _color: crate::traits::Color) {}
        fn set_text_size(&mut self, _size: crate::traits::TextSize) {}
        fn set_cursor(&mut self, _x: i32, _y: i32) {}
        fn print(&mut self, _text: &str) -> Result<(), DisplayError> {
            Ok(())
        }
        fn draw_bitmap(
            &mut self,
            _data: &[u8],
            _x: i32,
            _y: i32,
            _width: u32,
            _height: u32,
        ) -> Result<(), DisplayError> {
            Ok(())
        }
        fn flush(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    /// A session with no handler registered
    fn bare_session() -> StreamSession<fn(&[u8])> {
        StreamSession::new(TEST_ENDPOINT, None)
    }

    #[test]
    fn test_begin_issues_one_handshake() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();
        session.begin(&mut transport, &mut NullDisplay);
        assert_eq!(transport.opens, 1);
        assert!(!session.is_connected());
    }

    #[test]
    fn test_disconnected_reissues_one_handshake_per_event() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        for _ in 0..3 {
            transport.push_event(StreamEvent::Disconnected);
        }
        for _ in 0..3 {
            session.service(&mut transport, &mut NullDisplay);
        }

        assert_eq!(transport.opens, 3);
        assert!(!session.is_connected());
    }

    #[test]
    fn test_connected_sends_subscription_once() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        transport.push_event(StreamEvent::Connected);
        session.service(&mut transport, &mut NullDisplay);

        assert!(session.is_connected());
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0].as_str(), SUBSCRIBE_FRAME);
    }

    #[test]
    fn test_connected_precedes_text_dispatch() {
        // One event per pump: the flag is up before the first text frame
        // reaches the handler.
        let delivered = RefCell::new(0usize);
        let handler = |_payload: &[u8]| {
            *delivered.borrow_mut() += 1;
        };
        let mut session = StreamSession::new(TEST_ENDPOINT, Some(handler));
        let mut transport = MockTransport::new();

        transport.push_event(StreamEvent::Connected);
        transport.push_event(StreamEvent::text(b"ledger_closed:99").unwrap());

        session.service(&mut transport, &mut NullDisplay);
        assert!(session.is_connected());
        assert_eq!(*delivered.borrow(), 0);

        session.service(&mut transport, &mut NullDisplay);
        assert_eq!(*delivered.borrow(), 1);
    }

    #[test]
    fn test_drop_then_recover() {
        // Scenario: a disconnect followed by a reconnect ends connected,
        // with exactly one re-handshake and one subscription send.
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        transport.push_event(StreamEvent::Disconnected);
        transport.push_event(StreamEvent::Connected);
        session.service(&mut transport, &mut NullDisplay);
        session.service(&mut transport, &mut NullDisplay);

        assert_eq!(transport.opens, 1);
        assert_eq!(transport.sent.len(), 1);
        assert!(session.is_connected());
    }

    #[test]
    fn test_text_reaches_handler_verbatim() {
        let seen: RefCell<Vec<u8, 64>> = RefCell::new(Vec::new());
        let calls = RefCell::new(0usize);
        let handler = |payload: &[u8]| {
            *calls.borrow_mut() += 1;
            seen.borrow_mut().extend_from_slice(payload).unwrap();
        };
        let mut session = StreamSession::new(TEST_ENDPOINT, Some(handler));
        let mut transport = MockTransport::new();

        transport.push_event(StreamEvent::text(b"ledger_closed:100").unwrap());
        session.service(&mut transport, &mut NullDisplay);

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(&seen.borrow()[..], b"ledger_closed:100");
        assert_eq!(seen.borrow().len(), 17);
    }

    #[test]
    fn test_text_without_handler_changes_nothing() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        transport.push_event(StreamEvent::text(b"ledger_closed:100").unwrap());
        session.service(&mut transport, &mut NullDisplay);

        assert!(!session.is_connected());
        assert_eq!(transport.opens, 0);
        assert_eq!(transport.sent.len(), 0);
    }

    #[test]
    fn test_send_while_disconnected_never_touches_transport() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        session.send(&mut transport, "{\"command\": \"ping\"}");

        assert_eq!(transport.sent.len(), 0);
    }

    #[test]
    fn test_send_while_connected_transmits() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        transport.push_event(StreamEvent::Connected);
        session.service(&mut transport, &mut NullDisplay);
        session.send(&mut transport, "{\"command\": \"ping\"}");

        assert_eq!(transport.sent.len(), 2); // subscription + ping
        assert_eq!(transport.sent[1].as_str(), "{\"command\": \"ping\"}");
    }

    #[test]
    fn test_disconnect_clears_flag_without_handshake() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        transport.push_event(StreamEvent::Connected);
        session.service(&mut transport, &mut NullDisplay);
        assert!(session.is_connected());

        session.disconnect(&mut transport);

        assert!(!session.is_connected());
        assert_eq!(transport.closes, 1);
        assert_eq!(transport.opens, 0);
    }

    #[test]
    fn test_service_with_no_pending_event_is_a_no_op() {
        let mut session = bare_session();
        let mut transport = MockTransport::new();

        session.service(&mut transport, &mut NullDisplay);

        assert_eq!(transport.opens, 0);
        assert_eq!(transport.sent.len(), 0);
        assert!(!session.is_connected());
    }
}
