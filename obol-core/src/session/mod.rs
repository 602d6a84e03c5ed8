//! Secure streaming session
//!
//! Event-driven lifecycle of the WebSocket connection to the ledger feed:
//! transitions come from inbound transport events, never from polling the
//! socket.

pub mod events;
pub mod machine;

pub use events::{StreamEvent, MAX_FRAME_LEN};
pub use machine::{StreamSession, SUBSCRIBE_FRAME};
