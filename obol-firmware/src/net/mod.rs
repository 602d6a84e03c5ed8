//! Network plumbing
//!
//! The WebSocket-over-TLS connection task and the channel-backed
//! transport handle the session drives.

pub mod ws;

pub use ws::{connection_task, ChannelTransport};
