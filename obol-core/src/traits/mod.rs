//! Hardware abstraction traits
//!
//! The seams between the lifecycle logic and the board: a write-only
//! status display, the secure streaming transport, and the inbound
//! frame handler.

pub mod display;
pub mod transport;

pub use display::{Color, DisplayError, DisplaySink, TextSize};
pub use transport::{FrameHandler, StreamTransport};
