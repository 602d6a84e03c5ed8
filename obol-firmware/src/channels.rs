//! Inter-task communication channels
//!
//! Defines the static channels between the lifecycle task and the
//! connection task. Uses embassy-sync primitives for safe async
//! communication; session state itself lives in the lifecycle task,
//! only events and frames travel here.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use obol_core::session::StreamEvent;

/// Channel capacity for inbound stream events
const EVENT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outbound text frames
const OUTBOUND_CHANNEL_SIZE: usize = 4;

/// Largest outbound text frame (the subscription request plus headroom)
pub const MAX_OUTBOUND_LEN: usize = 256;

/// Control requests from the session toward the connection task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportControl {
    /// Begin (or re-issue) the handshake
    Open,
    /// Tear the live connection down
    Close,
}

/// Inbound transport events for the session pump
pub static STREAM_EVENTS: Channel<CriticalSectionRawMutex, StreamEvent, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Outbound text frames awaiting transmission
pub static OUTBOUND_FRAMES: Channel<
    CriticalSectionRawMutex,
    String<MAX_OUTBOUND_LEN>,
    OUTBOUND_CHANNEL_SIZE,
> = Channel::new();

/// Open/close requests; a signal because only the latest request matters
pub static TRANSPORT_CONTROL: Signal<CriticalSectionRawMutex, TransportControl> = Signal::new();
