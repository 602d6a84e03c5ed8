//! Board-agnostic core logic for the Obol ledger ticker
//!
//! This crate contains all connection-lifecycle logic that does not depend
//! on specific hardware implementations:
//!
//! - Capability traits (status display, streaming transport, frame handler)
//! - Wireless link bring-up state machine with its hard deadline
//! - Event-driven streaming session state machine
//! - Fixed status screen layouts
//! - Configuration type definitions and timing constants

#![no_std]
#![deny(unsafe_code)]

// Host-side tests run with std (proptest needs it)
#[cfg(test)]
extern crate std;

pub mod config;
pub mod link;
pub mod screen;
pub mod session;
pub mod traits;
