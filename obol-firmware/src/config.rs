//! Compile-time device configuration
//!
//! Network identity and the remote feed endpoint. Credentials are opaque
//! inputs; provisioning them means editing this file and reflashing.

use obol_core::config::{Endpoint, NetConfig};

/// Wireless network to join in station mode
pub const NETWORK: NetConfig = NetConfig {
    ssid: "XRPL_wifi",
    secret: "Qwerty123",
};

/// Public ledger feed endpoint (WebSocket over TLS)
pub const ENDPOINT: Endpoint = Endpoint {
    host: "s1.ripple.com",
    port: 443,
    path: "/",
};
