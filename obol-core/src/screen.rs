//! Fixed status screens
//!
//! Layouts for the 128x64 panel: the setup title on the top row, detail
//! lines in the region below it. Every screen is a full redraw followed
//! by one flush; the sink's frame buffer is the only double-buffering.

use core::fmt::Write;

use heapless::String;

use crate::traits::{Color, DisplayError, DisplaySink, TextSize};

/// Title row shared by all network status screens
pub const SETUP_TITLE: &str = "WiFi/WebSocket Setup";

/// Longest dotted-quad address
const ADDR_LEN: usize = 15;

fn title<D: DisplaySink>(display: &mut D) -> Result<(), DisplayError> {
    display.clear()?;
    display.set_color(Color::On);
    display.set_text_size(TextSize::Small);
    display.set_cursor(3, 0);
    display.print(SETUP_TITLE)
}

/// Link bring-up in progress
pub fn link_connecting<D: DisplaySink>(display: &mut D, ssid: &str) -> Result<(), DisplayError> {
    title(display)?;
    display.set_cursor(5, 18);
    display.print("Connecting to:")?;
    display.set_cursor(5, 27);
    display.print(ssid)?;
    display.flush()
}

/// Link associated, address assigned
pub fn link_connected<D: DisplaySink>(
    display: &mut D,
    ssid: &str,
    addr: [u8; 4],
) -> Result<(), DisplayError> {
    title(display)?;
    display.set_cursor(5, 18);
    display.print("Connected to:")?;
    display.set_cursor(5, 27);
    display.print(ssid)?;
    display.set_cursor(5, 38);
    display.print("IP Address:")?;
    display.set_cursor(5, 47);
    display.print(format_addr(addr).as_str())?;
    display.flush()
}

/// Session handshake in progress (also shown on every reconnect)
pub fn stream_connecting<D: DisplaySink>(display: &mut D, host: &str) -> Result<(), DisplayError> {
    title(display)?;
    display.set_cursor(5, 18);
    display.print("Connecting to:")?;
    display.set_cursor(5, 27);
    display.print(host)?;
    display.flush()
}

/// Session established
pub fn stream_connected<D: DisplaySink>(display: &mut D) -> Result<(), DisplayError> {
    display.set_cursor(5, 38);
    display.print("WebSocket Connected")?;
    display.flush()
}

fn format_addr(addr: [u8; 4]) -> String<ADDR_LEN> {
    let mut out = String::new();
    // Cannot overflow: 4 octets never exceed 15 chars
    let _ = write!(out, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3]);
    out
}
