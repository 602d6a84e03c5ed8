//! Boot splash
//!
//! Coin mark and device name, held briefly before network bring-up
//! starts. Pure display sequencing; the lifecycle machines are untouched.

use embassy_time::Timer;

use obol_core::traits::{Color, DisplayError, DisplaySink, TextSize};

/// 16x16 1bpp coin mark, row-major, MSB first
pub const COIN_MARK: [u8; 32] = [
    0x01, 0x80, //
    0x03, 0xC0, //
    0x06, 0x60, //
    0x0C, 0x30, //
    0x18, 0x18, //
    0x30, 0x0C, //
    0x60, 0x06, //
    0xC0, 0x03, //
    0xC0, 0x03, //
    0x60, 0x06, //
    0x30, 0x0C, //
    0x18, 0x18, //
    0x0C, 0x30, //
    0x06, 0x60, //
    0x03, 0xC0, //
    0x01, 0x80, //
];

pub const COIN_MARK_W: u32 = 16;
pub const COIN_MARK_H: u32 = 16;

/// How long the splash stays up
const SPLASH_DWELL_MS: u64 = 3_000;

/// Draw the splash and hold it for the dwell time
pub async fn show<D: DisplaySink>(display: &mut D) {
    let _ = draw(display);
    Timer::after_millis(SPLASH_DWELL_MS).await;
}

fn draw<D: DisplaySink>(display: &mut D) -> Result<(), DisplayError> {
    display.clear()?;
    display.set_color(Color::On);
    display.set_text_size(TextSize::Large);
    display.set_cursor(44, 8);
    display.print("OBOL")?;
    display.draw_bitmap(&COIN_MARK, 56, 36, COIN_MARK_W, COIN_MARK_H)?;
    display.flush()
}
