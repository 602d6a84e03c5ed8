//! Lifecycle orchestrator task
//!
//! The top-level driver: boot splash, then link bring-up (blocking wait
//! with the hard deadline), then session bring-up, then the service loop
//! that pumps the stream session forever. The link is not re-supervised
//! after bring-up; a dropped link surfaces as session disconnects and
//! rides the transport's retry interval.

use cortex_m::peripheral::SCB;
use cyw43::JoinOptions;
use defmt::*;
use embassy_net::Stack;
use embassy_time::{Duration, Instant, Ticker, Timer};

use obol_core::config::{CONNECT_DWELL_MS, LINK_POLL_INTERVAL_MS};
use obol_core::link::{BringUp, LinkManager};
use obol_core::screen;
use obol_core::session::StreamSession;

use crate::config;
use crate::display::BoardOled;
use crate::logo;
use crate::net::ChannelTransport;

/// Service loop cadence; bounds event-dispatch latency
const SERVICE_TICK_MS: u64 = 5;

/// Inbound frames are delivered verbatim; rendering them is up to the
/// handler, and this one only logs.
fn log_frame(payload: &[u8]) {
    info!("ledger frame: {=usize} bytes", payload.len());
}

/// Lifecycle task - sequences bring-up, then pumps the session
#[embassy_executor::task]
pub async fn lifecycle_task(
    mut control: cyw43::Control<'static>,
    stack: Stack<'static>,
    mut oled: BoardOled,
) {
    info!("Lifecycle task started");

    logo::show(&mut oled).await;

    bring_up_link(&mut control, stack, &mut oled).await;

    let mut transport = ChannelTransport;
    let mut session = StreamSession::new(config::ENDPOINT, Some(log_frame as fn(&[u8])));
    session.begin(&mut transport, &mut oled);

    let mut ticker = Ticker::every(Duration::from_millis(SERVICE_TICK_MS));
    loop {
        session.service(&mut transport, &mut oled);
        ticker.next().await;
    }
}

/// Blocking link bring-up: returns associated with an address, or resets
/// the device when the deadline expires.
async fn bring_up_link(
    control: &mut cyw43::Control<'static>,
    stack: Stack<'static>,
    oled: &mut BoardOled,
) {
    let mut link = LinkManager::new();
    link.begin(Instant::now().as_millis());

    let _ = screen::link_connecting(oled, config::NETWORK.ssid);
    info!("wifi: joining {=str}", config::NETWORK.ssid);

    // Keep issuing join attempts until the manager reaches a verdict.
    // After a successful join the same deadline covers DHCP.
    loop {
        match control
            .join(
                config::NETWORK.ssid,
                JoinOptions::new(config::NETWORK.secret.as_bytes()),
            )
            .await
        {
            Ok(()) => {
                debug!("wifi: associated, waiting for address");
                loop {
                    match link.poll(Instant::now().as_millis(), stack.is_config_up()) {
                        BringUp::Up => {
                            let addr = stack
                                .config_v4()
                                .map(|c| c.address.address().octets())
                                .unwrap_or([0, 0, 0, 0]);
                            info!(
                                "wifi: connected, ip {=u8}.{=u8}.{=u8}.{=u8}",
                                addr[0], addr[1], addr[2], addr[3]
                            );
                            let _ = screen::link_connected(oled, config::NETWORK.ssid, addr);
                            Timer::after_millis(CONNECT_DWELL_MS).await;
                            return;
                        }
                        BringUp::Retry => {
                            Timer::after_millis(LINK_POLL_INTERVAL_MS).await;
                        }
                        BringUp::GiveUp => restart(),
                    }
                }
            }
            Err(e) => {
                warn!("wifi: join failed, status {=u32}", e.status);
                match link.poll(Instant::now().as_millis(), false) {
                    BringUp::GiveUp => restart(),
                    _ => Timer::after_millis(LINK_POLL_INTERVAL_MS).await,
                }
            }
        }
    }
}

/// The declared recovery for a bring-up timeout: a fresh boot
fn restart() -> ! {
    error!("wifi: bring-up deadline expired, restarting");
    SCB::sys_reset()
}
