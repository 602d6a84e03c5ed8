//! Obol - Pocket Ledger Ticker Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico W: joins the wireless
//! network, holds a WebSocket-over-TLS session to the public ledger feed,
//! and renders connection status on the 128x64 OLED.
//!
//! Named after the obol, the smallest coin of ancient Greece - a
//! pocket-sized token of a much larger ledger.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use rand_core::RngCore;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::display::Oled;

mod channels;
mod config;
mod display;
mod logo;
mod net;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// CYW43439 radio firmware blobs; see cyw43-firmware/README.md
const CYW43_FW: &[u8] = include_bytes!("../cyw43-firmware/43439A0.bin");
const CYW43_CLM: &[u8] = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

// Static cells for driver state (must live forever for task references)
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<6>> = StaticCell::new();

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Obol firmware starting...");

    let p = embassy_rp::init(Default::default());
    let mut rng = RoscRng;
    info!("Peripherals initialized");

    // OLED on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let mut oled = Oled::new(i2c);
    if oled.init().is_err() {
        // Keep going headless; connectivity works without status
        warn!("OLED init failed, running without display");
    }

    // CYW43 radio over PIO SPI (on-board wiring: PWR=23, CS=25, DIO=24, CLK=29)
    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, CYW43_FW).await;
    spawner.spawn(cyw43_task(runner)).unwrap();

    control.init(CYW43_CLM).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialized");

    // Network stack with DHCP
    let dhcp = embassy_net::Config::dhcpv4(Default::default());
    let seed = rng.next_u64();
    let (stack, runner) = embassy_net::new(
        net_device,
        dhcp,
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();
    info!("Network stack initialized");

    spawner.spawn(net::connection_task(stack)).unwrap();
    spawner.spawn(tasks::lifecycle_task(control, stack, oled)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
