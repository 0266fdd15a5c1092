//! Reflow - Dual-Heater Reflow Oven Firmware
//!
//! Main firmware binary for RP2040-based reflow oven controllers.
//! Two SSR-driven heaters, two MCP9600 thermocouple amplifiers on one
//! I2C bus, and a start/stop button.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker};
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use reflow_core::config::{load_profile_or_default, load_system_config_or_default};
use reflow_drivers::heater::SsrOutput;

use crate::channels::{COMMANDS, CONFIG, PROCESS};

// Heap allocator for JSON parsing
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 16KB
const HEAP_SIZE: usize = 16 * 1024;

/// Embedded system configuration (compiled into firmware)
/// Edit config/system.json and rebuild to customize
const EMBEDDED_SYSTEM: &str = include_str!("../config/system.json");

/// Embedded default profile
const EMBEDDED_PROFILE: &str = include_str!("../config/default_profile.json");

/// Thermocouple bus clock (Hz)
const I2C_FREQUENCY_HZ: u32 = 100_000;

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Reflow firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Configuration is parsed once; the heap is only used here
    let system = load_system_config_or_default(Some(EMBEDDED_SYSTEM));
    CONFIG.set(system);
    info!(
        "System config: ssr2_present={}, offsets T1={}°C T2={}°C",
        system.ssr2_present, system.t1_offset, system.t2_offset
    );

    let profile = load_profile_or_default(Some(EMBEDDED_PROFILE));
    info!("Configuration loaded");

    // Setup SSR outputs
    // Pin assignments are board-specific (SSR1: GPIO26, SSR2: GPIO27)
    let ssr1 = SsrOutput::new_active_high(Output::new(p.PIN_26, Level::Low));
    let ssr2 = SsrOutput::new_active_high(Output::new(p.PIN_27, Level::Low));
    info!("SSR outputs initialized (off)");

    // Setup I2C0 for both thermocouple amplifiers (SDA: GPIO4, SCL: GPIO5)
    let i2c_config = {
        let mut cfg = i2c::Config::default();
        cfg.frequency = I2C_FREQUENCY_HZ;
        cfg
    };
    let bus = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);
    info!("I2C initialized for thermocouple amplifiers");

    // Start/stop button (GPIO0, active low)
    let button = Input::new(p.PIN_0, Pull::Up);

    // Spawn tasks, safety first so it is polling before anything can heat
    spawner.spawn(unwrap!(tasks::safety_task()));
    spawner.spawn(unwrap!(tasks::ssr_task(ssr1, ssr2)));
    spawner.spawn(unwrap!(tasks::sensor_task(bus)));
    spawner.spawn(unwrap!(tasks::pid_task()));
    spawner.spawn(unwrap!(tasks::lifecycle_task(profile)));
    spawner.spawn(unwrap!(tasks::button_task(button)));

    info!("All tasks spawned, firmware running");

    // Main task only reports status
    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        ticker.next().await;
        match PROCESS.try_snapshot() {
            Some(process) => info!(
                "{} T1={}°C T2={}°C target={}°C power={}%/{}% (dropped commands: {})",
                process.state,
                process.measured_ch1,
                process.measured_ch2,
                process.target,
                process.power_ch1,
                process.power_ch2,
                COMMANDS.dropped()
            ),
            None => trace!("Status: process state busy"),
        }
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
