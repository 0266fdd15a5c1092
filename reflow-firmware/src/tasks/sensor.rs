//! Thermocouple sensor task
//!
//! Both MCP9600 amplifiers share I2C0. Each is read over the bus in turn;
//! channel 2 is only polled when the second heater is configured.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker, Timer};

use reflow_core::runtime::sensor_cycle;
use reflow_core::state::{Channel, ReadingOutcome};
use reflow_drivers::sensor::{Mcp9600, ADDR_T1, ADDR_T2};

use crate::channels::{CONFIG, PROCESS};

/// Cycle period (ms)
const PERIOD_MS: u64 = 200;

/// Longest wait for the process record (ms)
const LOCK_BUDGET_MS: u64 = 5;

/// Rejected readings between repeated warnings (10 s at 200 ms)
const WARN_EVERY: u32 = 50;

/// The shared thermocouple bus
pub type SensorBus = I2c<'static, I2C0, Async>;

/// Consecutive rejected readings of one channel
struct RejectCounter {
    channel: Channel,
    count: u32,
}

impl RejectCounter {
    const fn new(channel: Channel) -> Self {
        Self { channel, count: 0 }
    }

    fn record(&mut self, outcome: ReadingOutcome) {
        match outcome {
            ReadingOutcome::Rejected => {
                if self.count % WARN_EVERY == 0 {
                    warn!(
                        "Sensor {}: no valid reading ({} consecutive)",
                        self.channel,
                        self.count + 1
                    );
                }
                self.count = self.count.saturating_add(1);
            }
            ReadingOutcome::Stored(_) => {
                if self.count > 0 {
                    info!("Sensor {}: readings restored", self.channel);
                }
                self.count = 0;
            }
            ReadingOutcome::Skipped => trace!("Sensor {}: process state busy", self.channel),
        }
    }
}

#[embassy_executor::task]
pub async fn sensor_task(mut bus: SensorBus) {
    info!(
        "Sensor task started: T1 at {:#x}, T2 at {:#x}",
        ADDR_T1, ADDR_T2
    );

    let mut t1 = RejectCounter::new(Channel::One);
    let mut t2 = RejectCounter::new(Channel::Two);
    let mut ticker = Ticker::every(Duration::from_millis(PERIOD_MS));

    loop {
        ticker.next().await;

        let mut sensor = Mcp9600::new(&mut bus, ADDR_T1);
        let outcome = sensor_cycle(
            &PROCESS,
            &CONFIG,
            Channel::One,
            &mut sensor,
            Timer::after_millis(LOCK_BUDGET_MS),
        )
        .await;
        t1.record(outcome);

        if CONFIG.get().ssr2_present {
            let mut sensor = Mcp9600::new(&mut bus, ADDR_T2);
            let outcome = sensor_cycle(
                &PROCESS,
                &CONFIG,
                Channel::Two,
                &mut sensor,
                Timer::after_millis(LOCK_BUDGET_MS),
            )
            .await;
            t2.record(outcome);
        }
    }
}
