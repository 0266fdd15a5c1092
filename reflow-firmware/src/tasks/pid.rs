//! PID task
//!
//! Computes both channel powers from the shared record every cycle.

use defmt::*;
use embassy_time::{Duration, Ticker, Timer};

use reflow_core::control::DualChannelPid;
use reflow_core::runtime::{pid_cycle, CycleOutcome};

use crate::channels::{CONFIG, PROCESS};

/// Cycle period (ms)
const PERIOD_MS: u64 = 200;

/// Longest wait for the process record (ms)
const LOCK_BUDGET_MS: u64 = 10;

#[embassy_executor::task]
pub async fn pid_task() {
    info!("PID task started");

    let mut pid = DualChannelPid::new();
    let mut ticker = Ticker::every(Duration::from_millis(PERIOD_MS));

    loop {
        ticker.next().await;

        if pid_cycle(&PROCESS, &CONFIG, &mut pid, || Timer::after_millis(LOCK_BUDGET_MS)).await
            == CycleOutcome::Skipped
        {
            trace!("PID cycle skipped");
        }
    }
}
