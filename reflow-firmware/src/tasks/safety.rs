//! Over-temperature safety task
//!
//! Never waits on the process record. A contended cycle is counted and
//! retried on the next tick.

use defmt::*;
use embassy_time::{Duration, Ticker};

use reflow_core::runtime::safety_cycle;
use reflow_core::safety::SafetyMonitor;

use crate::channels::PROCESS;

/// Cycle period (ms)
const PERIOD_MS: u64 = 100;

/// Cycles between summary lines (60 s)
const SUMMARY_EVERY: u32 = 600;

#[embassy_executor::task]
pub async fn safety_task() {
    let mut monitor = SafetyMonitor::new();
    info!("Safety task started: ceiling {}°C", monitor.ceiling_c());

    let mut ticker = Ticker::every(Duration::from_millis(PERIOD_MS));
    let mut cycles: u32 = 0;

    loop {
        ticker.next().await;

        if safety_cycle(&PROCESS, &mut monitor).is_none() {
            trace!("Safety check skipped ({} total)", monitor.skipped_cycles());
        }

        cycles = cycles.wrapping_add(1);
        if cycles % SUMMARY_EVERY == 0 {
            info!(
                "Safety: {} over-temperature trips, {} skipped checks",
                monitor.trips(),
                monitor.skipped_cycles()
            );
        }
    }
}
