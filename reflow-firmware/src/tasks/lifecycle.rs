//! Lifecycle task
//!
//! Drains operator commands and runs the automatic transitions (startup,
//! pre-check, profile timeline, cooldown) against the shared record.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker, Timer};

use reflow_core::controller::ProcessController;
use reflow_core::runtime::{lifecycle_cycle, CycleOutcome, PendingCommands, COMMAND_QUEUE_DEPTH};
use reflow_core::scheduler::ReflowProfile;

use crate::channels::{COMMANDS, PROCESS};

/// Cycle period (ms)
const PERIOD_MS: u64 = 100;

/// Longest wait for the process record (ms)
const LOCK_BUDGET_MS: u64 = 50;

#[embassy_executor::task]
pub async fn lifecycle_task(profile: ReflowProfile) {
    info!(
        "Lifecycle task started: profile '{}', {} segments, {}s",
        profile.name.as_str(),
        profile.len(),
        profile.total_duration_s()
    );

    let mut controller = ProcessController::new(profile);
    let mut ticker = Ticker::every(Duration::from_millis(PERIOD_MS));
    let mut pending = PendingCommands::<COMMAND_QUEUE_DEPTH>::new();
    let mut skipped: u32 = 0;

    loop {
        ticker.next().await;

        let now_ms = Instant::now().as_millis();
        let outcome = lifecycle_cycle(
            &PROCESS,
            &COMMANDS,
            &mut pending,
            &mut controller,
            now_ms,
            || Timer::after_millis(LOCK_BUDGET_MS),
        )
        .await;

        match outcome {
            CycleOutcome::Completed => skipped = 0,
            CycleOutcome::Skipped => {
                skipped = skipped.saturating_add(1);
                if skipped % 10 == 0 {
                    warn!("Lifecycle: {} consecutive cycles skipped", skipped);
                }
            }
            CycleOutcome::Superseded => debug!("Lifecycle: plan superseded by concurrent change"),
        }
    }
}
