//! SSR output task
//!
//! Switches both relays on the time-proportioning window. Lines are
//! forced off whenever the power command cannot be read in time.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker, Timer};

use reflow_core::control::{TimeProportioner, DEFAULT_WINDOW_TICKS};
use reflow_core::runtime::{output_cycle, CycleOutcome};
use reflow_drivers::heater::SsrOutput;

use crate::channels::PROCESS;

/// Tick period (ms); the window spans `DEFAULT_WINDOW_TICKS` ticks
const TICK_MS: u64 = 20;

/// Longest wait for the process record (ms)
const LOCK_BUDGET_MS: u64 = 10;

/// One relay line
pub type SsrLine = SsrOutput<Output<'static>>;

#[embassy_executor::task]
pub async fn ssr_task(mut ssr1: SsrLine, mut ssr2: SsrLine) {
    let mut proportioner = TimeProportioner::new(DEFAULT_WINDOW_TICKS);
    info!(
        "SSR task started: {}ms window",
        TICK_MS * proportioner.window_ticks() as u64
    );

    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

    loop {
        ticker.next().await;

        let outcome = output_cycle(
            &PROCESS,
            &mut proportioner,
            &mut ssr1,
            &mut ssr2,
            Timer::after_millis(LOCK_BUDGET_MS),
        )
        .await;

        if outcome == CycleOutcome::Skipped {
            trace!("SSR: power read timed out, outputs off");
        }
    }
}
