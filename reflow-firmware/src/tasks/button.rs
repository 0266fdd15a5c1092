//! Start/stop button task
//!
//! Polls the front-panel button and posts one command per debounced
//! press. What a press means depends on the lifecycle state:
//! IDLE starts a run, an active run stops, a fault is acknowledged.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};

use reflow_core::state::{Command, OvenState};

use crate::channels::{COMMANDS, PROCESS};

/// Poll period (ms)
const POLL_MS: u64 = 10;

/// Level must be stable this long before a press counts (ms)
const DEBOUNCE_MS: u64 = 50;

/// Command for a press in `state`
fn press_command(state: OvenState) -> Option<Command> {
    match state {
        OvenState::Idle => Some(Command::Start),
        OvenState::PreCheck | OvenState::Running | OvenState::Manual => Some(Command::Stop),
        OvenState::Fault(_) => Some(Command::AcknowledgeFault),
        OvenState::Init | OvenState::Cooldown => None,
    }
}

/// Button wired to ground with the internal pull-up (pressed = low)
#[embassy_executor::task]
pub async fn button_task(button: Input<'static>) {
    info!("Button task started");

    let stable_polls = (DEBOUNCE_MS / POLL_MS) as u32;
    let mut ticker = Ticker::every(Duration::from_millis(POLL_MS));
    let mut pressed = false;
    let mut candidate = false;
    let mut held: u32 = 0;

    loop {
        ticker.next().await;

        let level = button.is_low();
        if level != candidate {
            candidate = level;
            held = 0;
            continue;
        }
        held = held.saturating_add(1);
        if held < stable_polls || candidate == pressed {
            continue;
        }

        pressed = candidate;
        if !pressed {
            continue;
        }

        let Some(process) = PROCESS.try_snapshot() else {
            debug!("Button: process state busy, press ignored");
            continue;
        };
        if let Some(command) = press_command(process.state) {
            debug!("Button: {} in {}", command, process.state);
            COMMANDS.post(command);
        }
    }
}
