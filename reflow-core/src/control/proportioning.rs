//! Time-proportioned SSR output
//!
//! Solid-state relays on resistive heaters cannot follow real PWM, so each
//! channel is switched over a fixed window of ticks: on for the first
//! `round(power / 100 * N)` ticks, off for the rest. The on count is
//! recomputed from the current power every tick, so a new command takes
//! effect on the next tick rather than at window rollover.

use super::pid::MAX_POWER;

/// Ticks per window (10 ticks at 20 ms = 200 ms window)
pub const DEFAULT_WINDOW_TICKS: u8 = 10;

/// Window position shared by both channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeProportioner {
    window_ticks: u8,
    tick: u8,
}

impl Default for TimeProportioner {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_TICKS)
    }
}

impl TimeProportioner {
    /// Create a proportioner with `window_ticks` ticks per window (min 1)
    pub const fn new(window_ticks: u8) -> Self {
        Self {
            window_ticks: if window_ticks == 0 { 1 } else { window_ticks },
            tick: 0,
        }
    }

    /// Number of active ticks per window for a power command
    pub fn on_ticks(&self, power: f32) -> u8 {
        // NaN clamps to NaN and then casts to 0
        let power = power.clamp(0.0, MAX_POWER);
        let exact = power / MAX_POWER * self.window_ticks as f32;
        (exact + 0.5) as u8
    }

    /// Output levels for the current tick, then advance the window
    pub fn tick(&mut self, powers: [f32; 2]) -> [bool; 2] {
        let levels = powers.map(|p| self.tick < self.on_ticks(p));
        self.tick = (self.tick + 1) % self.window_ticks;
        levels
    }

    /// Position within the window
    pub fn position(&self) -> u8 {
        self.tick
    }

    /// Ticks per window
    pub fn window_ticks(&self) -> u8 {
        self.window_ticks
    }
}
