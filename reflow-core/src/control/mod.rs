//! Heater control
//!
//! PID power computation and its conversion to relay on/off timing.

pub mod pid;
pub mod proportioning;

pub use pid::{DualChannelPid, PidChannel, INTEGRAL_LIMIT, MAX_POWER};
pub use proportioning::{TimeProportioner, DEFAULT_WINDOW_TICKS};
