//! Safety monitoring
//!
//! Detects over-temperature and forces the fault state.

pub mod monitor;

pub use monitor::{SafetyMonitor, SafetyStatus, OVERTEMP_CEILING_C};
