//! Oven lifecycle and shared process state
//!
//! The state machine defines which collaborator has heater authority.
//! The process record is the single piece of state every periodic task
//! reads or writes.

pub mod events;
pub mod machine;
pub mod process;

pub use events::{Command, Event};
pub use machine::{FaultKind, OvenState};
pub use process::{
    ingest_reading, Channel, ProcessState, ReadingOutcome, SENSOR_FAULT_SENTINEL,
    SENSOR_SENTINEL_BELOW_C,
};
