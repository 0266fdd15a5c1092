//! Task plumbing shared by every control loop
//!
//! - `SharedProcess` / `SharedConfig`: the containers each task gets a handle to
//! - `CommandQueue`: bounded, non-blocking lifecycle command FIFO
//! - `cycles`: the body of one period of each task, runtime agnostic

pub mod cycles;
pub mod queue;
pub mod shared;

pub use cycles::{lifecycle_cycle, output_cycle, pid_cycle, safety_cycle, sensor_cycle, CycleOutcome};
pub use queue::{CommandQueue, PendingCommands, COMMAND_QUEUE_DEPTH};
pub use shared::{SharedConfig, SharedProcess};
