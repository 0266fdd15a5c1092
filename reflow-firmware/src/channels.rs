//! Inter-task shared state
//!
//! Defines the static containers every task works through. Uses
//! embassy-sync primitives behind a critical-section mutex so the
//! lock holders can live on any executor.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use reflow_core::config::SystemConfig;
use reflow_core::runtime::{CommandQueue, SharedConfig, SharedProcess, COMMAND_QUEUE_DEPTH};

/// The process record (lifecycle state, temperatures, target, powers)
pub static PROCESS: SharedProcess<CriticalSectionRawMutex> = SharedProcess::new();

/// Live system configuration, replaced at boot from the embedded document
pub static CONFIG: SharedConfig<CriticalSectionRawMutex> = SharedConfig::new(SystemConfig::new());

/// Operator commands for the lifecycle task
pub static COMMANDS: CommandQueue<CriticalSectionRawMutex, COMMAND_QUEUE_DEPTH> =
    CommandQueue::new();
