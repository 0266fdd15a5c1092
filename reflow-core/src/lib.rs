//! Board-agnostic control core for the reflow oven firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Oven lifecycle state machine and process controller
//! - Reflow profile timeline (elapsed time to target temperature)
//! - Dual-channel PID and time-proportioned SSR output
//! - Over-temperature safety monitor
//! - Shared process state, command queue and per-cycle task bodies
//! - Configuration types and their persisted JSON form

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[cfg(feature = "serde")]
extern crate alloc;

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod controller;
pub mod runtime;
pub mod safety;
pub mod scheduler;
pub mod state;
pub mod traits;
