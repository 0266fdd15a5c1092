//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in reflow-core:
//!
//! - Heater outputs (SSR on a GPIO line)
//! - Temperature sensors (MCP9600 thermocouple amplifier over I2C)

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod heater;
pub mod sensor;
