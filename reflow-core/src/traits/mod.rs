//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod heater;

pub use heater::{HeaterOutput, SensorError, TemperatureSensor};
