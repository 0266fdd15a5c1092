//! Heater output implementations

pub mod ssr;

pub use ssr::SsrOutput;
