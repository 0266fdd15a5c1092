//! Temperature sensor implementations

pub mod mcp9600;

pub use mcp9600::{Mcp9600, ADDR_T1, ADDR_T2};
