//! MCP9600 thermocouple amplifier
//!
//! Reads the cold-junction-compensated hot-junction register. The value is
//! a big-endian two's complement word with 0.0625 °C per bit.

use embedded_hal_async::i2c::I2c;
use reflow_core::traits::{SensorError, TemperatureSensor};

/// Default address of the channel 1 amplifier
pub const ADDR_T1: u8 = 0x60;

/// Default address of the channel 2 amplifier
pub const ADDR_T2: u8 = 0x67;

/// Hot-junction temperature register
const REG_HOT_JUNCTION: u8 = 0x00;

/// Degrees per LSB
const LSB_C: f32 = 0.0625;

/// K-type thermocouple range (°C)
const MIN_C: f32 = -200.0;
const MAX_C: f32 = 1372.0;

/// MCP9600 on an I2C bus
///
/// Several amplifiers can share one bus by constructing each over
/// `&mut bus` for the duration of a read.
pub struct Mcp9600<I> {
    bus: I,
    address: u8,
}

impl<I: I2c> Mcp9600<I> {
    /// Create a driver for the amplifier at `address`
    pub fn new(bus: I, address: u8) -> Self {
        Self { bus, address }
    }

    /// Release the bus
    pub fn release(self) -> I {
        self.bus
    }

    /// Read the raw hot-junction register
    pub async fn read_raw(&mut self) -> Result<i16, SensorError> {
        let mut buf = [0u8; 2];
        self.bus
            .write_read(self.address, &[REG_HOT_JUNCTION], &mut buf)
            .await
            .map_err(|_| SensorError::Bus)?;
        Ok(i16::from_be_bytes(buf))
    }
}

/// Convert a hot-junction register value to °C
pub fn decode_celsius(raw: i16) -> f32 {
    raw as f32 * LSB_C
}

impl<I: I2c> TemperatureSensor for Mcp9600<I> {
    async fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let celsius = decode_celsius(self.read_raw().await?);
        if !(MIN_C..=MAX_C).contains(&celsius) {
            return Err(SensorError::OutOfRange);
        }
        Ok(celsius)
    }
}
