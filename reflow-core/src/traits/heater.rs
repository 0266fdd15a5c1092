//! Heater output and temperature sensor traits

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed (no ACK, arbitration loss, timeout)
    Bus,
    /// Reading out of expected range
    OutOfRange,
}

/// Trait for thermocouple channels
///
/// Implementations own their bus access. A failed read is reported as an
/// error; the sensor task converts it to the sentinel reading so the
/// process record keeps its last good value.
#[allow(async_fn_in_trait)]
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    async fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Trait for heater output control
///
/// Implementations switch the heater element, typically through an SSR.
pub trait HeaterOutput {
    /// Turn the heater on or off
    fn set_on(&mut self, on: bool);

    /// Check if the heater is currently on
    fn is_on(&self) -> bool;
}
