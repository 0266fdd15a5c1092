//! Solid-state relay heater output
//!
//! Drives an SSR input from a GPIO line. The line can be active-high
//! (default) or active-low for inverting driver stages.

use embedded_hal::digital::OutputPin;
use reflow_core::traits::HeaterOutput;

/// SSR heater output
pub struct SsrOutput<P> {
    pin: P,
    /// If true, heater ON = pin LOW
    inverted: bool,
    /// Current logical state (true = heater on)
    on: bool,
}

impl<P: OutputPin> SsrOutput<P> {
    /// Create a new SSR output, initially off
    ///
    /// # Arguments
    /// - `pin`: The GPIO line wired to the SSR input
    /// - `inverted`: If true, the heater is ON when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut ssr = Self {
            pin,
            inverted,
            on: true,
        };
        ssr.set_on(false);
        ssr
    }

    /// Create a new SSR output with active-high drive
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a new SSR output with active-low drive
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Release the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> HeaterOutput for SsrOutput<P> {
    fn set_on(&mut self, on: bool) {
        // Normal: on=true, inverted=false -> high
        // Inverted: on=true, inverted=true -> low
        let result = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };

        match result {
            Ok(()) => self.on = on,
            Err(_) => warn!("SSR pin write failed"),
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
