//! Dual-channel PID heater control
//!
//! Each channel turns (target, measured) into a 0-100 % power command.
//! The loop runs at a fixed period, so the derivative is a plain first
//! difference of the error and the integral is a plain sum.
//!
//! Anti-windup is two independent clamps: the integral accumulator is
//! capped at ±[`INTEGRAL_LIMIT`], and the output is clamped to 0-100 %.

use crate::config::{PidGains, SystemConfig};
use crate::state::{Channel, ProcessState};

/// Integral accumulator bound (°C·ticks)
pub const INTEGRAL_LIMIT: f32 = 2500.0;

/// Maximum power command (%)
pub const MAX_POWER: f32 = 100.0;

/// PID memory and law for one heater channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidChannel {
    /// Accumulated error, clamped to ±INTEGRAL_LIMIT
    integral: f32,
    /// Error from the previous tick
    last_error: f32,
}

impl PidChannel {
    /// Channel at rest
    pub const fn new() -> Self {
        Self {
            integral: 0.0,
            last_error: 0.0,
        }
    }

    /// Run one control tick and return the power command (0-100 %)
    ///
    /// A non-finite error (missing target or reading) commands zero power
    /// and leaves the memory untouched.
    pub fn update(&mut self, gains: &PidGains, target_c: f32, measured_c: f32) -> f32 {
        let error = target_c - measured_c;
        if !error.is_finite() {
            return 0.0;
        }

        self.integral = (self.integral + error).clamp(-INTEGRAL_LIMIT, INTEGRAL_LIMIT);
        let derivative = error - self.last_error;
        self.last_error = error;

        let output = gains.kp * error + gains.ki * self.integral + gains.kd * derivative;
        if output.is_nan() {
            return 0.0;
        }
        output.clamp(0.0, MAX_POWER)
    }

    /// Return to rest
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current integral accumulator
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Error seen on the previous tick
    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    /// Check if the memory is at rest
    pub fn is_at_rest(&self) -> bool {
        self.integral == 0.0 && self.last_error == 0.0
    }
}

/// Both heater channels
///
/// Channel 2 follows the channel 1 error: both elements heat the same
/// chamber and only channel 1 carries the control thermocouple.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualChannelPid {
    channels: [PidChannel; 2],
    /// Control epoch the memory belongs to
    epoch: u32,
}

impl DualChannelPid {
    /// Both channels at rest
    pub const fn new() -> Self {
        Self {
            channels: [PidChannel::new(), PidChannel::new()],
            epoch: 0,
        }
    }

    /// Run one control cycle against a process snapshot
    ///
    /// Gains are taken from `config` on every call. Outside active control
    /// both channels are reset and command zero power. Memory is also
    /// dropped whenever the control epoch moved since the last call, so a
    /// new run never inherits the integral of one this task never saw end.
    /// Channel 2 stays at rest unless the configuration marks it present.
    pub fn cycle(&mut self, config: &SystemConfig, process: &ProcessState) -> [f32; 2] {
        if process.control_epoch != self.epoch {
            debug!("PID: control epoch {} -> {}, resetting", self.epoch, process.control_epoch);
            self.reset();
            self.epoch = process.control_epoch;
        }

        if !process.state.is_active_control() {
            self.reset();
            return [0.0, 0.0];
        }

        let target_c = process.target;
        let measured_ch1_c = process.measured_ch1;

        let gains1 = config.gains(Channel::One).effective();
        let power1 = self.channels[0].update(&gains1, target_c, measured_ch1_c);

        let power2 = if config.ssr2_present {
            let gains2 = config.gains(Channel::Two).effective();
            self.channels[1].update(&gains2, target_c, measured_ch1_c)
        } else {
            self.channels[1].reset();
            0.0
        };

        [power1, power2]
    }

    /// Return both channels to rest
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    /// Memory of one channel
    pub fn channel(&self, channel: Channel) -> &PidChannel {
        &self.channels[channel.index()]
    }
}
