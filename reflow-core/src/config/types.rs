//! Configuration type definitions
//!
//! Tunables read by the control loop every cycle. The persisted JSON form
//! lives in [`super::persist`].

use crate::state::Channel;

/// PID gains for one heater channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PidGains {
    /// Built-in gains, tuned for a converted toaster oven
    pub const DEFAULT: Self = Self {
        kp: 4.0,
        ki: 0.02,
        kd: 50.0,
    };

    /// Create gains
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    /// Gains with every non-positive or non-finite term replaced by its default
    pub fn effective(&self) -> Self {
        Self {
            kp: usable_or(self.kp, Self::DEFAULT.kp),
            ki: usable_or(self.ki, Self::DEFAULT.ki),
            kd: usable_or(self.kd, Self::DEFAULT.kd),
        }
    }
}

fn usable_or(gain: f32, default: f32) -> f32 {
    if gain.is_finite() && gain > 0.0 {
        gain
    } else {
        default
    }
}

/// System configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig {
    /// Channel 1 gains
    pub ssr1: PidGains,
    /// Channel 2 gains
    pub ssr2: PidGains,
    /// Second heater fitted
    pub ssr2_present: bool,
    /// Calibration offset added to channel 1 readings (°C)
    pub t1_offset: f32,
    /// Calibration offset added to channel 2 readings (°C)
    pub t2_offset: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemConfig {
    /// Built-in configuration: default gains, single heater, no offsets
    pub const fn new() -> Self {
        Self {
            ssr1: PidGains::DEFAULT,
            ssr2: PidGains::DEFAULT,
            ssr2_present: false,
            t1_offset: 0.0,
            t2_offset: 0.0,
        }
    }

    /// Configured gains for a channel (not yet defaulted)
    pub fn gains(&self, channel: Channel) -> PidGains {
        match channel {
            Channel::One => self.ssr1,
            Channel::Two => self.ssr2,
        }
    }

    /// Calibration offset for a channel
    pub fn offset(&self, channel: Channel) -> f32 {
        match channel {
            Channel::One => self.t1_offset,
            Channel::Two => self.t2_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SystemConfig::default();
        assert_eq!(config.ssr1, PidGains::DEFAULT);
        assert_eq!(config.ssr2, PidGains::DEFAULT);
        assert!(!config.ssr2_present);
        assert_eq!(config.offset(Channel::One), 0.0);
    }

    #[test]
    fn test_effective_substitutes_per_gain() {
        let gains = PidGains::new(0.0, 0.05, -3.0);
        let effective = gains.effective();

        assert_eq!(effective.kp, 4.0);
        assert_eq!(effective.ki, 0.05);
        assert_eq!(effective.kd, 50.0);
        assert_eq!(effective.effective(), effective);
    }

    #[test]
    fn test_effective_rejects_non_finite() {
        let gains = PidGains::new(f32::NAN, f32::INFINITY, 1.0);
        let effective = gains.effective();

        assert_eq!(effective.kp, 4.0);
        assert_eq!(effective.ki, 0.02);
        assert_eq!(effective.kd, 1.0);
    }

    #[test]
    fn test_channel_accessors() {
        let config = SystemConfig {
            ssr2: PidGains::new(2.0, 0.01, 10.0),
            t2_offset: -1.5,
            ..SystemConfig::new()
        };
        assert_eq!(config.gains(Channel::Two).kp, 2.0);
        assert_eq!(config.gains(Channel::One), PidGains::DEFAULT);
        assert_eq!(config.offset(Channel::Two), -1.5);
    }
}
