//! Shared process record
//!
//! One instance exists for the lifetime of the firmware. Each field has a
//! single steady-state writer: the sensor task owns the measured
//! temperatures, the PID task owns the power commands, the process
//! controller owns lifecycle and target. The safety monitor may overwrite
//! lifecycle and power, in the fault direction only.

use super::machine::OvenState;

/// Raw readings below this are a sensor failure, never a temperature
pub const SENSOR_SENTINEL_BELOW_C: f32 = -100.0;

/// Value reported by sensor producers when a read fails
pub const SENSOR_FAULT_SENTINEL: f32 = -999.0;

/// Heater / thermocouple channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    One,
    Two,
}

impl Channel {
    /// Array index for per-channel tables
    pub const fn index(self) -> usize {
        match self {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }
}

/// Result of offering a raw reading to the process record
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingOutcome {
    /// Reading stored (calibrated value)
    Stored(f32),
    /// Sentinel or non-finite reading, nothing written
    Rejected,
    /// Lock not acquired in time, retry next period
    Skipped,
}

/// Snapshot of the oven process
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProcessState {
    /// Lifecycle state
    pub state: OvenState,
    /// Chamber temperature, channel 1 (°C)
    pub measured_ch1: f32,
    /// Chamber temperature, channel 2 (°C)
    pub measured_ch2: f32,
    /// Target temperature (°C)
    pub target: f32,
    /// Power command, channel 1 (0-100 %)
    pub power_ch1: f32,
    /// Power command, channel 2 (0-100 %)
    pub power_ch2: f32,
    /// Monotonic timestamp of the run start (ms)
    pub profile_start_ms: u64,
    /// Active profile segment (informational)
    pub segment_index: u8,
    /// Fault latch
    pub fault_active: bool,
    /// Bumped each time the lifecycle leaves heater control
    ///
    /// Lets the PID task see an exit it never observed as a snapshot, for
    /// example MANUAL -> IDLE -> PRE_CHECK applied within one lifecycle
    /// cycle.
    pub control_epoch: u32,
}

impl Default for ProcessState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessState {
    /// Power-on record
    pub const fn new() -> Self {
        Self {
            state: OvenState::Init,
            measured_ch1: 0.0,
            measured_ch2: 0.0,
            target: 0.0,
            power_ch1: 0.0,
            power_ch2: 0.0,
            profile_start_ms: 0,
            segment_index: 0,
            fault_active: false,
            control_epoch: 0,
        }
    }

    /// Measured temperature of a channel
    pub fn measured(&self, channel: Channel) -> f32 {
        match channel {
            Channel::One => self.measured_ch1,
            Channel::Two => self.measured_ch2,
        }
    }

    /// Power command of a channel
    pub fn power(&self, channel: Channel) -> f32 {
        match channel {
            Channel::One => self.power_ch1,
            Channel::Two => self.power_ch2,
        }
    }

    /// Both power commands, channel 1 first
    pub fn powers(&self) -> [f32; 2] {
        [self.power_ch1, self.power_ch2]
    }

    /// Zero both power commands
    pub fn zero_power(&mut self) {
        self.power_ch1 = 0.0;
        self.power_ch2 = 0.0;
    }

    /// Store a new measured value for a channel
    ///
    /// The raw reading is checked against the sensor sentinel and then
    /// corrected by the channel's calibration offset.
    pub fn ingest(&mut self, channel: Channel, raw_c: f32, offset_c: f32) -> ReadingOutcome {
        if !is_plausible_reading(raw_c) {
            return ReadingOutcome::Rejected;
        }

        let value = raw_c + offset_c;
        match channel {
            Channel::One => self.measured_ch1 = value,
            Channel::Two => self.measured_ch2 = value,
        }
        ReadingOutcome::Stored(value)
    }

    /// Commit the fields owned by the process controller
    ///
    /// Power commands are left to the PID task except when the planned
    /// state takes heater authority away, in which case they are zeroed.
    pub fn merge_lifecycle(&mut self, planned: &ProcessState) {
        self.state = planned.state;
        self.target = planned.target;
        self.profile_start_ms = planned.profile_start_ms;
        self.segment_index = planned.segment_index;
        self.fault_active = planned.fault_active;
        self.control_epoch = planned.control_epoch;

        if !self.state.is_active_control() {
            self.zero_power();
        }
    }
}

/// Check a raw sensor value against the failure sentinel
pub fn is_plausible_reading(raw_c: f32) -> bool {
    raw_c.is_finite() && raw_c >= SENSOR_SENTINEL_BELOW_C
}

/// Record a reading from a sensor collaborator
pub fn ingest_reading(
    state: &mut ProcessState,
    channel: Channel,
    raw_c: f32,
    offset_c: f32,
) -> ReadingOutcome {
    state.ingest(channel, raw_c, offset_c)
}
