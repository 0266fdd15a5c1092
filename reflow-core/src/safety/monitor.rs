//! Over-temperature safety monitor
//!
//! Audits the channel 1 chamber temperature independently of the control
//! loop. A reading above the hard ceiling latches FAULT and zeroes power,
//! overriding whatever the controller or PID committed.

use crate::state::{FaultKind, OvenState, ProcessState};

/// Hard chamber temperature ceiling (°C)
pub const OVERTEMP_CEILING_C: f32 = 260.0;

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(FaultKind),
}

/// Safety monitor for fault detection
///
/// Holds no lock and never waits: the caller hands it the shared record
/// only when the lock was free, and reports a skipped cycle otherwise.
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    /// Trip threshold (°C)
    ceiling_c: f32,
    /// Cycles skipped because the process record was busy
    skipped_cycles: u32,
    /// Number of fault entries caused by this monitor
    trips: u32,
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyMonitor {
    /// Create a monitor with the standard ceiling
    pub const fn new() -> Self {
        Self {
            ceiling_c: OVERTEMP_CEILING_C,
            skipped_cycles: 0,
            trips: 0,
        }
    }

    /// Classify a channel 1 reading
    pub fn check(&self, measured_c: f32) -> SafetyStatus {
        if measured_c > self.ceiling_c {
            SafetyStatus::Fault(FaultKind::OverTemperature)
        } else {
            SafetyStatus::Ok
        }
    }

    /// Check the record and force FAULT on over-temperature
    ///
    /// Applied unconditionally on every tripping cycle, so a RUNNING state
    /// or power committed concurrently is overwritten again.
    pub fn enforce(&mut self, process: &mut ProcessState) -> SafetyStatus {
        let status = self.check(process.measured_ch1);

        if let SafetyStatus::Fault(kind) = status {
            if process.state.is_active_control() {
                process.control_epoch = process.control_epoch.wrapping_add(1);
            }
            if process.state != OvenState::Fault(kind) {
                self.trips = self.trips.saturating_add(1);
                error!(
                    "Over-temperature: {} C > {} C, forcing fault",
                    process.measured_ch1, self.ceiling_c
                );
            }
            process.state = OvenState::Fault(kind);
            process.fault_active = true;
            process.target = 0.0;
            process.zero_power();
        }

        status
    }

    /// Note a cycle skipped on lock contention
    pub fn record_skip(&mut self) {
        self.skipped_cycles = self.skipped_cycles.saturating_add(1);
        trace!("Safety check skipped, process state busy");
    }

    /// Trip threshold (°C)
    pub fn ceiling_c(&self) -> f32 {
        self.ceiling_c
    }

    /// Cycles skipped on contention
    pub fn skipped_cycles(&self) -> u32 {
        self.skipped_cycles
    }

    /// Fault entries caused by this monitor
    pub fn trips(&self) -> u32 {
        self.trips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_at(measured_c: f32) -> ProcessState {
        let mut process = ProcessState::new();
        process.state = OvenState::Running;
        process.measured_ch1 = measured_c;
        process.target = 245.0;
        process.power_ch1 = 100.0;
        process.power_ch2 = 80.0;
        process
    }

    #[test]
    fn test_normal_operation() {
        let monitor = SafetyMonitor::new();
        assert_eq!(monitor.check(245.0), SafetyStatus::Ok);
        // The ceiling itself is allowed
        assert_eq!(monitor.check(260.0), SafetyStatus::Ok);
    }

    #[test]
    fn test_over_temperature() {
        let mut monitor = SafetyMonitor::new();
        let mut process = running_at(261.0);

        assert_eq!(
            monitor.enforce(&mut process),
            SafetyStatus::Fault(FaultKind::OverTemperature)
        );
        assert_eq!(process.state, OvenState::Fault(FaultKind::OverTemperature));
        assert!(process.fault_active);
        assert_eq!(process.power_ch1, 0.0);
        assert_eq!(process.power_ch2, 0.0);
        assert_eq!(monitor.trips(), 1);
        assert_eq!(process.control_epoch, 1);

        // Already latched, heater control was not re-entered
        monitor.enforce(&mut process);
        assert_eq!(process.control_epoch, 1);
    }

    #[test]
    fn test_overrides_concurrent_running() {
        let mut monitor = SafetyMonitor::new();
        let mut process = running_at(270.0);
        monitor.enforce(&mut process);

        // A stale commit puts RUNNING and full power back
        process.state = OvenState::Running;
        process.power_ch1 = 100.0;

        monitor.enforce(&mut process);
        assert_eq!(process.state, OvenState::Fault(FaultKind::OverTemperature));
        assert_eq!(process.power_ch1, 0.0);
        assert_eq!(monitor.trips(), 2);
    }

    #[test]
    fn test_trips_counted_once_per_entry() {
        let mut monitor = SafetyMonitor::new();
        let mut process = running_at(300.0);
        for _ in 0..5 {
            monitor.enforce(&mut process);
        }
        assert_eq!(monitor.trips(), 1);
    }

    #[test]
    fn test_pre_check_fault_escalates() {
        let mut monitor = SafetyMonitor::new();
        let mut process = running_at(280.0);
        process.state = OvenState::Fault(FaultKind::PreCheckFailed);

        monitor.enforce(&mut process);
        assert_eq!(process.state, OvenState::Fault(FaultKind::OverTemperature));
    }

    #[test]
    fn test_any_state_trips() {
        for state in [
            OvenState::Init,
            OvenState::Idle,
            OvenState::PreCheck,
            OvenState::Manual,
            OvenState::Cooldown,
        ] {
            let mut monitor = SafetyMonitor::new();
            let mut process = running_at(261.0);
            process.state = state;
            monitor.enforce(&mut process);
            assert_eq!(process.state, OvenState::Fault(FaultKind::OverTemperature));
        }
    }

    #[test]
    fn test_below_ceiling_untouched() {
        let mut monitor = SafetyMonitor::new();
        let mut process = running_at(250.0);
        let before = process;

        assert_eq!(monitor.enforce(&mut process), SafetyStatus::Ok);
        assert_eq!(process, before);
    }

    #[test]
    fn test_skip_counter() {
        let mut monitor = SafetyMonitor::new();
        monitor.record_skip();
        monitor.record_skip();
        assert_eq!(monitor.skipped_cycles(), 2);
    }
}
