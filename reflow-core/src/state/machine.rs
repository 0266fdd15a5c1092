//! Oven lifecycle state machine
//!
//! Heater authority and profile execution are a function of the current
//! lifecycle state and an event. The table is explicit, finite and
//! deterministic; side effects (timestamps, targets) live in the process
//! controller.

use super::events::Event;

/// Oven lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OvenState {
    /// Power-on, waiting for startup stabilization
    Init,
    /// Ready, heaters off
    Idle,
    /// One-shot plausibility check of the start temperature
    PreCheck,
    /// Profile executing
    Running,
    /// Operator-set target, profile not consulted
    Manual,
    /// Heaters off, waiting for the chamber to cool
    Cooldown,
    /// Latched fault; outputs disabled until acknowledged
    Fault(FaultKind),
}

/// Reason recorded with a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Start temperature implausible (lower severity)
    PreCheckFailed,
    /// Hard ceiling exceeded
    OverTemperature,
}

impl OvenState {
    /// Check if the PID loop has authority in this state
    pub fn is_active_control(&self) -> bool {
        matches!(self, OvenState::Running | OvenState::PreCheck | OvenState::Manual)
    }

    /// Check if a profile run is in progress
    pub fn run_in_progress(&self) -> bool {
        matches!(self, OvenState::PreCheck | OvenState::Running)
    }

    /// Check if this is a fault state
    pub fn is_fault(&self) -> bool {
        matches!(self, OvenState::Fault(_))
    }

    /// Check if the state machine forces outputs and target to zero
    pub fn forces_outputs_off(&self) -> bool {
        matches!(
            self,
            OvenState::Idle | OvenState::Cooldown | OvenState::Fault(_)
        )
    }

    /// Process an event and return the next state
    ///
    /// Events that are not valid in the current state leave it unchanged.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use OvenState::*;

        match (self, event) {
            // Over-temperature wins from anywhere, including a pre-check fault
            (Fault(FaultKind::OverTemperature), OverTemperature) => self,
            (_, OverTemperature) => Fault(FaultKind::OverTemperature),

            // Startup
            (Init, StartupComplete) => Idle,

            // Idle transitions
            (Idle, Start) => PreCheck,
            (Idle, EnterManual) => Manual,

            // PreCheck transitions
            (PreCheck, PreCheckPassed) => Running,
            (PreCheck, PreCheckFailed) => Fault(FaultKind::PreCheckFailed),
            (PreCheck, Stop) => Cooldown,

            // Running transitions
            (Running, ProfileExhausted) => Cooldown,
            (Running, Stop) => Cooldown,

            // Manual transitions
            (Manual, ExitManual) => Idle,
            (Manual, Stop) => Idle,

            // Cooldown transitions
            (Cooldown, CooledDown) => Idle,

            // Fault transitions
            (Fault(_), AcknowledgeFault) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_to_idle() {
        assert_eq!(OvenState::Init.transition(Event::StartupComplete), OvenState::Idle);
        assert_eq!(OvenState::Init.transition(Event::Start), OvenState::Init);
    }

    #[test]
    fn test_run_flow() {
        let state = OvenState::Idle.transition(Event::Start);
        assert_eq!(state, OvenState::PreCheck);

        let state = state.transition(Event::PreCheckPassed);
        assert_eq!(state, OvenState::Running);

        let state = state.transition(Event::ProfileExhausted);
        assert_eq!(state, OvenState::Cooldown);

        let state = state.transition(Event::CooledDown);
        assert_eq!(state, OvenState::Idle);
    }

    #[test]
    fn test_precheck_failure() {
        let next = OvenState::PreCheck.transition(Event::PreCheckFailed);
        assert_eq!(next, OvenState::Fault(FaultKind::PreCheckFailed));
    }

    #[test]
    fn test_stop_from_run_states() {
        assert_eq!(OvenState::PreCheck.transition(Event::Stop), OvenState::Cooldown);
        assert_eq!(OvenState::Running.transition(Event::Stop), OvenState::Cooldown);
        assert_eq!(OvenState::Manual.transition(Event::Stop), OvenState::Idle);
        assert_eq!(OvenState::Idle.transition(Event::Stop), OvenState::Idle);
    }

    #[test]
    fn test_over_temperature_from_any_state() {
        let states = [
            OvenState::Init,
            OvenState::Idle,
            OvenState::PreCheck,
            OvenState::Running,
            OvenState::Manual,
            OvenState::Cooldown,
            OvenState::Fault(FaultKind::PreCheckFailed),
            OvenState::Fault(FaultKind::OverTemperature),
        ];

        for state in states {
            let next = state.transition(Event::OverTemperature);
            assert_eq!(next, OvenState::Fault(FaultKind::OverTemperature));
        }
    }

    #[test]
    fn test_fault_requires_acknowledge() {
        let fault = OvenState::Fault(FaultKind::OverTemperature);
        assert_eq!(fault.transition(Event::Start), fault);
        assert_eq!(fault.transition(Event::CooledDown), fault);
        assert_eq!(fault.transition(Event::AcknowledgeFault), OvenState::Idle);
    }

    #[test]
    fn test_manual_only_from_idle() {
        assert_eq!(OvenState::Idle.transition(Event::EnterManual), OvenState::Manual);
        assert_eq!(OvenState::Running.transition(Event::EnterManual), OvenState::Running);
        assert_eq!(OvenState::Manual.transition(Event::ExitManual), OvenState::Idle);
    }

    #[test]
    fn test_active_control_states() {
        assert!(OvenState::Running.is_active_control());
        assert!(OvenState::PreCheck.is_active_control());
        assert!(OvenState::Manual.is_active_control());
        assert!(!OvenState::Idle.is_active_control());
        assert!(!OvenState::Cooldown.is_active_control());
        assert!(!OvenState::Fault(FaultKind::OverTemperature).is_active_control());
    }

    #[test]
    fn test_forced_off_states() {
        assert!(OvenState::Idle.forces_outputs_off());
        assert!(OvenState::Cooldown.forces_outputs_off());
        assert!(OvenState::Fault(FaultKind::PreCheckFailed).forces_outputs_off());
        assert!(!OvenState::Manual.forces_outputs_off());
        assert!(!OvenState::Init.forces_outputs_off());
    }
}
