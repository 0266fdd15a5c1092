//! Process controller
//!
//! Owns the active profile and drives the lifecycle state machine:
//! - Applies operator commands (start, stop, acknowledge, manual control)
//! - Runs the automatic transitions (startup, pre-check, profile end, cooldown)
//! - Sets the target temperature from the profile timeline while running
//!
//! It works on a `ProcessState` value; the lifecycle task decides how that
//! value is read from and committed to the shared record.

use crate::scheduler::{locate, Position, ReflowProfile};
use crate::state::{Command, Event, OvenState, ProcessState};

/// Startup stabilization before INIT -> IDLE (ms)
pub const STARTUP_SETTLE_MS: u64 = 1000;

/// Upper bound of a plausible start temperature (°C, exclusive)
pub const PRECHECK_MAX_C: f32 = 300.0;

/// Chamber temperature below which COOLDOWN returns to IDLE (°C)
pub const COOLDOWN_IDLE_C: f32 = 50.0;

/// Lowest manual target (°C)
pub const MANUAL_MIN_C: f32 = 20.0;

/// Highest manual target (°C)
pub const MANUAL_MAX_C: f32 = 260.0;

/// Reasons a command is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandRejected {
    /// Command not valid in the current state
    NotAllowed { state: OvenState },
    /// Start requested with an empty profile
    EmptyProfile,
    /// Manual target is not a number
    InvalidTarget,
}

/// Profile replacement refused while a run is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileBusy;

/// Lifecycle orchestration over the shared process record
#[derive(Debug, Clone)]
pub struct ProcessController {
    /// Active profile, read-only while running
    profile: ReflowProfile,
    /// When INIT may complete (set on first step)
    settle_deadline_ms: Option<u64>,
}

impl ProcessController {
    /// Create a controller for a profile
    pub fn new(profile: ReflowProfile) -> Self {
        Self {
            profile,
            settle_deadline_ms: None,
        }
    }

    /// Active profile
    pub fn profile(&self) -> &ReflowProfile {
        &self.profile
    }

    /// Replace the active profile
    ///
    /// Refused while PRE_CHECK or RUNNING.
    pub fn load_profile(
        &mut self,
        state: OvenState,
        profile: ReflowProfile,
    ) -> Result<(), ProfileBusy> {
        if state.run_in_progress() {
            debug!("Profile load refused in {}", state);
            return Err(ProfileBusy);
        }
        info!("Profile replaced: {} segments", profile.len());
        self.profile = profile;
        Ok(())
    }

    /// Apply an operator command
    ///
    /// Returns the resulting lifecycle state.
    pub fn apply_command(
        &mut self,
        process: &mut ProcessState,
        command: Command,
        now_ms: u64,
    ) -> Result<OvenState, CommandRejected> {
        let result = self.try_command(process, command, now_ms);
        if let Err(e) = result {
            debug!("Command {} rejected: {}", command, e);
        }
        result
    }

    fn try_command(
        &mut self,
        process: &mut ProcessState,
        command: Command,
        now_ms: u64,
    ) -> Result<OvenState, CommandRejected> {
        let current = process.state;
        let not_allowed = CommandRejected::NotAllowed { state: current };

        match command {
            Command::Start => {
                if current != OvenState::Idle {
                    return Err(not_allowed);
                }
                if self.profile.is_empty() {
                    return Err(CommandRejected::EmptyProfile);
                }
                self.transition(process, Event::Start);
                process.profile_start_ms = now_ms;
                process.segment_index = 0;
            }
            Command::Stop => {
                if !(current.run_in_progress() || current == OvenState::Manual) {
                    return Err(not_allowed);
                }
                self.transition(process, Event::Stop);
                process.target = 0.0;
                process.zero_power();
            }
            Command::AcknowledgeFault => {
                if !current.is_fault() {
                    return Err(not_allowed);
                }
                self.transition(process, Event::AcknowledgeFault);
                process.fault_active = false;
                process.target = 0.0;
            }
            Command::EnterManual { target_c } => {
                if current != OvenState::Idle {
                    return Err(not_allowed);
                }
                let target = manual_target(target_c)?;
                self.transition(process, Event::EnterManual);
                process.target = target;
            }
            Command::ExitManual => {
                if current != OvenState::Manual {
                    return Err(not_allowed);
                }
                self.transition(process, Event::ExitManual);
                process.target = 0.0;
                process.zero_power();
            }
            Command::SetManualTarget(target_c) => {
                if current != OvenState::Manual {
                    return Err(not_allowed);
                }
                process.target = manual_target(target_c)?;
            }
        }

        Ok(process.state)
    }

    /// Run one lifecycle tick
    ///
    /// Returns the new state when a transition happened.
    pub fn step(&mut self, process: &mut ProcessState, now_ms: u64) -> Option<OvenState> {
        let before = process.state;

        if before.forces_outputs_off() {
            force_off(process);
        }

        match before {
            OvenState::Init => {
                let deadline = *self
                    .settle_deadline_ms
                    .get_or_insert(now_ms.saturating_add(STARTUP_SETTLE_MS));
                if now_ms >= deadline {
                    self.transition(process, Event::StartupComplete);
                }
            }
            OvenState::PreCheck => self.pre_check(process, now_ms),
            OvenState::Running => self.follow_profile(process, now_ms),
            OvenState::Cooldown => {
                let measured = process.measured_ch1;
                if measured > 0.0 && measured < COOLDOWN_IDLE_C {
                    self.transition(process, Event::CooledDown);
                }
            }
            OvenState::Idle | OvenState::Manual | OvenState::Fault(_) => {}
        }

        (process.state != before).then_some(process.state)
    }

    fn pre_check(&mut self, process: &mut ProcessState, now_ms: u64) {
        let measured = process.measured_ch1;

        if measured > 0.0 && measured < PRECHECK_MAX_C {
            self.transition(process, Event::PreCheckPassed);
            process.profile_start_ms = now_ms;
            process.segment_index = 0;
            process.target = locate(&self.profile, 0.0).target_c();
        } else {
            warn!("Pre-check failed: start temperature {} C", measured);
            self.transition(process, Event::PreCheckFailed);
            process.fault_active = true;
            force_off(process);
        }
    }

    fn follow_profile(&mut self, process: &mut ProcessState, now_ms: u64) {
        let elapsed_ms = now_ms.saturating_sub(process.profile_start_ms);
        let elapsed_s = elapsed_ms as f32 / 1000.0;

        match locate(&self.profile, elapsed_s) {
            Position::Active { index, target_c } => {
                if index != process.segment_index {
                    debug!("Segment {} -> {}", process.segment_index, index);
                }
                process.segment_index = index;
                process.target = target_c;
            }
            Position::Exhausted { .. } => {
                info!("Profile complete after {} ms", elapsed_ms);
                self.transition(process, Event::ProfileExhausted);
                force_off(process);
            }
        }
    }

    fn transition(&mut self, process: &mut ProcessState, event: Event) {
        let next = process.state.transition(event);
        if next != process.state {
            info!("State: {} -> {} ({})", process.state, next, event);
            if process.state.is_active_control() && !next.is_active_control() {
                process.control_epoch = process.control_epoch.wrapping_add(1);
            }
        }
        process.state = next;
    }
}

fn force_off(process: &mut ProcessState) {
    process.target = 0.0;
    process.zero_power();
}

fn manual_target(target_c: f32) -> Result<f32, CommandRejected> {
    if !target_c.is_finite() {
        return Err(CommandRejected::InvalidTarget);
    }
    Ok(target_c.clamp(MANUAL_MIN_C, MANUAL_MAX_C))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Segment, SegmentKind};
    use crate::state::FaultKind;

    fn idle_controller() -> (ProcessController, ProcessState) {
        let controller = ProcessController::new(ReflowProfile::sac305_default());
        let mut process = ProcessState::new();
        process.state = OvenState::Idle;
        (controller, process)
    }

    fn running_controller(start_ms: u64) -> (ProcessController, ProcessState) {
        let (mut controller, mut process) = idle_controller();
        process.measured_ch1 = 25.0;
        controller
            .apply_command(&mut process, Command::Start, start_ms)
            .unwrap();
        controller.step(&mut process, start_ms);
        assert_eq!(process.state, OvenState::Running);
        (controller, process)
    }

    #[test]
    fn test_startup_settle() {
        let mut controller = ProcessController::new(ReflowProfile::sac305_default());
        let mut process = ProcessState::new();

        assert_eq!(controller.step(&mut process, 5_000), None);
        assert_eq!(controller.step(&mut process, 5_900), None);
        assert_eq!(process.state, OvenState::Init);
        assert_eq!(controller.step(&mut process, 6_000), Some(OvenState::Idle));
    }

    #[test]
    fn test_start_requires_idle_and_segments() {
        let (mut controller, mut process) = idle_controller();

        assert_eq!(
            controller.apply_command(&mut process, Command::Start, 100),
            Ok(OvenState::PreCheck)
        );
        assert_eq!(process.profile_start_ms, 100);
        assert_eq!(process.segment_index, 0);

        assert_eq!(
            controller.apply_command(&mut process, Command::Start, 200),
            Err(CommandRejected::NotAllowed {
                state: OvenState::PreCheck
            })
        );

        let mut controller = ProcessController::new(ReflowProfile::new("empty"));
        process.state = OvenState::Idle;
        assert_eq!(
            controller.apply_command(&mut process, Command::Start, 0),
            Err(CommandRejected::EmptyProfile)
        );
        assert_eq!(process.state, OvenState::Idle);
    }

    #[test]
    fn test_pre_check_pass() {
        let (mut controller, mut process) = idle_controller();
        controller.apply_command(&mut process, Command::Start, 0).unwrap();
        process.measured_ch1 = 150.0;

        assert_eq!(controller.step(&mut process, 300), Some(OvenState::Running));
        // Start re-stamped at the pass
        assert_eq!(process.profile_start_ms, 300);
        assert_eq!(process.target, 25.0);
    }

    #[test]
    fn test_pre_check_fail() {
        for measured in [400.0, 300.0, 0.0, -5.0] {
            let (mut controller, mut process) = idle_controller();
            controller.apply_command(&mut process, Command::Start, 0).unwrap();
            process.measured_ch1 = measured;
            process.power_ch1 = 50.0;

            assert_eq!(
                controller.step(&mut process, 100),
                Some(OvenState::Fault(FaultKind::PreCheckFailed))
            );
            assert!(process.fault_active);
            assert_eq!(process.power_ch1, 0.0);
        }
    }

    #[test]
    fn test_running_follows_profile() {
        let (mut controller, mut process) = running_controller(1_000);

        controller.step(&mut process, 46_000);
        assert!((process.target - 87.5).abs() < 1e-3);
        assert_eq!(process.segment_index, 0);

        controller.step(&mut process, 101_000);
        assert_eq!(process.target, 150.0);
        assert_eq!(process.segment_index, 1);
        assert_eq!(process.state, OvenState::Running);
    }

    #[test]
    fn test_profile_exhausted() {
        let (mut controller, mut process) = running_controller(0);
        process.power_ch1 = 30.0;

        assert_eq!(controller.step(&mut process, 400_000), Some(OvenState::Cooldown));
        assert_eq!(process.target, 0.0);
        assert_eq!(process.power_ch1, 0.0);
    }

    #[test]
    fn test_cooldown_to_idle() {
        let (mut controller, mut process) = running_controller(0);
        controller.step(&mut process, 400_000);

        process.measured_ch1 = 120.0;
        assert_eq!(controller.step(&mut process, 401_000), None);

        // Implausible readings do not end the cooldown
        process.measured_ch1 = 0.0;
        assert_eq!(controller.step(&mut process, 402_000), None);

        process.measured_ch1 = 45.0;
        assert_eq!(controller.step(&mut process, 403_000), Some(OvenState::Idle));
    }

    #[test]
    fn test_stop() {
        let (mut controller, mut process) = running_controller(0);
        process.power_ch1 = 80.0;

        assert_eq!(
            controller.apply_command(&mut process, Command::Stop, 10_000),
            Ok(OvenState::Cooldown)
        );
        assert_eq!(process.power_ch1, 0.0);
        assert_eq!(process.target, 0.0);
        assert_eq!(process.control_epoch, 1);

        assert!(controller
            .apply_command(&mut process, Command::Stop, 10_100)
            .is_err());
    }

    #[test]
    fn test_idle_forces_outputs_off() {
        let (mut controller, mut process) = idle_controller();
        process.target = 100.0;
        process.power_ch1 = 40.0;
        process.power_ch2 = 40.0;

        controller.step(&mut process, 0);
        assert_eq!(process.target, 0.0);
        assert_eq!(process.powers(), [0.0, 0.0]);
    }

    #[test]
    fn test_fault_acknowledge() {
        let (mut controller, mut process) = idle_controller();
        process.state = OvenState::Fault(FaultKind::OverTemperature);
        process.fault_active = true;

        // Cooling down does not clear the latch
        process.measured_ch1 = 30.0;
        assert_eq!(controller.step(&mut process, 0), None);

        assert!(controller
            .apply_command(&mut process, Command::Start, 0)
            .is_err());
        assert_eq!(
            controller.apply_command(&mut process, Command::AcknowledgeFault, 0),
            Ok(OvenState::Idle)
        );
        assert!(!process.fault_active);
    }

    #[test]
    fn test_manual_control() {
        let (mut controller, mut process) = idle_controller();

        assert_eq!(
            controller.apply_command(&mut process, Command::EnterManual { target_c: 500.0 }, 0),
            Ok(OvenState::Manual)
        );
        assert_eq!(process.target, MANUAL_MAX_C);

        controller
            .apply_command(&mut process, Command::SetManualTarget(5.0), 0)
            .unwrap();
        assert_eq!(process.target, MANUAL_MIN_C);

        controller
            .apply_command(&mut process, Command::SetManualTarget(180.0), 0)
            .unwrap();
        assert_eq!(process.target, 180.0);

        assert_eq!(
            controller.apply_command(&mut process, Command::SetManualTarget(f32::NAN), 0),
            Err(CommandRejected::InvalidTarget)
        );
        assert_eq!(process.target, 180.0);

        // Profile is not consulted while manual
        assert_eq!(controller.step(&mut process, 100_000), None);
        assert_eq!(process.target, 180.0);

        assert_eq!(
            controller.apply_command(&mut process, Command::ExitManual, 0),
            Ok(OvenState::Idle)
        );
        assert_eq!(process.target, 0.0);
    }

    #[test]
    fn test_manual_rejected_outside_idle() {
        let (mut controller, mut process) = running_controller(0);
        assert!(controller
            .apply_command(&mut process, Command::EnterManual { target_c: 100.0 }, 0)
            .is_err());
        assert!(controller
            .apply_command(&mut process, Command::SetManualTarget(100.0), 0)
            .is_err());
    }

    #[test]
    fn test_stop_leaves_manual() {
        let (mut controller, mut process) = idle_controller();
        controller
            .apply_command(&mut process, Command::EnterManual { target_c: 100.0 }, 0)
            .unwrap();
        assert_eq!(
            controller.apply_command(&mut process, Command::Stop, 0),
            Ok(OvenState::Idle)
        );
        assert_eq!(process.control_epoch, 1);

        // Entering control again does not move the epoch
        controller
            .apply_command(&mut process, Command::EnterManual { target_c: 100.0 }, 0)
            .unwrap();
        assert_eq!(process.control_epoch, 1);
    }

    #[test]
    fn test_load_profile_refused_while_running() {
        let (mut controller, process) = running_controller(0);

        let mut other = ReflowProfile::new("other");
        other.push(Segment::new(SegmentKind::Hold, 100.0, 10)).unwrap();

        assert_eq!(
            controller.load_profile(process.state, other.clone()),
            Err(ProfileBusy)
        );
        assert_eq!(controller.profile().name.as_str(), "SAC305 Default");

        assert_eq!(controller.load_profile(OvenState::Cooldown, other), Ok(()));
        assert_eq!(controller.profile().name.as_str(), "other");
    }
}
