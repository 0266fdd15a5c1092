//! Events that trigger lifecycle transitions, and the operator commands
//! that produce them

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// Startup stabilization elapsed
    StartupComplete,

    // Operator events
    /// Start the active profile
    Start,
    /// Stop a run, or leave manual control
    Stop,
    /// Enter manual control
    EnterManual,
    /// Leave manual control
    ExitManual,
    /// Operator acknowledged a latched fault
    AcknowledgeFault,

    // Controller events
    /// Start temperature within the plausible window
    PreCheckPassed,
    /// Start temperature outside the plausible window
    PreCheckFailed,
    /// Elapsed time reached the end of the profile
    ProfileExhausted,
    /// Chamber cooled below the idle threshold
    CooledDown,

    // Safety events
    /// Hard temperature ceiling exceeded
    OverTemperature,
}

/// Lifecycle commands accepted from the UI collaborator
///
/// Commands travel through the bounded command queue and are applied by
/// the process controller at the start of its next cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start the active profile (IDLE only)
    Start,
    /// Stop a run (to COOLDOWN) or leave manual control (to IDLE)
    Stop,
    /// Clear a latched fault
    AcknowledgeFault,
    /// Take manual control with an initial target (°C)
    EnterManual { target_c: f32 },
    /// Return from manual control to IDLE
    ExitManual,
    /// Change the manual target (°C)
    SetManualTarget(f32),
}
