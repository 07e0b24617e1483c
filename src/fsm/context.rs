//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` holds what state handlers need besides the ports: the
//! configuration, the safety interlock and the cause of the active fault.
//! Tick counters live in the engine.  Nothing in here survives a process restart.

use crate::config::SystemConfig;
use crate::safety::SafetyInterlock;

/// Why the controller last entered `Error`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaultCause {
    /// The sensor calibration attempt returned an error.
    CalibrationFailed,
    /// A reading exceeded the safety limit (or was NaN).
    OverLimit { reading: f32, limit: f32 },
}

impl core::fmt::Display for FaultCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CalibrationFailed => write!(f, "calibration failed"),
            Self::OverLimit { reading, limit } => {
                write!(f, "reading {reading:.2} over limit {limit:.2}")
            }
        }
    }
}

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Configuration --
    pub config: SystemConfig,

    // -- Safety --
    /// Over-limit guard evaluated by the Running handler.
    pub interlock: SafetyInterlock,
    /// Cause of the current `Error` residency; cleared on reset.
    pub active_fault: Option<FaultCause>,
    /// Number of failed calibration attempts since boot.
    pub calibration_failures: u32,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            interlock: SafetyInterlock::new(config.max_temp_limit),
            config,
            active_fault: None,
            calibration_failures: 0,
        }
    }

    /// Record `cause` as the reason for the pending transition to `Error`.
    pub fn raise_fault(&mut self, cause: FaultCause) {
        if cause == FaultCause::CalibrationFailed {
            self.calibration_failures = self.calibration_failures.saturating_add(1);
        }
        self.active_fault = Some(cause);
    }
}
