//! Unified error types for the controller.
//!
//! A single `Error` enum that every collaborator can convert into. All
//! variants are `Copy` so they pass through adapters and the FSM context
//! without allocation.
//!
//! The FSM itself only ever *sees* [`SensorError`] from a calibration
//! attempt; everything else is absorbed inside the adapters that raise it.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be calibrated or read.
    Sensor(SensorError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// The serial command channel failed.
    Comms(CommsError),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Calibration routine did not converge.
    CalibrationFailed,
    /// ADC read returned an error or timed out.
    ReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Sensor has not finished powering up.
    NotReady,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CalibrationFailed => write!(f, "calibration failed"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NotReady => write!(f, "sensor not ready"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    TransmitFailed,
    ReceiveFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransmitFailed => write!(f, "UART transmit failed"),
            Self::ReceiveFailed => write!(f, "UART receive failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
