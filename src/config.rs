//! System configuration parameters
//!
//! All tunable parameters for the controller. Values are fixed at boot:
//! either the compiled-in defaults or a JSON document loaded by the runner.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Safety ---
    /// Sensor reading above which the interlock trips to Error
    pub max_temp_limit: f32,

    // --- Commands ---
    /// Byte that moves Idle to Initializing
    pub cmd_start: u8,
    /// Byte that clears Error back to Idle
    pub cmd_reset: u8,

    // --- Actuation ---
    /// Reading that maps to 100% actuator duty
    pub actuator_full_scale: f32,

    // --- Serial link ---
    /// UART baud rate
    pub uart_baud: u32,

    // --- Timing ---
    /// Pause between control loop iterations (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Safety
            max_temp_limit: 100.0,

            // Commands
            cmd_start: b'S',
            cmd_reset: b'R',

            // Actuation
            actuator_full_scale: 100.0,

            // Serial link
            uart_baud: 115_200,

            // Timing
            control_loop_interval_ms: 10, // 100 Hz
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the interlock or command decoding
    /// meaningless. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if !self.max_temp_limit.is_finite() {
            return Err(Error::Config("max_temp_limit must be finite"));
        }
        if !self.actuator_full_scale.is_finite() || self.actuator_full_scale <= 0.0 {
            return Err(Error::Config("actuator_full_scale must be positive"));
        }
        if self.cmd_start == self.cmd_reset {
            return Err(Error::Config("cmd_start equals cmd_reset"));
        }
        if self.uart_baud == 0 {
            return Err(Error::Config("uart_baud must be non-zero"));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(Error::Config("control_loop_interval_ms must be non-zero"));
        }
        Ok(())
    }

    /// Parse a JSON document and validate it. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!("Config parse failed at line {} column {}: {}", e.line(), e.column(), e);
            Error::Config("malformed JSON")
        })?;
        config.validate()?;
        Ok(config)
    }
}
