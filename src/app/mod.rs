//! Application core — pure domain logic, zero I/O.
//!
//! [`service::ControlFsm`] owns the state machine and the injected
//! collaborators.  All interaction with hardware happens through the
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod ports;
pub mod service;
