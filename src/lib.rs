//! ControlFSM library.
//!
//! A non-blocking finite state machine that sequences a sensor/actuator
//! device through Idle, Initializing, Running and Error, with a safety
//! interlock on the monitored reading and a manual reset path.  The pure
//! logic is exposed here for the runner binary and for integration tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod safety;
