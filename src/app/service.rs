//! Control service — the core of the controller.
//!
//! [`ControlFsm`] owns the FSM engine, its context, and the injected
//! collaborators.  It exposes one operation that matters, [`ControlFsm::step`]:
//! a single, bounded, non-blocking iteration of the control loop.
//!
//! ```text
//!  CommandChannel ──▶ ┌────────────────────────┐ ──▶ ActuatorSink
//!                     │       ControlFsm        │
//!    SensorSource ──▶ │  FSM · Interlock        │ ──▶ Logger
//!                     └────────────────────────┘
//! ```
//!
//! The production runner calls `step()` forever; tests call it as many
//! times as a scenario needs.

use log::info;

use crate::config::SystemConfig;
use crate::fsm::context::{FaultCause, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::ports::{ActuatorSink, Collaborators, CommandChannel, ControlPorts, Logger, SensorSource};

/// Logger line emitted by [`ControlFsm::start`].
pub const MSG_BOOTED: &str = "System Booted Successfully.";

// ───────────────────────────────────────────────────────────────
// ControlFsm
// ───────────────────────────────────────────────────────────────

/// The controller: one state machine plus the ports it drives.
pub struct ControlFsm<P: ControlPorts> {
    fsm: Fsm<P>,
    ctx: FsmContext,
    io: P,
}

impl<C, S, A, L> ControlFsm<Collaborators<C, S, A, L>>
where
    C: CommandChannel,
    S: SensorSource,
    A: ActuatorSink,
    L: Logger,
{
    /// Build a controller from four separate collaborators.
    pub fn new(config: SystemConfig, channel: C, sensor: S, actuator: A, logger: L) -> Self {
        Self::with_ports(config, Collaborators::new(channel, sensor, actuator, logger))
    }
}

impl<P: ControlPorts> ControlFsm<P> {
    /// Build a controller around a single value implementing every port.
    ///
    /// The machine starts in [`StateId::Idle`].  Nothing is called on the
    /// ports until [`start`](Self::start) or [`step`](Self::step).
    pub fn with_ports(config: SystemConfig, io: P) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table::<P>(), StateId::Idle);
        Self { fsm, ctx, io }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce boot on the Logger and run the initial state's entry action.
    pub fn start(&mut self) {
        self.fsm.start(&mut self.ctx, &mut self.io);
        self.io.log(MSG_BOOTED);
        info!(
            "ControlFsm started in {:?} (limit={}, start=0x{:02x}, reset=0x{:02x})",
            self.fsm.current_state(),
            self.ctx.config.max_temp_limit,
            self.ctx.config.cmd_start,
            self.ctx.config.cmd_reset,
        );
    }

    /// Perform exactly one control iteration and return the resulting state.
    pub fn step(&mut self) -> StateId {
        self.fsm.tick(&mut self.ctx, &mut self.io)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Total iterations executed since construction.
    pub fn tick_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    /// Iterations spent in the current state.
    pub fn ticks_in_state(&self) -> u64 {
        self.fsm.ticks_in_current_state()
    }

    /// Why the controller is in `Error`, if it is.
    pub fn active_fault(&self) -> Option<FaultCause> {
        self.ctx.active_fault
    }

    /// Interlock trips since boot.
    pub fn safety_trips(&self) -> u32 {
        self.ctx.interlock.trips()
    }

    /// Failed calibration attempts since boot.
    pub fn calibration_failures(&self) -> u32 {
        self.ctx.calibration_failures
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    /// Shared access to the injected ports.
    pub fn ports(&self) -> &P {
        &self.io
    }

    /// Exclusive access to the injected ports (e.g. to feed a simulator).
    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.io
    }

    /// Tear the controller down and hand the ports back.
    pub fn into_ports(self) -> P {
        self.io
    }
}
