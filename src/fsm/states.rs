//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain generic `fn` items: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[cmd == start]──▶ INIT ──[calibrate Ok]──▶ RUNNING
//!    ▲                        │                        │
//!    │                 [calibrate Err]        [reading > limit]
//!    │                        ▼                        │
//!    └──────[cmd == reset]── ERROR ◀───────────────────┘
//!
//!  SHUTDOWN: declared, no edges.
//! ```
//!
//! Every handler does at most one bounded call per port.  None loops,
//! none waits.

use super::context::{FaultCause, FsmContext};
use super::{StateDescriptor, StateId};
use crate::app::ports::ControlPorts;
use crate::safety::Verdict;
use log::{debug, info, warn};

/// Logger line emitted on `Idle -> Initializing`.
pub const MSG_START: &str = "Transition: IDLE -> INIT";
/// Logger line emitted when calibration fails.
pub const MSG_CALIBRATION_FAILED: &str = "Error: Calibration Failed";
/// Alert transmitted on every tick spent in `Error`.
pub const MSG_FAULT_ALERT: &str = "ALERT: System Fault Detected\n";

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table for port set `P`.  Called once at startup.
pub fn build_state_table<P: ControlPorts>() -> [StateDescriptor<P>; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update::<P>,
        },
        // Index 1 — Initializing
        StateDescriptor {
            id: StateId::Initializing,
            name: "Initializing",
            on_enter: None,
            on_exit: None,
            on_update: initializing_update::<P>,
        },
        // Index 2 — Running
        StateDescriptor {
            id: StateId::Running,
            name: "Running",
            on_enter: None,
            on_exit: None,
            on_update: running_update::<P>,
        },
        // Index 3 — Error
        StateDescriptor {
            id: StateId::Error,
            name: "Error",
            on_enter: Some(error_enter::<P>),
            on_exit: Some(error_exit::<P>),
            on_update: error_update::<P>,
        },
        // Index 4 — Shutdown
        StateDescriptor {
            id: StateId::Shutdown,
            name: "Shutdown",
            on_enter: None,
            on_exit: None,
            on_update: shutdown_update::<P>,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE — awaiting operator start
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update<P: ControlPorts>(ctx: &mut FsmContext, io: &mut P) -> Option<StateId> {
    match io.receive() {
        Some(cmd) if cmd == ctx.config.cmd_start => {
            io.log(MSG_START);
            Some(StateId::Initializing)
        }
        Some(other) => {
            debug!("IDLE: ignoring command byte 0x{:02x}", other);
            None
        }
        None => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  INITIALIZING — one calibration attempt per tick
// ═══════════════════════════════════════════════════════════════════════════

fn initializing_update<P: ControlPorts>(ctx: &mut FsmContext, io: &mut P) -> Option<StateId> {
    match io.calibrate() {
        Ok(()) => {
            info!("INIT: sensor calibrated");
            Some(StateId::Running)
        }
        Err(e) => {
            warn!("INIT: {}", e);
            io.log(MSG_CALIBRATION_FAILED);
            ctx.raise_fault(FaultCause::CalibrationFailed);
            Some(StateId::Error)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING — sample, guard, actuate
// ═══════════════════════════════════════════════════════════════════════════

fn running_update<P: ControlPorts>(ctx: &mut FsmContext, io: &mut P) -> Option<StateId> {
    let reading = io.read();

    // The verdict must be in hand before the actuator sees the sample.
    match ctx.interlock.check(reading) {
        Verdict::Safe(value) => {
            io.drive(value);
            None
        }
        Verdict::Trip(value) => {
            let limit = ctx.interlock.limit();
            ctx.raise_fault(FaultCause::OverLimit {
                reading: value,
                limit,
            });
            Some(StateId::Error)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR — safe state, waits for manual reset
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter<P: ControlPorts>(ctx: &mut FsmContext, io: &mut P) {
    // Halt on the tripping tick too, not only from the next one on.
    io.stop();
    match ctx.active_fault {
        Some(cause) => warn!("ERROR: actuator stopped, cause: {}", cause),
        None => warn!("ERROR: actuator stopped"),
    }
}

fn error_exit<P: ControlPorts>(ctx: &mut FsmContext, _io: &mut P) {
    info!("ERROR: reset received, returning to Idle");
    ctx.active_fault = None;
}

fn error_update<P: ControlPorts>(ctx: &mut FsmContext, io: &mut P) -> Option<StateId> {
    io.stop();
    io.transmit(MSG_FAULT_ALERT);

    match io.receive() {
        Some(cmd) if cmd == ctx.config.cmd_reset => Some(StateId::Idle),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SHUTDOWN — reserved
// ═══════════════════════════════════════════════════════════════════════════

fn shutdown_update<P: ControlPorts>(_ctx: &mut FsmContext, _io: &mut P) -> Option<StateId> {
    None
}
