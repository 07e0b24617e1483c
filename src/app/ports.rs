//! Port traits — the boundary between the control FSM and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlFsm (domain)
//! ```
//!
//! Driven adapters (serial link, sensor, actuator, log output) implement
//! these traits. The FSM consumes them through generics, so the domain core
//! never touches hardware directly.
//!
//! ## Timing contract
//!
//! Every method here must return in bounded time.  The control loop is
//! single-threaded and cooperative: a port that blocks stalls every state,
//! including the safety interlock.

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Command channel (serial link: host ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented command link to the operator / host.
pub trait CommandChannel {
    /// Take one pending byte, if any.  Never waits for one to arrive.
    fn receive(&mut self) -> Option<u8>;

    /// Queue `text` for transmission.  Fire-and-forget: failures are the
    /// adapter's to log and drop.
    fn transmit(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Sensor source (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the monitored scalar (e.g. temperature).
pub trait SensorSource {
    /// Run a single bounded calibration attempt.  Safe to call again after
    /// a failure.
    fn calibrate(&mut self) -> Result<(), SensorError>;

    /// Sample the sensor.  Always yields a value; adapters substitute their
    /// last good reading when the hardware read fails.
    fn read(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator sink (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the controlled output.  Both calls are idempotent.
pub trait ActuatorSink {
    /// Drive the actuator in proportion to `reading`.
    fn drive(&mut self, reading: f32);

    /// Bring the actuator to its safe (off) state.
    fn stop(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Logger (driven adapter: domain → diagnostic text)
// ───────────────────────────────────────────────────────────────

/// Human-readable diagnostic line output.
pub trait Logger {
    fn log(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Combined port set
// ───────────────────────────────────────────────────────────────

/// Everything one control step may touch.
///
/// Blanket-implemented, so a single test double implementing all four
/// ports, or a [`Collaborators`] bundle of four separate adapters, can be
/// handed to the FSM without a double mutable borrow.
pub trait ControlPorts: CommandChannel + SensorSource + ActuatorSink + Logger {}

impl<T> ControlPorts for T where T: CommandChannel + SensorSource + ActuatorSink + Logger {}

/// Four independent adapters glued into one [`ControlPorts`] value.
#[derive(Debug)]
pub struct Collaborators<C, S, A, L> {
    pub channel: C,
    pub sensor: S,
    pub actuator: A,
    pub logger: L,
}

impl<C, S, A, L> Collaborators<C, S, A, L> {
    pub fn new(channel: C, sensor: S, actuator: A, logger: L) -> Self {
        Self {
            channel,
            sensor,
            actuator,
            logger,
        }
    }
}

impl<C: CommandChannel, S, A, L> CommandChannel for Collaborators<C, S, A, L> {
    fn receive(&mut self) -> Option<u8> {
        self.channel.receive()
    }

    fn transmit(&mut self, text: &str) {
        self.channel.transmit(text);
    }
}

impl<C, S: SensorSource, A, L> SensorSource for Collaborators<C, S, A, L> {
    fn calibrate(&mut self) -> Result<(), SensorError> {
        self.sensor.calibrate()
    }

    fn read(&mut self) -> f32 {
        self.sensor.read()
    }
}

impl<C, S, A: ActuatorSink, L> ActuatorSink for Collaborators<C, S, A, L> {
    fn drive(&mut self, reading: f32) {
        self.actuator.drive(reading);
    }

    fn stop(&mut self) {
        self.actuator.stop();
    }
}

impl<C, S, A, L: Logger> Logger for Collaborators<C, S, A, L> {
    fn log(&mut self, text: &str) {
        self.logger.log(text);
    }
}
