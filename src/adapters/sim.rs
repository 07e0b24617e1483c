//! Host simulation collaborators.
//!
//! Stand-ins for the serial link, the sensor, and the PWM output so the
//! controller can run (and be tested) on a development machine.
//!
//! The RX side of [`SimChannel`] is the consumer half of a lock-free SPSC
//! queue.  Whatever plays the UART RX interrupt (a stdin reader thread in
//! the runner, a test body elsewhere) owns the producer half and pushes
//! bytes; the control loop pops at most one per `receive()`.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ RX "ISR"     │────▶│  SPSC queue  │────▶│  SimChannel  │
//! │ (producer)   │     │  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use heapless::spsc::{Consumer, Queue};
use log::info;

use crate::app::ports::{CommandChannel, SensorSource};
use crate::error::SensorError;

/// Capacity of the simulated UART RX FIFO (one slot is reserved by the
/// queue, so 63 bytes can be pending).
pub const RX_FIFO_CAP: usize = 64;

/// Simulated UART RX FIFO.
pub type RxFifo = Queue<u8, RX_FIFO_CAP>;

// ── Command channel ───────────────────────────────────────────

pub struct SimChannel<'q> {
    rx: Consumer<'q, u8, RX_FIFO_CAP>,
    transmitted: u64,
}

impl<'q> SimChannel<'q> {
    pub fn new(rx: Consumer<'q, u8, RX_FIFO_CAP>) -> Self {
        Self { rx, transmitted: 0 }
    }

    /// Messages transmitted since construction.
    pub fn transmitted(&self) -> u64 {
        self.transmitted
    }

    /// Bytes waiting in the RX FIFO.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl CommandChannel for SimChannel<'_> {
    fn receive(&mut self) -> Option<u8> {
        self.rx.dequeue()
    }

    fn transmit(&mut self, text: &str) {
        self.transmitted += 1;
        info!("UART TX | {}", text.trim_end());
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// Scalar sensor with a linear drift per sample and scriptable
/// calibration failures.
#[derive(Debug, Clone)]
pub struct SimSensor {
    reading: f32,
    drift_per_read: f32,
    calibration_failures_left: u32,
    calibrations: u32,
}

impl SimSensor {
    pub fn new(initial: f32, drift_per_read: f32) -> Self {
        Self {
            reading: initial,
            drift_per_read,
            calibration_failures_left: 0,
            calibrations: 0,
        }
    }

    /// Make the next `n` calibration attempts fail.
    pub fn fail_calibrations(&mut self, n: u32) {
        self.calibration_failures_left = n;
    }

    /// Overwrite the value the next `read()` returns.
    pub fn set_reading(&mut self, value: f32) {
        self.reading = value;
    }

    /// Calibration attempts made so far, successful or not.
    pub fn calibrations(&self) -> u32 {
        self.calibrations
    }
}

impl SensorSource for SimSensor {
    fn calibrate(&mut self) -> Result<(), SensorError> {
        self.calibrations += 1;
        if self.calibration_failures_left > 0 {
            self.calibration_failures_left -= 1;
            return Err(SensorError::CalibrationFailed);
        }
        Ok(())
    }

    fn read(&mut self) -> f32 {
        let value = self.reading;
        self.reading += self.drift_per_read;
        value
    }
}

// ── PWM channel ───────────────────────────────────────────────

/// In-memory PWM channel with a 0–1000 duty range.
#[derive(Debug, Default)]
pub struct SimPwm {
    duty: u16,
}

impl SimPwm {
    pub const MAX_DUTY: u16 = 1000;

    pub fn new() -> Self {
        Self { duty: 0 }
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl ErrorType for SimPwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty.min(Self::MAX_DUTY);
        Ok(())
    }
}
