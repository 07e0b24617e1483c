//! PWM actuator adapter over `embedded-hal`.
//!
//! Maps a sensor reading onto a duty cycle of any
//! [`SetDutyCycle`](embedded_hal::pwm::SetDutyCycle) channel:
//! `duty% = reading / full_scale * 100`, clamped to 0–100.
//!
//! ## Safety contract
//!
//! This is a dumb actuator: the interlock lives in the FSM.  `stop()`
//! always writes fully-off, even if the channel already reports off, so a
//! missed write cannot leave the output energised.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::ActuatorSink;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmState {
    Stopped,
    Driving { percent: u8 },
}

pub struct PwmActuator<P> {
    pwm: P,
    full_scale: f32,
    state: PwmState,
}

impl<P: SetDutyCycle> PwmActuator<P> {
    /// `full_scale` is the reading that maps to 100% duty.
    pub fn new(pwm: P, full_scale: f32) -> Self {
        Self {
            pwm,
            full_scale,
            state: PwmState::Stopped,
        }
    }

    pub fn state(&self) -> PwmState {
        self.state
    }

    pub fn inner(&self) -> &P {
        &self.pwm
    }

    /// Duty percentage for `reading`.  Negative and NaN readings map to 0.
    pub fn percent_for(&self, reading: f32) -> u8 {
        let pct = reading / self.full_scale * 100.0;
        if pct.is_nan() || pct <= 0.0 {
            0
        } else {
            pct.min(100.0) as u8
        }
    }
}

impl<P: SetDutyCycle> ActuatorSink for PwmActuator<P> {
    fn drive(&mut self, reading: f32) {
        let percent = self.percent_for(reading);
        if self.pwm.set_duty_cycle_percent(percent).is_err() {
            warn!("PWM: {} (drive {}%)", ActuatorError::PwmWriteFailed, percent);
            return;
        }
        self.state = if percent == 0 {
            PwmState::Stopped
        } else {
            PwmState::Driving { percent }
        };
    }

    fn stop(&mut self) {
        if self.pwm.set_duty_cycle_fully_off().is_err() {
            warn!("PWM: {} (stop)", ActuatorError::PwmWriteFailed);
        }
        self.state = PwmState::Stopped;
    }
}
