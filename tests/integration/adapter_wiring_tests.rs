//! Integration tests: ControlFsm wired to the concrete adapters.
//!
//! Uses the same collaborators the host runner uses (SPSC RX FIFO,
//! drifting sensor, PWM actuator, log sink) plus the `embedded-io` UART
//! channel over an in-memory serial port.

use controlfsm::adapters::log_sink::LogSink;
use controlfsm::adapters::pwm::{PwmActuator, PwmState};
use controlfsm::adapters::sensor::{RawSampler, ThermistorSensor};
use controlfsm::adapters::sim::{RxFifo, SimChannel, SimPwm, SimSensor};
use controlfsm::adapters::uart::UartChannel;
use controlfsm::app::service::ControlFsm;
use controlfsm::config::SystemConfig;
use controlfsm::error::SensorError;
use controlfsm::fsm::StateId;

use core::convert::Infallible;
use embedded_io::{ErrorType, Read, ReadReady, Write, WriteReady};
use std::collections::VecDeque;

#[test]
fn simulated_rig_runs_until_drift_trips_interlock() {
    let config = SystemConfig::default();
    let mut fifo = RxFifo::new();
    let (mut rx_isr, rx) = fifo.split();

    let mut ctl = ControlFsm::new(
        config.clone(),
        SimChannel::new(rx),
        SimSensor::new(95.0, 1.0),
        PwmActuator::new(SimPwm::new(), config.actuator_full_scale),
        LogSink::new(),
    );
    ctl.start();
    assert_eq!(ctl.ports().logger.lines(), 1);

    rx_isr.enqueue(b'S').unwrap();
    assert_eq!(ctl.step(), StateId::Initializing);
    assert_eq!(ctl.step(), StateId::Running);

    // 95, 96, ... 100 are safe; 101 trips.
    for _ in 0..6 {
        assert_eq!(ctl.step(), StateId::Running);
    }
    assert_eq!(ctl.ports().actuator.state(), PwmState::Driving { percent: 100 });

    assert_eq!(ctl.step(), StateId::Error);
    assert_eq!(ctl.ports().actuator.state(), PwmState::Stopped);
    assert_eq!(ctl.ports().actuator.inner().duty(), 0);

    ctl.step();
    ctl.step();
    assert_eq!(ctl.ports().channel.transmitted(), 2);

    rx_isr.enqueue(b'R').unwrap();
    assert_eq!(ctl.step(), StateId::Idle);
    // boot + start lines
    assert_eq!(ctl.ports().logger.lines(), 2);
}

#[test]
fn simulated_calibration_failure_then_retry() {
    let config = SystemConfig::default();
    let mut fifo = RxFifo::new();
    let (mut rx_isr, rx) = fifo.split();
    let mut sensor = SimSensor::new(20.0, 0.0);
    sensor.fail_calibrations(1);

    let mut ctl = ControlFsm::new(
        config.clone(),
        SimChannel::new(rx),
        sensor,
        PwmActuator::new(SimPwm::new(), config.actuator_full_scale),
        LogSink::new(),
    );

    rx_isr.enqueue(b'S').unwrap();
    ctl.step();
    assert_eq!(ctl.step(), StateId::Error);

    rx_isr.enqueue(b'R').unwrap();
    rx_isr.enqueue(b'S').unwrap();
    assert_eq!(ctl.step(), StateId::Idle);
    assert_eq!(ctl.step(), StateId::Initializing);
    assert_eq!(ctl.step(), StateId::Running);
    assert_eq!(ctl.ports().sensor.calibrations(), 2);

    ctl.step();
    assert_eq!(ctl.ports().actuator.state(), PwmState::Driving { percent: 20 });
}

// ── Thermistor over a scripted ADC ───────────────────────────

/// ADC stand-in: scripted samples, then a steady mid-scale (about 25 C).
#[derive(Default)]
struct BenchAdc {
    script: VecDeque<Result<u16, ()>>,
}

impl RawSampler for BenchAdc {
    type Error = ();

    fn sample(&mut self) -> Result<u16, ()> {
        self.script.pop_front().unwrap_or(Ok(2048))
    }
}

#[test]
fn thermistor_faults_hold_last_good_reading() {
    let config = SystemConfig::default();
    let mut fifo = RxFifo::new();
    let (mut rx_isr, rx) = fifo.split();

    let mut ctl = ControlFsm::new(
        config.clone(),
        SimChannel::new(rx),
        ThermistorSensor::new(BenchAdc::default(), 0.0),
        PwmActuator::new(SimPwm::new(), config.actuator_full_scale),
        LogSink::new(),
    );

    rx_isr.enqueue(b'S').unwrap();
    assert_eq!(ctl.step(), StateId::Initializing);
    assert_eq!(ctl.step(), StateId::Running);
    assert!(ctl.ports().sensor.is_calibrated());

    assert_eq!(ctl.step(), StateId::Running);
    let held = ctl.ports().actuator.state();
    assert!(matches!(held, PwmState::Driving { percent: 24..=25 }));

    // ADC error, then a shorted probe: both hold the last good 25 C.
    ctl.ports_mut().sensor.inner_mut().script.extend([Err(()), Ok(0)]);
    assert_eq!(ctl.step(), StateId::Running);
    assert_eq!(ctl.ports().sensor.last_error(), Some(SensorError::ReadFailed));
    assert_eq!(ctl.step(), StateId::Running);
    assert_eq!(ctl.ports().sensor.last_error(), Some(SensorError::OutOfRange));
    assert_eq!(ctl.ports().sensor.faults(), 2);
    assert_eq!(ctl.ports().actuator.state(), held);
}

#[test]
fn thermistor_calibration_failure_enters_error() {
    let config = SystemConfig::default();
    let mut fifo = RxFifo::new();
    let (mut rx_isr, rx) = fifo.split();
    let mut adc = BenchAdc::default();
    adc.script.push_back(Err(()));

    let mut ctl = ControlFsm::new(
        config.clone(),
        SimChannel::new(rx),
        ThermistorSensor::new(adc, 0.0),
        PwmActuator::new(SimPwm::new(), config.actuator_full_scale),
        LogSink::new(),
    );

    rx_isr.enqueue(b'S').unwrap();
    ctl.step();
    assert_eq!(ctl.step(), StateId::Error);
    assert!(!ctl.ports().sensor.is_calibrated());
    assert_eq!(ctl.calibration_failures(), 1);
}

// ── UART over an in-memory serial port ────────────────────────

#[derive(Default)]
struct MemSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl ErrorType for MemSerial {
    type Error = Infallible;
}

impl Read for MemSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        match (buf.first_mut(), self.rx.pop_front()) {
            (Some(slot), Some(b)) => {
                *slot = b;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl ReadReady for MemSerial {
    fn read_ready(&mut self) -> Result<bool, Infallible> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for MemSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl WriteReady for MemSerial {
    fn write_ready(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }
}

#[test]
fn uart_channel_carries_commands_and_alerts() {
    let config = SystemConfig::default();
    let mut sensor = SimSensor::new(150.0, 0.0);
    sensor.set_reading(150.0);

    let mut ctl = ControlFsm::new(
        config.clone(),
        UartChannel::new(MemSerial::default()),
        sensor,
        PwmActuator::new(SimPwm::new(), config.actuator_full_scale),
        LogSink::new(),
    );

    ctl.ports_mut().channel.inner_mut().rx.push_back(b'S');
    assert_eq!(ctl.step(), StateId::Initializing);
    assert_eq!(ctl.step(), StateId::Running);
    assert_eq!(ctl.step(), StateId::Error);
    assert_eq!(ctl.step(), StateId::Error);

    let tx = String::from_utf8(ctl.ports().channel.inner().tx.clone()).unwrap();
    assert_eq!(tx, "ALERT: System Fault Detected\n");

    ctl.ports_mut().channel.inner_mut().rx.push_back(b'R');
    assert_eq!(ctl.step(), StateId::Idle);
    assert_eq!(ctl.ports().channel.error_count(), 0);
}
