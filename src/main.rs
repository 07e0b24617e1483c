//! ControlFSM — host runner.
//!
//! Wires the control FSM to simulated collaborators and runs the
//! non-blocking loop forever.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  stdin thread ──▶ SPSC RX FIFO ──▶ SimChannel  (CommandChannel)│
//! │                                   SimSensor   (SensorSource)  │
//! │                                   PwmActuator (ActuatorSink)  │
//! │                                   LogSink     (Logger)        │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │                 ControlFsm::step()  every interval            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Type `S` + Enter to start, `R` + Enter to reset after a fault.  The
//! simulated reading drifts upward and eventually trips the interlock.
#![deny(unused_must_use)]

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use controlfsm::adapters::log_sink::LogSink;
use controlfsm::adapters::pwm::PwmActuator;
use controlfsm::adapters::sim::{RxFifo, SimChannel, SimPwm, SimSensor};
use controlfsm::app::service::ControlFsm;
use controlfsm::config::SystemConfig;

/// Environment variable naming a JSON config file.
const CONFIG_ENV: &str = "CONTROLFSM_CONFIG";

/// Simulated ambient reading at boot.
const SIM_INITIAL_READING: f32 = 25.0;
/// Simulated drift per Running sample.
const SIM_DRIFT_PER_READ: f32 = 0.05;

fn load_config() -> Result<SystemConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        info!("{} not set, using default config", CONFIG_ENV);
        return Ok(SystemConfig::default());
    };
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Config read from '{}' failed ({}), using defaults", path, e);
            return Ok(SystemConfig::default());
        }
    };
    let config = SystemConfig::from_json(&text).with_context(|| format!("config file '{path}'"))?;
    info!("Config loaded from '{}'", path);
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  ControlFSM v{}                   ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;
    info!(
        "Serial link {} baud, loop every {} ms",
        config.uart_baud, config.control_loop_interval_ms
    );

    // ── 3. RX FIFO: stdin thread plays the UART RX interrupt ──
    let fifo: &'static mut RxFifo = Box::leak(Box::new(RxFifo::new()));
    let (mut producer, consumer) = fifo.split();

    std::thread::Builder::new()
        .name("uart-rx".into())
        .spawn(move || {
            for byte in std::io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                if byte == b'\n' || byte == b'\r' {
                    continue;
                }
                if producer.enqueue(byte).is_err() {
                    warn!("UART RX overflow, dropped 0x{:02x}", byte);
                }
            }
            info!("stdin closed, no further commands");
        })
        .context("spawning stdin reader")?;

    // ── 4. Collaborators + controller ─────────────────────────
    let interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));
    let actuator = PwmActuator::new(SimPwm::new(), config.actuator_full_scale);
    let mut ctl = ControlFsm::new(
        config,
        SimChannel::new(consumer),
        SimSensor::new(SIM_INITIAL_READING, SIM_DRIFT_PER_READ),
        actuator,
        LogSink::new(),
    );
    ctl.start();

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let mut last = ctl.state();
    loop {
        let state = ctl.step();
        if state != last {
            info!("STATE | {:?} -> {:?}", last, state);
            last = state;
        }
        std::thread::sleep(interval);
    }
}
