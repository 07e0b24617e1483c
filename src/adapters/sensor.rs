//! NTC thermistor sensor (10 kOhm @ 25 C, B = 3950) over a raw ADC sampler.
//!
//! Wired in a voltage divider with a fixed 10 kOhm resistor.  The simplified
//! Beta (Steinhart-Hart) equation converts resistance to temperature.
//!
//! ## Failure policy
//!
//! [`SensorSource::read`] cannot fail, so this adapter never lets a bad
//! sample through:
//!
//! | Condition                            | Reported as                 | Returned  |
//! |--------------------------------------|-----------------------------|-----------|
//! | read before a successful calibrate   | [`SensorError::NotReady`]   | last good |
//! | sampler returned an error            | [`SensorError::ReadFailed`] | last good |
//! | divider at a rail, or outside range  | [`SensorError::OutOfRange`] | last good |
//!
//! "Last good" starts as the safe default given to [`ThermistorSensor::new`]
//! and is replaced by every plausible sample.  Each failure is logged with
//! `warn!` and kept in [`ThermistorSensor::last_error`].

use core::fmt::Debug;

use log::{debug, warn};

use crate::app::ports::SensorSource;
use crate::error::SensorError;

/// One-shot raw ADC conversion.  Implementations must return in bounded
/// time.
pub trait RawSampler {
    type Error: Debug;

    fn sample(&mut self) -> Result<u16, Self::Error>;
}

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;
/// Divider voltage this close to either rail means an open or shorted probe.
const RAIL_MARGIN_V: f32 = 0.01;

/// Lowest plausible temperature (C).
pub const PLAUSIBLE_MIN_C: f32 = -40.0;
/// Highest plausible temperature (C).
pub const PLAUSIBLE_MAX_C: f32 = 150.0;

/// Samples averaged by one calibration attempt.
pub const CALIBRATION_SAMPLES: usize = 4;

pub struct ThermistorSensor<A> {
    adc: A,
    last_good: f32,
    calibrated: bool,
    faults: u32,
    last_error: Option<SensorError>,
}

impl<A: RawSampler> ThermistorSensor<A> {
    /// `safe_default` is what `read()` yields until the first good sample.
    pub fn new(adc: A, safe_default: f32) -> Self {
        Self {
            adc,
            last_good: safe_default,
            calibrated: false,
            faults: 0,
            last_error: None,
        }
    }

    /// Most recent accepted temperature.
    pub fn last_good(&self) -> f32 {
        self.last_good
    }

    /// Failed reads since construction.
    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn last_error(&self) -> Option<SensorError> {
        self.last_error
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    /// One sample, converted and range-checked.
    fn measure(&mut self) -> Result<f32, SensorError> {
        let raw = self.adc.sample().map_err(|e| {
            debug!("ADC sample error: {:?}", e);
            SensorError::ReadFailed
        })?;
        adc_to_celsius(raw).ok_or(SensorError::OutOfRange)
    }

    fn reject(&mut self, err: SensorError) -> f32 {
        self.faults = self.faults.saturating_add(1);
        self.last_error = Some(err);
        warn!("Thermistor: {}, holding {:.2} C", err, self.last_good);
        self.last_good
    }
}

impl<A: RawSampler> SensorSource for ThermistorSensor<A> {
    fn calibrate(&mut self) -> Result<(), SensorError> {
        let mut sum = 0.0;
        for _ in 0..CALIBRATION_SAMPLES {
            match self.measure() {
                Ok(celsius) => sum += celsius,
                Err(e) => {
                    self.calibrated = false;
                    self.last_error = Some(e);
                    warn!("Thermistor calibration aborted: {}", e);
                    return Err(SensorError::CalibrationFailed);
                }
            }
        }
        self.last_good = sum / CALIBRATION_SAMPLES as f32;
        self.calibrated = true;
        self.last_error = None;
        debug!("Thermistor calibrated, baseline {:.2} C", self.last_good);
        Ok(())
    }

    fn read(&mut self) -> f32 {
        if !self.calibrated {
            return self.reject(SensorError::NotReady);
        }
        match self.measure() {
            Ok(celsius) => {
                self.last_good = celsius;
                celsius
            }
            Err(e) => self.reject(e),
        }
    }
}

/// Convert a raw 12-bit divider sample to Celsius.  `None` when the probe
/// is open or shorted, or the result is outside the plausible range.
pub fn adc_to_celsius(raw: u16) -> Option<f32> {
    let voltage = (f32::from(raw) / ADC_MAX) * V_REF;
    if voltage <= RAIL_MARGIN_V || voltage >= V_REF - RAIL_MARGIN_V {
        return None;
    }
    let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    if inv_t <= 0.0 {
        return None;
    }
    let celsius = (1.0 / inv_t) - 273.15;
    (PLAUSIBLE_MIN_C..=PLAUSIBLE_MAX_C)
        .contains(&celsius)
        .then_some(celsius)
}
