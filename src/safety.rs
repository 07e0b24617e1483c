//! Safety interlock.
//!
//! The interlock is consulted by the `Running` handler **before** any
//! actuation for the sample it judges.  A reading strictly above the limit
//! trips it; so does a NaN, which compares false against everything and
//! therefore can never be proven safe.
//!
//! The interlock holds no latch of its own: once tripped, the FSM sits in
//! `Error` and only an explicit reset command brings it back to `Idle`.

use log::warn;

/// Result of judging one sample against the limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Sample is within limits and may be passed to the actuator.
    Safe(f32),
    /// Sample must not be actuated; the controller goes to `Error`.
    Trip(f32),
}

/// Over-limit guard for the monitored scalar.
#[derive(Debug, Clone)]
pub struct SafetyInterlock {
    limit: f32,
    /// Number of trips since boot.
    trips: u32,
}

impl SafetyInterlock {
    pub fn new(limit: f32) -> Self {
        Self { limit, trips: 0 }
    }

    /// Judge a single reading.
    pub fn check(&mut self, reading: f32) -> Verdict {
        if reading <= self.limit {
            return Verdict::Safe(reading);
        }
        self.trips = self.trips.saturating_add(1);
        warn!(
            "SAFETY TRIP: reading {} exceeds limit {}",
            reading, self.limit
        );
        Verdict::Trip(reading)
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    pub fn trips(&self) -> u32 {
        self.trips
    }
}
