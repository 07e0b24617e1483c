//! Log-based diagnostic sink.
//!
//! Implements [`Logger`] by writing each diagnostic line to the `log`
//! facade (which the runner routes to stderr; on a target it goes to the
//! UART console).

use log::info;

use crate::app::ports::Logger;

/// Adapter that forwards every Logger line to `log::info!`.
#[derive(Debug, Default)]
pub struct LogSink {
    lines: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self { lines: 0 }
    }

    /// Lines written since construction.
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

impl Logger for LogSink {
    fn log(&mut self, text: &str) {
        self.lines += 1;
        info!("LOG | {}", text);
    }
}
