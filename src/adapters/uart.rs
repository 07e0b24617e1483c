//! UART command channel over `embedded-io`.
//!
//! Wraps any serial port implementing [`embedded_io::Read`],
//! [`embedded_io::ReadReady`], [`embedded_io::Write`] and
//! [`embedded_io::WriteReady`] and exposes it as a [`CommandChannel`].
//!
//! `receive()` checks `read_ready()` first and only then reads a single
//! byte, so it never parks the control loop waiting for input.
//! `transmit()` checks `write_ready()` and drops the text when the port
//! cannot take it; a dropped alert is re-sent on the next Error iteration.
//! I/O errors on either direction are logged and dropped: the FSM does not
//! model them.
//!
//! ## Cadence
//!
//! Once accepted, a message is written with `write_all` + `flush`, which
//! returns only after the last byte has left.  That costs roughly
//! `10 * len / baud` seconds: the 30-byte fault alert takes about 3 ms at
//! 115200 baud but about 31 ms at 9600.  Keep `control_loop_interval_ms`
//! above that figure for the configured baud rate, or the loop runs slower
//! than configured while in Error.

use embedded_io::{Read, ReadReady, Write, WriteReady};
use log::warn;

use crate::app::ports::CommandChannel;
use crate::error::CommsError;

pub struct UartChannel<U> {
    uart: U,
    /// Consecutive I/O failures; reset by the next success.
    errors: u32,
    /// Messages dropped because the transmitter was busy.
    tx_dropped: u32,
}

impl<U> UartChannel<U>
where
    U: Read + ReadReady + Write + WriteReady,
{
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            errors: 0,
            tx_dropped: 0,
        }
    }

    /// Consecutive I/O failures since the last successful transfer.
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    /// Messages skipped because `write_ready()` reported a busy port.
    pub fn tx_dropped(&self) -> u32 {
        self.tx_dropped
    }

    pub fn inner(&self) -> &U {
        &self.uart
    }

    pub fn inner_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    fn note(&mut self, err: CommsError) {
        self.errors = self.errors.saturating_add(1);
        warn!("UART: {} ({} in a row)", err, self.errors);
    }
}

impl<U> CommandChannel for UartChannel<U>
where
    U: Read + ReadReady + Write + WriteReady,
{
    fn receive(&mut self) -> Option<u8> {
        match self.uart.read_ready() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(_) => {
                self.note(CommsError::ReceiveFailed);
                return None;
            }
        }

        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte) {
            Ok(1) => {
                self.errors = 0;
                Some(byte[0])
            }
            Ok(_) => None,
            Err(_) => {
                self.note(CommsError::ReceiveFailed);
                None
            }
        }
    }

    fn transmit(&mut self, text: &str) {
        match self.uart.write_ready() {
            Ok(true) => {}
            Ok(false) => {
                self.tx_dropped = self.tx_dropped.saturating_add(1);
                warn!("UART: transmitter busy, dropped {} bytes", text.len());
                return;
            }
            Err(_) => {
                self.note(CommsError::TransmitFailed);
                return;
            }
        }

        let result = self
            .uart
            .write_all(text.as_bytes())
            .and_then(|()| self.uart.flush());
        match result {
            Ok(()) => self.errors = 0,
            Err(_) => self.note(CommsError::TransmitFailed),
        }
    }
}
