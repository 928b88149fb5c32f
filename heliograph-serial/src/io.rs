//! `embedded-io` adapter.
//!
//! Wraps any [`SerialPort`] in the ecosystem's blocking [`Read`]/[`Write`]
//! traits so protocol code written against `embedded-io` can run over a
//! heliograph unit unchanged.

use embedded_io::{ErrorKind, ErrorType, Read, Write};
use heliograph_hal::port::{Direction, Error, ErrorFlags, SerialPort};

/// Errors surfaced through the `embedded-io` traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// A hard port failure (timeout, invalid unit, ...)
    Port(Error),
    /// Line-error flags observed while receiving
    Line(ErrorFlags),
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> ErrorKind {
        match self {
            IoError::Port(Error::Timeout) => ErrorKind::TimedOut,
            IoError::Port(_) => ErrorKind::Other,
            IoError::Line(_) => ErrorKind::InvalidData,
        }
    }
}

/// Blocking reader/writer over a port.
///
/// `timeout_ms` bounds every blocking wait (`0` waits unbounded). Reads
/// block for the first byte only, then return whatever is buffered; bytes
/// delivered together with line-error flags are returned to the caller
/// and the flags are latched, surfacing as [`ErrorKind::InvalidData`] on
/// the next call so they cannot vanish.
pub struct PortIo<'a> {
    port: &'a dyn SerialPort,
    timeout_ms: u32,
    /// Line flags observed alongside already-delivered bytes, owed to the
    /// caller on the next read.
    pending: ErrorFlags,
}

impl<'a> PortIo<'a> {
    /// Wrap a port with the given timeout budget per call.
    pub fn new(port: &'a dyn SerialPort, timeout_ms: u32) -> Self {
        Self {
            port,
            timeout_ms,
            pending: ErrorFlags::empty(),
        }
    }
}

impl ErrorType for PortIo<'_> {
    type Error = IoError;
}

impl Read for PortIo<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        if buf.is_empty() {
            return Ok(0);
        }
        // Settle the debt from a previous partial delivery first
        if !self.pending.is_empty() {
            let flags = self.pending;
            self.pending = ErrorFlags::empty();
            return Err(IoError::Line(flags));
        }
        let want = self.port.available().clamp(1, buf.len());
        let status = self.port.recv_into(&mut buf[..want], self.timeout_ms);
        if status.count > 0 {
            // Delivered bytes win; latch their line flags for the next
            // call (a timeout is not a line condition and is not owed)
            self.pending = status.errors.difference(ErrorFlags::TIMEOUT);
            return Ok(status.count);
        }
        if status.timed_out() {
            Err(IoError::Port(Error::Timeout))
        } else if !status.errors.is_empty() {
            Err(IoError::Line(status.errors))
        } else {
            Ok(0)
        }
    }
}

impl Write for PortIo<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        self.port
            .send(buf, false, self.timeout_ms)
            .map_err(IoError::Port)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), IoError> {
        self.port.flush(Direction::Out).map_err(IoError::Port)
    }
}
