//! Application-facing port surface.
//!
//! [`SerialPort`] is the dyn-safe call surface of one serial unit. Byte-level
//! line errors never unwind; they travel as [`ErrorFlags`] accumulated into
//! receive results, the way the hardware itself reports them. Hard failures
//! (unknown unit, bad configuration, exhausted timeout budget) use [`Error`].

use bitflags::bitflags;

/// Transfer direction selector for [`SerialPort::flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// The receive side (buffered, not yet read)
    In,
    /// The transmit side (queued, not yet on the wire)
    Out,
}

bitflags! {
    /// Per-byte receive status, OR-accumulated across a multi-byte call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ErrorFlags: u8 {
        /// Hardware reported a framing error
        const FRAMING = 1 << 0;
        /// Hardware reported a receiver overrun
        const OVERRUN = 1 << 1;
        /// Hardware reported a parity error
        const PARITY = 1 << 2;
        /// The software RX ring was full; the newest byte was dropped
        const OVERFLOW = 1 << 3;
        /// The operation exceeded the caller's timeout budget
        const TIMEOUT = 1 << 4;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorFlags({=u8:b})", self.bits());
    }
}

/// Result of a non-blocking single-byte receive.
///
/// `byte == None` is the no-data sentinel, not a failure: the buffer was
/// empty and nothing was mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecvResult {
    /// The received byte, if any
    pub byte: Option<u8>,
    /// Error flags accumulated since the previous successful read
    pub errors: ErrorFlags,
}

impl RecvResult {
    /// The no-data sentinel.
    pub const NO_DATA: Self = Self {
        byte: None,
        errors: ErrorFlags::empty(),
    };

    /// Whether a byte was actually read.
    pub fn has_data(&self) -> bool {
        self.byte.is_some()
    }
}

/// Result of a bulk blocking receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecvStatus {
    /// Bytes written to the caller's buffer
    pub count: usize,
    /// Error flags accumulated across the whole call
    pub errors: ErrorFlags,
}

impl RecvStatus {
    /// Whether the call ended because the timeout budget ran out.
    pub fn timed_out(&self) -> bool {
        self.errors.contains(ErrorFlags::TIMEOUT)
    }

    /// Whether every requested byte arrived without any error flag.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Hard failures of port operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No unit with the requested id is registered
    InvalidPort,
    /// The unit's configuration cannot be programmed (e.g. divisor overflow)
    InvalidConfig,
    /// The operation exceeded the caller's timeout budget
    Timeout,
    /// The registry has no free slot
    RegistryFull,
}

/// One serial unit, as seen by application code and interrupt dispatch.
///
/// Implementations are shared: every method takes `&self`, and instances
/// are meant to live in `'static` storage referenced both by foreground
/// code and by the platform's interrupt vectors. All blocking operations
/// poll with a bounded (or, with a zero timeout, unbounded) spin-wait;
/// there is no cooperative yield.
pub trait SerialPort: Sync {
    /// The unit's numeric id.
    fn id(&self) -> u8;

    /// Whether the receiver or the transmitter is enabled.
    fn is_open(&self) -> bool;

    /// Configure the hardware and enable RX, TX and the RX-ready interrupt.
    ///
    /// Idempotent: a no-op success when the unit is already open.
    fn open(&self) -> Result<(), Error>;

    /// Drain the transmit side, then disable RX, TX and both interrupt
    /// sources and discard any buffered-but-unread RX bytes.
    fn close(&self);

    /// Number of received bytes waiting to be read.
    fn available(&self) -> usize;

    /// `Out`: block until the TX buffer is drained and the last byte has
    /// physically left the wire. `In`: discard buffered-but-unread RX bytes.
    fn flush(&self, direction: Direction) -> Result<(), Error>;

    /// Queue one byte for transmission.
    ///
    /// Blocks while the TX buffer is full: with `timeout_ms > 0` the wait is
    /// bounded and fails with [`Error::Timeout`]; `0` waits unbounded. When
    /// interrupts are globally masked the wait makes progress by invoking
    /// the transmit handler inline. With `drain` the call flushes afterward.
    fn send_byte(&self, byte: u8, drain: bool, timeout_ms: u32) -> Result<(), Error>;

    /// Queue a buffer for transmission.
    ///
    /// The first failing byte halts the whole call; the drain-flush happens
    /// only once every byte has been queued successfully.
    fn send(&self, data: &[u8], drain: bool, timeout_ms: u32) -> Result<(), Error>;

    /// Queue a string for transmission.
    fn send_str(&self, s: &str, drain: bool, timeout_ms: u32) -> Result<(), Error> {
        self.send(s.as_bytes(), drain, timeout_ms)
    }

    /// Non-blocking single-byte receive.
    ///
    /// Returns the no-data sentinel on an empty buffer. A successful read
    /// also takes (and clears) the error flags accumulated since the
    /// previous successful read.
    fn recv(&self) -> RecvResult;

    /// Blocking bulk receive.
    ///
    /// Fills `buf` front to back. Returns early when a byte carries error
    /// flags (that byte is stored and counted) or when the timeout budget
    /// is exceeded; `timeout_ms == 0` waits unbounded.
    fn recv_into(&self, buf: &mut [u8], timeout_ms: u32) -> RecvStatus;

    /// Receive-complete interrupt entry point.
    ///
    /// Must be safe to invoke from true interrupt context and synchronously
    /// inline while interrupts are masked.
    fn on_recv(&self);

    /// Transmit-register-empty interrupt entry point.
    ///
    /// Same contract as [`SerialPort::on_recv`].
    fn on_send(&self);
}
