//! Chip-facing register boundary.
//!
//! A [`SerialBus`] is one hardware serial controller: a baud divisor, a
//! frame-format register, RX/TX enables, the two interrupt sources, a data
//! register and a status register. The driver never touches registers
//! directly; everything goes through this trait, which keeps the driver
//! testable against a mock wire on the host.

use bitflags::bitflags;

use crate::config::FrameFormat;

bitflags! {
    /// Sampled hardware line status.
    ///
    /// The three error bits are valid for the byte currently in the data
    /// register and must be sampled before that byte is read out.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        /// Stop bit was wrong for the received byte
        const FRAMING_ERROR = 1 << 0;
        /// Hardware receive FIFO overrun (a byte was lost in the controller)
        const OVERRUN_ERROR = 1 << 1;
        /// Parity check failed for the received byte
        const PARITY_ERROR = 1 << 2;
        /// Transmit data register can accept a byte
        const DATA_EMPTY = 1 << 3;
        /// Shift register is idle; the last byte left the wire
        const TX_COMPLETE = 1 << 4;
        /// Double-speed oversampling mode is active
        const DOUBLE_SPEED = 1 << 5;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LineStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "LineStatus({=u8:b})", self.bits());
    }
}

/// One hardware serial controller's registers.
///
/// Methods take `&self`: register I/O is inherently shared state, and a
/// single bus is accessed both from foreground code and from interrupt
/// context. Implementations are expected to be plain volatile register
/// accesses with no internal buffering.
pub trait SerialBus: Sync {
    /// Program the baud-rate divisor registers.
    fn set_divisor(&self, divisor: u16);

    /// Enable or disable double-speed oversampling.
    fn set_double_speed(&self, enabled: bool);

    /// Program data bits, parity and stop bits.
    fn set_format(&self, format: FrameFormat);

    /// Enable or disable the receiver.
    fn set_rx_enabled(&self, enabled: bool);

    /// Enable or disable the transmitter.
    fn set_tx_enabled(&self, enabled: bool);

    /// Enable or disable the receive-complete interrupt source.
    fn set_rx_irq_enabled(&self, enabled: bool);

    /// Enable or disable the transmit-register-empty interrupt source.
    fn set_tx_irq_enabled(&self, enabled: bool);

    /// Whether the receiver is enabled.
    fn rx_enabled(&self) -> bool;

    /// Whether the transmitter is enabled.
    fn tx_enabled(&self) -> bool;

    /// Whether the transmit-register-empty interrupt source is armed.
    fn tx_irq_enabled(&self) -> bool;

    /// Read the data register.
    ///
    /// Reading clears the receive-complete condition in hardware, so the
    /// same byte cannot re-signal the interrupt.
    fn read_data(&self) -> u8;

    /// Write one byte to the data register.
    fn write_data(&self, byte: u8);

    /// Sample the line-status flags.
    fn status(&self) -> LineStatus;

    /// Whether interrupts are globally enabled in the calling context.
    ///
    /// On a bare-metal target this is the global interrupt flag. The driver
    /// uses it to decide when the real interrupt cannot fire and handler
    /// logic must be invoked inline instead.
    fn irqs_enabled(&self) -> bool;

    /// Busy-wait for `ms` milliseconds.
    ///
    /// Used as the polling increment of every timeout-bounded wait loop.
    fn delay_ms(&self, ms: u32);
}
