//! The USART unit driver.
//!
//! One [`Usart`] owns a [`SerialBus`] (the hardware registers), the two
//! rings, and the accumulated RX error byte. The interrupt entry points
//! [`SerialPort::on_recv`] / [`SerialPort::on_send`] are plain functions
//! over that shared state, so blocking calls can run them inline when
//! interrupts are masked and the real vector cannot fire.
//!
//! Shared-state discipline: the RX ring is written only by `on_recv` and
//! read only by foreground code; the TX ring the other way around. The one
//! multi-step mutation crossing the boundary - store a TX byte, advance
//! head, arm the TX-empty interrupt - is bracketed by a critical section
//! that disables and restores the interrupt-enable state.

use heliograph_hal::bus::{LineStatus, SerialBus};
use heliograph_hal::config::PortConfig;
use heliograph_hal::port::{Direction, Error, ErrorFlags, RecvResult, RecvStatus, SerialPort};
use portable_atomic::{AtomicU8, Ordering};

use crate::ring::Ring;

/// Default RX ring size in slots (one slot stays unused).
pub const DEFAULT_RX_CAPACITY: usize = 64;
/// Default TX ring size in slots (one slot stays unused).
pub const DEFAULT_TX_CAPACITY: usize = 64;

/// One hardware serial controller instance.
///
/// Intended to live in `'static` storage for the life of the process and be
/// shared by reference between foreground code and interrupt dispatch; see
/// [`crate::Registry`].
pub struct Usart<B, const RX: usize = DEFAULT_RX_CAPACITY, const TX: usize = DEFAULT_TX_CAPACITY> {
    id: u8,
    bus: B,
    config: PortConfig,
    /// RX error bits accumulated by the handler, cleared by a successful
    /// single-byte read and by `open()`.
    rx_errors: AtomicU8,
    rx: Ring<RX>,
    tx: Ring<TX>,
}

impl<B: SerialBus, const RX: usize, const TX: usize> Usart<B, RX, TX> {
    /// Create a unit over the given bus with a fixed configuration.
    pub const fn new(id: u8, bus: B, config: PortConfig) -> Self {
        Self {
            id,
            bus,
            config,
            rx_errors: AtomicU8::new(0),
            rx: Ring::new(),
            tx: Ring::new(),
        }
    }

    /// The underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// The unit's configuration.
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    fn poll_ms(&self) -> u32 {
        self.config.poll_ms.max(1)
    }

    fn line_errors(status: LineStatus) -> ErrorFlags {
        let mut errors = ErrorFlags::empty();
        if status.contains(LineStatus::FRAMING_ERROR) {
            errors |= ErrorFlags::FRAMING;
        }
        if status.contains(LineStatus::OVERRUN_ERROR) {
            errors |= ErrorFlags::OVERRUN;
        }
        if status.contains(LineStatus::PARITY_ERROR) {
            errors |= ErrorFlags::PARITY;
        }
        errors
    }

    /// Whether the transmit handler can be run inline right now: the real
    /// interrupt cannot fire (globally masked) and hardware can take a byte.
    fn can_pump_tx(&self) -> bool {
        !self.bus.irqs_enabled() && self.bus.status().contains(LineStatus::DATA_EMPTY)
    }
}

impl<B: SerialBus, const RX: usize, const TX: usize> SerialPort for Usart<B, RX, TX> {
    fn id(&self) -> u8 {
        self.id
    }

    fn is_open(&self) -> bool {
        self.bus.rx_enabled() || self.bus.tx_enabled()
    }

    fn open(&self) -> Result<(), Error> {
        if self.is_open() {
            return Ok(());
        }

        let divisor = self.config.divisor().ok_or(Error::InvalidConfig)?;
        self.bus.set_double_speed(self.config.double_speed);
        self.bus.set_divisor(divisor);
        self.bus.set_format(self.config.format);
        self.rx_errors.store(0, Ordering::Release);

        self.bus.set_rx_enabled(true);
        self.bus.set_tx_enabled(true);
        self.bus.set_rx_irq_enabled(true);
        // The TX-empty interrupt stays off until data is queued.
        self.bus.set_tx_irq_enabled(false);
        Ok(())
    }

    fn close(&self) {
        let _ = self.flush(Direction::Out);
        self.bus.set_tx_enabled(false);
        self.bus.set_rx_enabled(false);
        self.bus.set_rx_irq_enabled(false);
        self.bus.set_tx_irq_enabled(false);
        self.rx.clear();
    }

    fn available(&self) -> usize {
        self.rx.len()
    }

    fn flush(&self, direction: Direction) -> Result<(), Error> {
        match direction {
            Direction::In => self.rx.clear(),
            Direction::Out => {
                // Done only when the handler has disarmed its own trigger
                // (ring empty) and the last byte physically left the wire.
                while self.bus.tx_irq_enabled()
                    || !self.bus.status().contains(LineStatus::TX_COMPLETE)
                {
                    if self.bus.tx_irq_enabled() && self.can_pump_tx() {
                        self.on_send();
                    } else {
                        core::hint::spin_loop();
                    }
                }
            }
        }
        Ok(())
    }

    fn send_byte(&self, byte: u8, drain: bool, timeout_ms: u32) -> Result<(), Error> {
        let mut waited = 0u32;

        // No room: wait for the handler to drain a slot, pumping it inline
        // when the real interrupt cannot fire.
        while self.tx.is_full() {
            if self.can_pump_tx() {
                self.on_send();
                continue;
            }
            if timeout_ms > 0 {
                let poll = self.poll_ms();
                self.bus.delay_ms(poll);
                waited = waited.saturating_add(poll);
                if waited >= timeout_ms {
                    return Err(Error::Timeout);
                }
            } else {
                core::hint::spin_loop();
            }
        }

        critical_section::with(|_| {
            // Room is guaranteed to persist: the handler only ever drains
            // this ring, so the fullness check above cannot be invalidated.
            let _ = self.tx.push(byte);
            self.bus.set_tx_irq_enabled(true);
        });

        if drain {
            self.flush(Direction::Out)?;
        }
        Ok(())
    }

    fn send(&self, data: &[u8], drain: bool, timeout_ms: u32) -> Result<(), Error> {
        for &byte in data {
            self.send_byte(byte, false, timeout_ms)?;
        }
        if drain {
            self.flush(Direction::Out)?;
        }
        Ok(())
    }

    fn recv(&self) -> RecvResult {
        match self.rx.pop() {
            Some(byte) => {
                let bits = self.rx_errors.swap(0, Ordering::AcqRel);
                RecvResult {
                    byte: Some(byte),
                    errors: ErrorFlags::from_bits_truncate(bits),
                }
            }
            None => RecvResult::NO_DATA,
        }
    }

    fn recv_into(&self, buf: &mut [u8], timeout_ms: u32) -> RecvStatus {
        let mut status = RecvStatus {
            count: 0,
            errors: ErrorFlags::empty(),
        };
        let mut waited = 0u32;

        while status.count < buf.len() {
            let result = self.recv();
            match result.byte {
                Some(byte) => {
                    buf[status.count] = byte;
                    status.count += 1;
                    status.errors |= result.errors;
                    if !result.errors.is_empty() {
                        break;
                    }
                }
                None => {
                    if timeout_ms > 0 {
                        let poll = self.poll_ms();
                        self.bus.delay_ms(poll);
                        waited = waited.saturating_add(poll);
                        if waited >= timeout_ms {
                            status.errors |= ErrorFlags::TIMEOUT;
                            break;
                        }
                    } else {
                        core::hint::spin_loop();
                    }
                }
            }
        }
        status
    }

    fn on_recv(&self) {
        let mut errors = Self::line_errors(self.bus.status());
        // Always drain the data register so the receive-complete condition
        // cannot re-signal the same byte; a full ring drops the newest.
        let byte = self.bus.read_data();
        if !self.rx.push(byte) {
            errors |= ErrorFlags::OVERFLOW;
        }
        if !errors.is_empty() {
            self.rx_errors.fetch_or(errors.bits(), Ordering::AcqRel);
        }
    }

    fn on_send(&self) {
        if let Some(byte) = self.tx.pop() {
            self.bus.write_data(byte);
        }
        if self.tx.is_empty() {
            // Nothing left to send; disarm the trigger until the next queue.
            self.bus.set_tx_irq_enabled(false);
        }
    }
}
