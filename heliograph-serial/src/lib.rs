//! Interrupt-driven asynchronous serial transport.
//!
//! The driver moves bytes between foreground code and the hardware data
//! register through fixed-capacity ring buffers, with an interrupt handler
//! on the other end of each ring:
//!
//! ```text
//! caller ──► TX ring ──► on_send() ──► data register ──► wire
//! caller ◄── RX ring ◄── on_recv() ◄── data register ◄── wire
//! ```
//!
//! The bounded rings are the backpressure mechanism: a full TX ring blocks
//! the sender (with a cooperative timeout), a full RX ring drops the newest
//! byte and flags the loss. There is no OS and no scheduler; the only
//! concurrency is preemption by the interrupt handler, and the only lock is
//! the scoped interrupt-masking critical section around the TX enqueue.
//!
//! When the caller itself runs with interrupts masked, blocking operations
//! avoid deadlock by invoking the handler logic inline whenever the
//! hardware signals readiness (the "inline pump"). Handler bodies are plain
//! functions over the shared ring state, callable identically from the
//! asynchronous vector and from those synchronous call sites.
//!
//! Units are pre-allocated in `'static` storage, collected in an explicit
//! [`Registry`], and looked up by numeric id both by application code and
//! by whatever dispatches hardware interrupts.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod io;
pub mod registry;
pub mod ring;
pub mod usart;

pub use heliograph_hal as hal;
pub use io::{IoError, PortIo};
pub use registry::Registry;
pub use ring::Ring;
pub use usart::{Usart, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY};
