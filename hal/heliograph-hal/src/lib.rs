//! Heliograph Hardware Abstraction Layer
//!
//! This crate defines the traits and plain data types at the two seams of
//! the serial transport, so the same driver code can run against any
//! controller (or against mock hardware in host tests).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application code                       │
//! └─────────────────────────────────────────┘
//!                     │ port::SerialPort
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  heliograph-serial (driver)             │
//! └─────────────────────────────────────────┘
//!                     │ bus::SerialBus
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Chip-specific registers / mock wire    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::SerialBus`] - one controller's registers, the chip-facing seam
//! - [`port::SerialPort`] - the application-facing call surface per unit

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod config;
pub mod port;

// Re-export key traits at crate root for convenience
pub use bus::{LineStatus, SerialBus};
pub use config::{DataBits, FrameFormat, Parity, PortConfig, StopBits};
pub use port::{Direction, Error, ErrorFlags, RecvResult, RecvStatus, SerialPort};
