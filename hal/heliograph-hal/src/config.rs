//! Per-unit serial configuration.
//!
//! Each unit carries a fixed [`PortConfig`] chosen at construction time:
//! input clock, baud rate, frame format, oversampling mode and the polling
//! granularity used by timeout loops.

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Data-bits/parity/stop-bits configuration of a serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl FrameFormat {
    /// The ubiquitous 8N1 frame.
    pub const EIGHT_N1: Self = Self {
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self::EIGHT_N1
    }
}

/// Default polling granularity for timeout loops, in milliseconds.
pub const DEFAULT_POLL_MS: u32 = 1;

/// Complete configuration for one serial unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortConfig {
    /// Peripheral input clock in Hz
    pub clock_hz: u32,
    /// Requested baud rate (bps)
    pub baudrate: u32,
    /// Frame format on the wire
    pub format: FrameFormat,
    /// Double-speed oversampling (halves the divisor)
    pub double_speed: bool,
    /// Sleep increment of timeout-bounded wait loops, in milliseconds
    pub poll_ms: u32,
}

impl PortConfig {
    /// Create a configuration with an 8N1 frame, normal-speed oversampling
    /// and the default polling granularity.
    pub const fn new(clock_hz: u32, baudrate: u32) -> Self {
        Self {
            clock_hz,
            baudrate,
            format: FrameFormat::EIGHT_N1,
            double_speed: false,
            poll_ms: DEFAULT_POLL_MS,
        }
    }

    /// Compute the baud-rate divisor for this configuration.
    ///
    /// Normal speed rounds with `(clock + 8·baud) / (16·baud) - 1`; the
    /// double-speed mode halves the divisor with its own rounding term,
    /// `(clock + 4·baud) / (8·baud) - 1`.
    ///
    /// Returns `None` when the baud rate is zero or the divisor does not
    /// fit the 16-bit divisor registers.
    ///
    /// # Example
    /// ```
    /// use heliograph_hal::config::PortConfig;
    /// let cfg = PortConfig::new(16_000_000, 115_200);
    /// assert_eq!(cfg.divisor(), Some(8));
    /// ```
    pub const fn divisor(&self) -> Option<u16> {
        if self.baudrate == 0 {
            return None;
        }
        let clock = self.clock_hz as u64;
        let baud = self.baudrate as u64;
        let raw = if self.double_speed {
            (clock + 4 * baud) / (8 * baud)
        } else {
            (clock + 8 * baud) / (16 * baud)
        };
        if raw == 0 || raw - 1 > u16::MAX as u64 {
            None
        } else {
            Some((raw - 1) as u16)
        }
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::new(16_000_000, 115_200)
    }
}
