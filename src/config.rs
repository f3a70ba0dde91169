//! Driver configuration
//!
//! [`RadioConfig`] holds everything the driver needs to know before `init`
//! programs the chip. The defaults match a sensor node on the 868 MHz band
//! using packet mode and the combined hardware/software receive timeout.

/// Broadcast address accepted by every node in addition to its own address.
pub const BROADCAST_ADDRESS: u8 = 0x84;

/// Fixed 8 byte sync word shared by both chip generations.
pub const SYNC_WORD: [u8; 8] = [0x2F, 0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36];

/// Settle time around reset and power mode changes, in milliseconds.
pub const SETTLE_MS: u32 = 5;

/// Default carrier frequency in Hz.
pub const DEFAULT_FREQUENCY_HZ: u32 = 868_000_000;

/// Default software deadline in ticks, about 100 ms at a 30 Hz tick.
pub const DEFAULT_TIMEOUT_TICKS: u16 = 3;

/// How a receive with timeout enabled is bounded.
///
/// The hardware timeout interrupt of these chips is known to occasionally not
/// fire, so the default combines it with a tick based deadline driven by
/// [`IrqLatch::on_tick`](crate::IrqLatch::on_tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutStrategy {
    /// Only the chip's receive timeout
    ///
    /// Packet mode routes the Timeout interrupt to DIO4 and programs the
    /// RX timeout registers. Chirp mode uses single receive mode, which ends
    /// with RxTimeout on DIO1 after the configured symbol count.
    Hardware,
    /// Only the tick counter: the receive times out on the `ticks`th call to
    /// `on_tick` after it was armed
    Software {
        /// Number of ticks before the timeout is forced
        ticks: u16,
    },
    /// Hardware timeout with the tick counter as a fallback
    HardwareWithFallback {
        /// Number of ticks before the timeout is forced
        ticks: u16,
    },
}

impl TimeoutStrategy {
    /// Returns `true` if the chip's own timeout is used.
    pub fn uses_hardware(&self) -> bool {
        matches!(self, Self::Hardware | Self::HardwareWithFallback { .. })
    }

    /// Returns the software deadline, if any.
    pub fn ticks(&self) -> Option<u16> {
        match self {
            Self::Hardware => None,
            Self::Software { ticks } | Self::HardwareWithFallback { ticks } => Some(*ticks),
        }
    }
}

impl Default for TimeoutStrategy {
    fn default() -> Self {
        Self::HardwareWithFallback {
            ticks: DEFAULT_TIMEOUT_TICKS,
        }
    }
}

/// Radio configuration owned by the driver.
///
/// `frequency_hz` and `node_address` are overwritten by the arguments of
/// [`RadioDriver::init`](crate::RadioDriver::init).
///
/// # Example
/// ```
/// use rfm_radio::{RadioConfig, TimeoutStrategy};
///
/// let config = RadioConfig::default()
///     .with_output_power(10)
///     .with_timeout(TimeoutStrategy::Software { ticks: 6 });
/// assert_eq!(config.output_power, Some(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// Carrier frequency in Hz
    pub frequency_hz: u32,
    /// Address of this node
    pub node_address: u8,
    /// Broadcast address, always [`BROADCAST_ADDRESS`]
    pub broadcast_address: u8,
    /// Output power applied at the end of `init`, `None` keeps the maximum
    pub output_power: Option<i8>,
    /// Use the chirp (LoRa) modem; ignored on chips without one
    pub chirp: bool,
    /// Receive timeout strategy
    pub timeout: TimeoutStrategy,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            node_address: 0x00,
            broadcast_address: BROADCAST_ADDRESS,
            output_power: None,
            chirp: false,
            timeout: TimeoutStrategy::default(),
        }
    }
}

impl RadioConfig {
    /// Sets the carrier frequency.
    pub fn with_frequency(mut self, frequency_hz: u32) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Sets the node address.
    pub fn with_node_address(mut self, address: u8) -> Self {
        self.node_address = address;
        self
    }

    /// Requests an output power in dBm, clamped to the chip's range at `init`.
    pub fn with_output_power(mut self, dbm: i8) -> Self {
        self.output_power = Some(dbm);
        self
    }

    /// Selects the chirp modem on chips that have one.
    pub fn with_chirp(mut self, chirp: bool) -> Self {
        self.chirp = chirp;
        self
    }

    /// Sets the receive timeout strategy.
    pub fn with_timeout(mut self, timeout: TimeoutStrategy) -> Self {
        self.timeout = timeout;
        self
    }
}
