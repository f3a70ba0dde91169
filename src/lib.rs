#![cfg_attr(not(test), no_std)]
//! RFM69 / RFM95 Radio Driver
//!
//! This crate drives the HopeRF RFM69 (Semtech SX1231) and RFM95 (Semtech
//! SX1276) sub-GHz transceiver modules for battery powered sensor nodes:
//! initialization, sleep/wake, addressed send/receive of small payloads,
//! output power control and receive timeout recovery.
//!
//! # Features
//! - Frequency range: 137-1020 MHz, 61 Hz synthesizer resolution
//! - Modulation support:
//!   - RFM69: FSK packet mode
//!   - RFM95: FSK packet mode or LoRa (SF9, 62.5 kHz, CR 4/5)
//! - Payloads: up to 63 bytes in packet mode, 128 bytes in LoRa mode
//! - Output power:
//!   - RFM69: -2 to +13 dBm
//!   - RFM95: +2 to +17 dBm
//! - Receive timeout via the chip's timeout interrupt, a host driven tick,
//!   or both
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`bus`]: Byte-level bus contract and its `embedded-hal` implementation
//! - [`device`]: Register transactions: typed registers, raw bytes, FIFO
//! - [`registers`]: Register definitions per chip generation
//!   - [`registers::rfm69`]: SX1231 registers
//!   - [`registers::rfm95`]: SX1276 FSK and LoRa page registers
//! - [`variant`]: Per-generation register map, masks and limits
//! - [`mode`]: Operating modes and the mode register choke point
//! - [`irq`]: Interrupt latch shared with the host's interrupt handlers
//! - [`timeout`]: Receive deadline strategies
//! - [`payload`]: Frame layout and the send/receive protocols
//! - [`radio`]: The [`RadioDriver`] facade
//!
//! # Usage
//! The host wires three things:
//!
//! 1. A [`RegisterBus`], usually [`SpiRegisterBus`] over its HAL
//! 2. A `static` [`IrqLatch`], with [`IrqLatch::signal`] called on DIO0,
//!    DIO1 and DIO4 rising edges
//! 3. For software timeouts, [`IrqLatch::on_tick`] called from a periodic
//!    timer
//!
//! # Important Notes
//! - The driver never allocates; payload buffers are owned by the caller
//! - `receive_payload` with timeout disabled blocks until a packet arrives
//! - After a receive timeout the PA is set to maximum power
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
//! use rfm_radio::{ChipVariant, InitError, IrqLatch, RadioDriver, SpiRegisterBus};
//!
//! static RADIO_IRQ: IrqLatch = IrqLatch::new();
//!
//! fn ping<SPI, CS, RST, D>(spi: SPI, cs: CS, reset: RST, delay: D) -> Result<usize, InitError>
//! where
//!     SPI: SpiBus,
//!     CS: OutputPin,
//!     RST: OutputPin,
//!     D: DelayNs,
//! {
//!     let variant = ChipVariant::PacketOnly;
//!     let bus = SpiRegisterBus::new(spi, cs, reset, delay, variant.profile().reset_polarity);
//!     let mut radio = RadioDriver::new(bus, &RADIO_IRQ);
//!     radio.init(868_000_000, 0x01, variant)?;
//!
//!     radio.transmit_payload(b"ping", 0x02);
//!     let mut buf = [0u8; 63];
//!     Ok(radio.receive_payload(&mut buf, true))
//! }
//! ```

pub mod bus;
pub mod config;
pub mod device;
pub mod error;
pub mod irq;
pub mod mode;
pub mod payload;
pub mod radio;
pub mod registers;
pub mod timeout;
pub mod variant;

pub use bus::{RegisterBus, ResetPolarity, SpiRegisterBus};
pub use config::{RadioConfig, TimeoutStrategy, BROADCAST_ADDRESS};
pub use device::Device;
pub use error::InitError;
pub use irq::{IrqFlags, IrqLatch};
pub use mode::OperatingMode;
pub use radio::{ExchangeState, RadioDriver, RxOutcome};
pub use variant::{ChipVariant, Modulation};
