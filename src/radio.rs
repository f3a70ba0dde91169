//! Radio driver facade
//!
//! [`RadioDriver`] owns the register interface, the configuration and the
//! per-exchange state, and exposes the operations a sensor node needs:
//! initialization, sleep/wake, addressing, output power and the payload
//! exchanges implemented in [`payload`](crate::payload).
//!
//! # Example
//! ```ignore
//! use rfm_radio::{ChipVariant, IrqLatch, RadioDriver, SpiRegisterBus};
//!
//! static RADIO_IRQ: IrqLatch = IrqLatch::new();
//!
//! let polarity = ChipVariant::PacketOnly.profile().reset_polarity;
//! let bus = SpiRegisterBus::new(spi, cs, reset, delay, polarity);
//! let mut radio = RadioDriver::new(bus, &RADIO_IRQ);
//! radio.init(868_000_000, 0x12, ChipVariant::PacketOnly)?;
//!
//! radio.transmit_payload(b"hello", 0x24);
//! let mut buf = [0u8; 63];
//! let len = radio.receive_payload(&mut buf, true);
//! ```

use crate::bus::RegisterBus;
use crate::config::{RadioConfig, BROADCAST_ADDRESS, SETTLE_MS, SYNC_WORD};
use crate::device::Device;
use crate::error::InitError;
use crate::irq::{ChipEvents, IrqLatch};
use crate::mode::{ModeController, OperatingMode};
use crate::registers::rfm69::{self, AddressFiltering};
use crate::registers::rfm95;
use crate::timeout::TimeoutGovernor;
use crate::variant::{self, ChipVariant, Modulation, VariantProfile};

/// Result of [`RadioDriver::poll_receive_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxOutcome {
    /// A payload is waiting in the FIFO
    pub ready: bool,
    /// Signal strength of the payload
    ///
    /// - RFM69: register value, -dBm * 2
    /// - RFM95 packet mode: -dBm, rounded to nearest
    /// - RFM95 chirp mode: 157 - PacketRssi
    pub rssi: i16,
    /// Payload CRC was valid
    pub crc_ok: bool,
}

impl RxOutcome {
    /// Outcome while nothing has been received.
    pub const NOT_READY: Self = Self {
        ready: false,
        rssi: 255,
        crc_ok: false,
    };
}

/// Progress of the current or last payload exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExchangeState {
    /// No exchange since init or the last sleep/wake
    #[default]
    Idle,
    /// Latches cleared, DIO routed, about to enter Tx or Rx
    ///
    /// Only held inside a send or receive call; never observed between calls.
    Arming,
    /// Waiting for the chip
    Waiting,
    /// The exchange ended with a sent or received packet
    Completed,
    /// The receive ended without a packet
    TimedOut,
}

/// Driver for one RFM69 or RFM95 module.
///
/// The driver shares an [`IrqLatch`] with the host's interrupt handlers; see
/// the [`irq`](crate::irq) module for the wiring.
pub struct RadioDriver<'a, B> {
    pub(crate) device: Device<B>,
    pub(crate) latch: &'a IrqLatch,
    pub(crate) config: RadioConfig,
    pub(crate) profile: &'static VariantProfile,
    pub(crate) modulation: Modulation,
    pub(crate) modes: ModeController,
    pub(crate) governor: TimeoutGovernor,
    pub(crate) exchange: ExchangeState,
}

impl<'a, B> RadioDriver<'a, B>
where
    B: RegisterBus,
{
    /// Creates a driver with the default configuration.
    ///
    /// Nothing is sent to the chip until [`init`](Self::init).
    pub fn new(bus: B, latch: &'a IrqLatch) -> Self {
        Self::with_config(bus, latch, RadioConfig::default())
    }

    /// Creates a driver with the given configuration.
    pub fn with_config(bus: B, latch: &'a IrqLatch, config: RadioConfig) -> Self {
        let profile = ChipVariant::default().profile();
        Self {
            device: Device::new(bus),
            latch,
            modulation: profile.modulation(config.chirp),
            governor: TimeoutGovernor::new(config.timeout),
            config,
            profile,
            modes: ModeController::new(),
            exchange: ExchangeState::Idle,
        }
    }

    /// Powers up and programs the chip, leaving it in Standby.
    ///
    /// # Arguments
    /// * `frequency_hz` - Carrier frequency, clamped to 137-1020 MHz and
    ///   rounded to the nearest 61 Hz step
    /// * `node_address` - Address of this node for packet mode filtering
    /// * `variant` - Chip generation on the bus
    ///
    /// # Errors
    /// [`InitError::NoChip`] if the version register reads zero.
    pub fn init(
        &mut self,
        frequency_hz: u32,
        node_address: u8,
        variant: ChipVariant,
    ) -> Result<(), InitError> {
        self.abort_receive();
        self.profile = variant.profile();
        self.modulation = self.profile.modulation(self.config.chirp);
        let frequency_hz =
            frequency_hz.clamp(variant::FREQUENCY_MIN_HZ, variant::FREQUENCY_MAX_HZ);
        self.config.frequency_hz = frequency_hz;
        self.config.node_address = node_address;
        self.config.broadcast_address = BROADCAST_ADDRESS;
        self.exchange = ExchangeState::Idle;

        self.device.delay_ms(SETTLE_MS);
        self.device.delay_ms(SETTLE_MS);
        self.device.set_reset(false);
        self.device.delay_ms(SETTLE_MS);

        let version = match variant {
            ChipVariant::PacketOnly => self.device.read_register::<rfm69::Version>().value,
            ChipVariant::PacketOrChirpSwitchable => {
                self.device.read_register::<rfm95::Version>().value
            }
        };
        if version == 0x00 {
            #[cfg(feature = "defmt")]
            defmt::warn!("no radio answered the version probe");
            return Err(InitError::NoChip);
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "{} version {=u8:#x}, {=u32} Hz, {}",
            variant,
            version,
            frequency_hz,
            self.modulation
        );

        let frf = variant::frf_from_hz(frequency_hz);
        match (variant, self.modulation) {
            (ChipVariant::PacketOnly, _) => self.configure_packet_only(frf),
            (ChipVariant::PacketOrChirpSwitchable, Modulation::Packet) => {
                self.configure_switchable_packet(frf)
            }
            (ChipVariant::PacketOrChirpSwitchable, Modulation::Chirp) => {
                self.configure_switchable_chirp(frf)
            }
        }

        if let Some(dbm) = self.config.output_power {
            self.set_output_power(dbm);
        }

        self.set_mode(OperatingMode::Standby);
        Ok(())
    }

    fn configure_packet_only(&mut self, frf: u32) {
        let device = &mut self.device;

        device.write_register(rfm69::Frequency { frf });
        device.write_register(rfm69::DataModulation::default());
        device.write_register(rfm69::FrequencyDeviation { value: 0x00A4 });
        device.write_register(rfm69::PaLevel {
            pa0: false,
            pa1: true,
            pa2: false,
            output_power: 0x1F,
        });
        device.write_register(rfm69::Lna::default());
        device.write_register(rfm69::RxBandwidth {
            dcc_freq: 0b010,
            mantissa: 0b10,
            exponent: 4,
        });
        device.write_register(rfm69::AfcBandwidth {
            dcc_freq: 0b010,
            mantissa: 0b10,
            exponent: 4,
        });
        device.write_register(rfm69::RssiThreshold { value: 0xE4 });
        device.write_register(rfm69::PreambleLength { bytes: 3 });
        device.write_register(rfm69::SyncConfig {
            sync_on: true,
            fifo_fill_condition: false,
            size: 4,
            tolerance: 0,
        });
        device.write_register(rfm69::SyncValue { value: SYNC_WORD });
        device.write_register(rfm69::PacketConfig1 {
            variable_length: true,
            dc_free: 0,
            crc_on: true,
            crc_auto_clear_off: false,
            address_filtering: AddressFiltering::NodeOrBroadcast,
        });
        device.write_register(rfm69::PayloadLength { value: 0x40 });
        device.write_register(rfm69::NodeAddress {
            address: self.config.node_address,
        });
        device.write_register(rfm69::BroadcastAddress {
            address: BROADCAST_ADDRESS,
        });
        device.write_register(rfm69::FifoThreshold {
            tx_start_not_empty: true,
            threshold: 0x0F,
        });
        device.write_register(rfm69::PacketConfig2::default());
        device.write_register(rfm69::TestDagc { value: 0x30 });
        // Timeout on DIO4, ClkOut off
        device.write(rfm69::DIO_MAPPING2, 0x07);
    }

    fn configure_switchable_common(&mut self, frf: u32) {
        let device = &mut self.device;

        device.write_register(rfm95::Frequency { frf });
        device.write_register(rfm95::PaConfig {
            pa_boost: true,
            max_power: 7,
            output_power: 0x0F,
        });
        device.write_register(rfm95::Lna {
            gain: 1,
            boost_lf: 0,
            boost_hf: 0,
        });
    }

    fn configure_switchable_packet(&mut self, frf: u32) {
        self.configure_switchable_common(frf);
        let device = &mut self.device;

        device.write_register(rfm95::OpMode::default());
        device.write_register(rfm95::FrequencyDeviation { value: 0x00A4 });
        // AgcAutoOn, Rx trigger on PreambleDetect
        device.write_register(rfm95::RxConfig { value: 0x0E });
        device.write_register(rfm95::RssiConfig {
            offset: 0,
            smoothing: 4,
        });
        device.write_register(rfm95::RssiCollision { value: 0x0A });
        device.write_register(rfm95::RssiThreshold { value: 0x94 });
        device.write_register(rfm95::RxBandwidth {
            mantissa: 0b10,
            exponent: 4,
        });
        device.write_register(rfm95::AfcBandwidth {
            mantissa: 0b10,
            exponent: 4,
        });
        device.write_register(rfm95::PreambleDetect {
            on: true,
            size: 2,
            tolerance: 10,
        });
        device.write_register(rfm95::PreambleLength { bytes: 3 });
        device.write_register(rfm95::SyncConfig {
            auto_restart_rx: 0,
            preamble_polarity_55: false,
            sync_on: true,
            size: 4,
        });
        device.write_register(rfm95::SyncValue { value: SYNC_WORD });
        device.write_register(rfm95::PacketConfig1 {
            variable_length: true,
            dc_free: 0,
            crc_on: true,
            crc_auto_clear_off: true,
            address_filtering: AddressFiltering::NodeOrBroadcast,
        });
        device.write_register(rfm95::PacketConfig2 {
            packet_mode: true,
            io_home_on: false,
            beacon_on: false,
            payload_length_msb: 0,
        });
        device.write_register(rfm95::PayloadLength { value: 0x40 });
        device.write_register(rfm95::NodeAddress {
            address: self.config.node_address,
        });
        device.write_register(rfm95::BroadcastAddress {
            address: BROADCAST_ADDRESS,
        });
        device.write_register(rfm95::FifoThreshold {
            tx_start_not_empty: true,
            threshold: 0x0F,
        });
        // AutoImageCalOn off, TempThreshold 10 °C
        device.write_register(rfm95::ImageCal { value: 0x02 });
    }

    fn configure_switchable_chirp(&mut self, frf: u32) {
        self.configure_switchable_common(frf);

        // LongRangeMode is only writable in Sleep
        self.modes
            .set_mode(&mut self.device, self.profile, Modulation::Packet, OperatingMode::Sleep);
        self.device.delay_ms(SETTLE_MS);

        let device = &mut self.device;
        device.write_register(rfm95::OpMode {
            long_range: true,
            ..Default::default()
        });
        device.write(rfm95::LORA_FIFO_ADDR_PTR, 0x00);
        device.write_register(rfm95::LoraFifoBaseAddresses { tx: 0x80, rx: 0x00 });
        // 62.5 kHz, 4/5, explicit header
        device.write_register(rfm95::LoraModemConfig1 {
            bandwidth: 0b0110,
            coding_rate: 0b001,
            implicit_header: false,
        });
        // SF9, single packet, CRC on
        device.write_register(rfm95::LoraModemConfig2 {
            spreading_factor: 9,
            tx_continuous: false,
            rx_payload_crc_on: true,
            symbol_timeout_msb: 0,
        });
        device.write_register(rfm95::LoraSymbolTimeout { value: 0x64 });
        device.write_register(rfm95::LoraModemConfig3::default());
        device.write_register(rfm95::LoraPreambleLength { symbols: 8 });
        device.write_register(rfm95::LoraMaxPayloadLength { value: 0xFF });
        device.write_register(rfm95::LoraHopPeriod { value: 0 });
    }

    pub(crate) fn set_mode(&mut self, mode: OperatingMode) -> bool {
        self.modes
            .set_mode(&mut self.device, self.profile, self.modulation, mode)
    }

    /// Waits for the chip to settle, then enters Sleep.
    ///
    /// A receive left pending by `start_receive` is abandoned.
    pub fn sleep(&mut self) {
        self.abort_receive();
        self.device.delay_ms(SETTLE_MS);
        self.set_mode(OperatingMode::Sleep);
        self.exchange = ExchangeState::Idle;
    }

    /// Enters Standby, then waits for the oscillator to settle.
    pub fn wake(&mut self) {
        self.abort_receive();
        self.set_mode(OperatingMode::Standby);
        self.device.delay_ms(SETTLE_MS);
        self.exchange = ExchangeState::Idle;
    }

    /// Changes the node address.
    ///
    /// The chirp modem has no address filter, so in chirp mode only the
    /// configuration is updated.
    pub fn set_node_address(&mut self, address: u8) {
        self.config.node_address = address;
        if self.modulation == Modulation::Packet {
            self.device.write(self.profile.node_address, address);
        }
    }

    /// Sets the output power in dBm, clamped to the chip's range.
    ///
    /// - RFM69: -2..=13 dBm on PA1
    /// - RFM95: 2..=17 dBm on PA_BOOST
    ///
    /// Only the power field of the PA register changes.
    pub fn set_output_power(&mut self, dbm: i8) {
        let power = self.profile.power;
        self.device
            .modify(self.profile.pa, power.field_mask, power.field_for(dbm));
    }

    /// Reads back the output power in dBm.
    pub fn output_power(&mut self) -> i8 {
        let value = self.device.read(self.profile.pa);
        self.profile.power.dbm_for(value)
    }

    /// Reads the chip's interrupt flags and latches the events of interest.
    ///
    /// Called by blocking waits when [`IrqLatch::signal`] was raised; may
    /// also be called directly when the host can access the bus from its
    /// interrupt handler.
    pub fn on_interrupt(&mut self) {
        let events = match self.profile.chirp_for(self.modulation) {
            Some(chirp) => ChipEvents::from_chirp(self.device.read(chirp.irq_flags)),
            None => {
                let irq1 = self.device.read(self.profile.irq_flags1);
                let irq2 = self.device.read(self.profile.irq_flags2);
                ChipEvents::from_packet(irq1, irq2)
            }
        };

        if !events.flags.is_empty() {
            self.latch.raise(events.flags);
        }
    }

    /// Current signal strength, scaled like [`RxOutcome::rssi`].
    pub fn rssi(&mut self) -> i16 {
        match self.profile.chirp_for(self.modulation) {
            Some(chirp) => chirp.rssi.apply(self.device.read(chirp.rssi_value)),
            None => self.profile.rssi.apply(self.device.read(self.profile.rssi_value)),
        }
    }

    /// Last commanded operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.modes.current()
    }

    /// Progress of the current or last exchange.
    pub fn exchange_state(&self) -> ExchangeState {
        self.exchange
    }

    /// Active configuration.
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Chip generation selected at [`init`](Self::init).
    pub fn variant(&self) -> ChipVariant {
        self.profile.variant
    }

    /// Active modem.
    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    /// Returns `true` while a receive deadline is armed.
    pub fn timeout_enabled(&self) -> bool {
        self.governor.is_enabled()
    }

    /// Releases the bus.
    pub fn release(self) -> B {
        self.device.release()
    }
}
