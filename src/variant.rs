//! Chip generation profiles
//!
//! The protocol logic is shared by both generations; everything that differs
//! on the wire is looked up in a [`VariantProfile`]: register addresses, bit
//! masks, DIO routes, payload limits, output power mapping and RSSI scaling.
//!
//! # Important Notes
//! - Both generations use a 32 MHz crystal, so the synthesizer step is the
//!   same 61.03515625 Hz
//! - The RFM95 has two register pages; the [`ChirpProfile`] describes the
//!   LoRa page and is only present on chips that can switch to it

use crate::bus::ResetPolarity;
use crate::registers::{rfm69, rfm95};

/// Synthesizer step (32 MHz / 2^19) scaled by 10^8.
pub const FREQUENCY_STEP_E8: u64 = 6_103_515_625;

/// Lowest carrier frequency either synthesizer can lock to.
pub const FREQUENCY_MIN_HZ: u32 = 137_000_000;

/// Highest carrier frequency either synthesizer can lock to.
pub const FREQUENCY_MAX_HZ: u32 = 1_020_000_000;

const E8: u64 = 100_000_000;

/// Converts a carrier frequency to the 24 bit synthesizer value, rounded to
/// the nearest step.
///
/// Frequencies outside the synthesizer range are clamped to it.
pub fn frf_from_hz(frequency_hz: u32) -> u32 {
    let frequency_hz = frequency_hz.clamp(FREQUENCY_MIN_HZ, FREQUENCY_MAX_HZ);
    let scaled = frequency_hz as u64 * E8;
    ((scaled + FREQUENCY_STEP_E8 / 2) / FREQUENCY_STEP_E8) as u32
}

/// Converts a 24 bit synthesizer value back to Hz, rounded to the nearest Hz.
pub fn hz_from_frf(frf: u32) -> u32 {
    ((frf as u64 * FREQUENCY_STEP_E8 + E8 / 2) / E8) as u32
}

/// Supported chip generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipVariant {
    /// Fixed function FSK packet radio (RFM69, SX1231)
    #[default]
    PacketOnly,
    /// FSK packet radio that can switch to the LoRa chirp modem (RFM95, SX1276)
    PacketOrChirpSwitchable,
}

impl ChipVariant {
    /// Returns the static profile of this generation.
    pub fn profile(self) -> &'static VariantProfile {
        match self {
            Self::PacketOnly => &PACKET_ONLY,
            Self::PacketOrChirpSwitchable => &SWITCHABLE,
        }
    }
}

/// Active modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modulation {
    /// FSK packet engine with length and address framing
    #[default]
    Packet,
    /// LoRa chirp spread spectrum
    Chirp,
}

/// A DIO mapping: the bits of `mask` in `register` are set to `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DioRoute {
    /// DIO mapping register
    pub register: u8,
    /// Field of the DIO pin
    pub mask: u8,
    /// Field value selecting the event
    pub bits: u8,
}

/// Conversion between the PA register field and dBm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerMapping {
    /// Lowest output power in dBm
    pub min_dbm: i8,
    /// Highest output power in dBm
    pub max_dbm: i8,
    /// dBm = field + offset
    pub offset: i8,
    /// Output power field of the PA register
    pub field_mask: u8,
    /// Full PA register value for maximum power
    pub max_value: u8,
}

impl PowerMapping {
    /// Clamps `dbm` into range and returns the PA field value.
    pub fn field_for(&self, dbm: i8) -> u8 {
        let dbm = dbm.clamp(self.min_dbm, self.max_dbm);
        (dbm - self.offset) as u8 & self.field_mask
    }

    /// Decodes the output power from a PA register value.
    pub fn dbm_for(&self, register: u8) -> i8 {
        (register & self.field_mask) as i8 + self.offset
    }
}

/// How a raw RSSI register value is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RssiScale {
    /// Register value as is (-dBm * 2)
    Raw,
    /// Register value halved, rounded to nearest (-dBm)
    Halved,
    /// `base - value` (dBm below `base`)
    Below(i16),
}

impl RssiScale {
    /// Applies the scaling to a register value.
    pub fn apply(self, raw: u8) -> i16 {
        match self {
            Self::Raw => raw as i16,
            Self::Halved => (raw as i16 + 1) / 2,
            Self::Below(base) => base - raw as i16,
        }
    }
}

/// Registers and routes of the LoRa page.
#[derive(Debug)]
pub struct ChirpProfile {
    /// Interrupt flags, see [`rfm95::LoraIrq`]
    pub irq_flags: u8,
    /// SPI pointer into the FIFO
    pub fifo_addr_ptr: u8,
    /// FIFO start of the Tx payload
    pub fifo_tx_base: u8,
    /// FIFO start of the Rx payload
    pub fifo_rx_base: u8,
    /// FIFO start of the last received packet
    pub fifo_rx_current: u8,
    /// Length of the last received payload
    pub rx_nb_bytes: u8,
    /// Payload length to transmit
    pub payload_length: u8,
    /// RSSI of the last packet
    pub packet_rssi: u8,
    /// Current RSSI
    pub rssi_value: u8,
    /// TxDone on DIO0
    pub sent_route: DioRoute,
    /// RxDone on DIO0
    pub ready_route: DioRoute,
    /// RxTimeout on DIO1
    pub timeout_route: DioRoute,
    /// Largest payload in bytes
    pub max_payload: usize,
    /// RSSI reporting
    pub rssi: RssiScale,
}

/// Static description of one chip generation.
#[derive(Debug)]
pub struct VariantProfile {
    /// Generation described by this profile
    pub variant: ChipVariant,
    /// Operating mode register
    pub op_mode: u8,
    /// Mode field of the operating mode register
    pub mode_mask: u8,
    /// PA register
    pub pa: u8,
    /// Current RSSI
    pub rssi_value: u8,
    /// Packet mode interrupt flags, see [`PacketIrq1`](crate::registers::PacketIrq1)
    pub irq_flags1: u8,
    /// Packet mode interrupt flags, see [`PacketIrq2`](crate::registers::PacketIrq2)
    pub irq_flags2: u8,
    /// Node address register
    pub node_address: u8,
    /// PacketSent on DIO0
    pub sent_route: DioRoute,
    /// PayloadReady on DIO0
    pub ready_route: DioRoute,
    /// Timeout on DIO4
    pub timeout_route: DioRoute,
    /// RX timeout registers and the values programmed while a hardware
    /// timeout is enabled
    pub rx_timeouts: &'static [(u8, u8)],
    /// Largest packet mode payload in bytes
    pub max_payload: usize,
    /// Output power mapping
    pub power: PowerMapping,
    /// Packet mode RSSI reporting
    pub rssi: RssiScale,
    /// Level of the reset line that holds the chip in reset
    pub reset_polarity: ResetPolarity,
    /// LoRa page, for chips that have one
    pub chirp: Option<&'static ChirpProfile>,
}

impl VariantProfile {
    /// Returns the LoRa page if `modulation` selects it and the chip has one.
    pub fn chirp_for(&self, modulation: Modulation) -> Option<&'static ChirpProfile> {
        match modulation {
            Modulation::Packet => None,
            Modulation::Chirp => self.chirp,
        }
    }

    /// Returns the modulation actually used for a configuration flag.
    pub fn modulation(&self, chirp: bool) -> Modulation {
        if chirp && self.chirp.is_some() {
            Modulation::Chirp
        } else {
            Modulation::Packet
        }
    }

    /// Largest payload in bytes for `modulation`.
    pub fn max_payload(&self, modulation: Modulation) -> usize {
        self.chirp_for(modulation)
            .map_or(self.max_payload, |chirp| chirp.max_payload)
    }
}

static PACKET_ONLY: VariantProfile = VariantProfile {
    variant: ChipVariant::PacketOnly,
    op_mode: rfm69::OP_MODE,
    mode_mask: rfm69::MODE_MASK,
    pa: rfm69::PA_LEVEL,
    rssi_value: rfm69::RSSI_VALUE,
    irq_flags1: rfm69::IRQ_FLAGS1,
    irq_flags2: rfm69::IRQ_FLAGS2,
    node_address: rfm69::NODE_ADRS,
    sent_route: DioRoute {
        register: rfm69::DIO_MAPPING1,
        mask: 0xC0,
        bits: 0x00,
    },
    ready_route: DioRoute {
        register: rfm69::DIO_MAPPING1,
        mask: 0xC0,
        bits: 0x40,
    },
    timeout_route: DioRoute {
        register: rfm69::DIO_MAPPING2,
        mask: 0xC0,
        bits: 0x00,
    },
    rx_timeouts: &[(rfm69::RX_TIMEOUT1, 0x1F), (rfm69::RX_TIMEOUT2, 0x1F)],
    max_payload: 63,
    power: PowerMapping {
        min_dbm: -2,
        max_dbm: 13,
        offset: -18,
        field_mask: 0x1F,
        max_value: 0x5F,
    },
    rssi: RssiScale::Raw,
    reset_polarity: ResetPolarity::ActiveHigh,
    chirp: None,
};

static SWITCHABLE_CHIRP: ChirpProfile = ChirpProfile {
    irq_flags: rfm95::LORA_IRQ_FLAGS,
    fifo_addr_ptr: rfm95::LORA_FIFO_ADDR_PTR,
    fifo_tx_base: rfm95::LORA_FIFO_TX_BASE_ADDR,
    fifo_rx_base: rfm95::LORA_FIFO_RX_BASE_ADDR,
    fifo_rx_current: rfm95::LORA_FIFO_RX_CURRENT_ADDR,
    rx_nb_bytes: rfm95::LORA_RX_NB_BYTES,
    payload_length: rfm95::LORA_PAYLOAD_LENGTH,
    packet_rssi: rfm95::LORA_PKT_RSSI_VALUE,
    rssi_value: rfm95::LORA_RSSI_VALUE,
    sent_route: DioRoute {
        register: rfm95::DIO_MAPPING1,
        mask: 0xC0,
        bits: 0x40,
    },
    ready_route: DioRoute {
        register: rfm95::DIO_MAPPING1,
        mask: 0xC0,
        bits: 0x00,
    },
    timeout_route: DioRoute {
        register: rfm95::DIO_MAPPING1,
        mask: 0x30,
        bits: 0x00,
    },
    max_payload: 128,
    rssi: RssiScale::Below(157),
};

static SWITCHABLE: VariantProfile = VariantProfile {
    variant: ChipVariant::PacketOrChirpSwitchable,
    op_mode: rfm95::OP_MODE,
    mode_mask: rfm95::MODE_MASK,
    pa: rfm95::PA_CONFIG,
    rssi_value: rfm95::RSSI_VALUE,
    irq_flags1: rfm95::IRQ_FLAGS1,
    irq_flags2: rfm95::IRQ_FLAGS2,
    node_address: rfm95::NODE_ADRS,
    sent_route: DioRoute {
        register: rfm95::DIO_MAPPING1,
        mask: 0xC0,
        bits: 0x00,
    },
    ready_route: DioRoute {
        register: rfm95::DIO_MAPPING1,
        mask: 0xC0,
        bits: 0x00,
    },
    timeout_route: DioRoute {
        register: rfm95::DIO_MAPPING2,
        mask: 0xC0,
        bits: 0x80,
    },
    rx_timeouts: &[
        (rfm95::RX_TIMEOUT1, 0x1F),
        (rfm95::RX_TIMEOUT2, 0x2F),
        (rfm95::RX_TIMEOUT3, 0x3F),
    ],
    max_payload: 63,
    power: PowerMapping {
        min_dbm: 2,
        max_dbm: 17,
        offset: 2,
        field_mask: 0x0F,
        max_value: 0xFF,
    },
    rssi: RssiScale::Halved,
    reset_polarity: ResetPolarity::ActiveLow,
    chirp: Some(&SWITCHABLE_CHIRP),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_rounds_to_nearest_step() {
        assert_eq!(frf_from_hz(433_000_000), 0x6C_4000);
        assert_eq!(frf_from_hz(868_000_000), 0xD9_0000);
        // 30 Hz is below half a step, 31 Hz above
        assert_eq!(frf_from_hz(868_000_030), 0xD9_0000);
        assert_eq!(frf_from_hz(868_000_031), 0xD9_0001);

        // out of range requests land on the band edges
        assert_eq!(frf_from_hz(1_100_000_000), frf_from_hz(FREQUENCY_MAX_HZ));
        assert_eq!(frf_from_hz(u32::MAX), frf_from_hz(FREQUENCY_MAX_HZ));
        assert_eq!(frf_from_hz(0), frf_from_hz(FREQUENCY_MIN_HZ));
        assert!(frf_from_hz(u32::MAX) <= 0x00FF_FFFF);
        assert!(hz_from_frf(frf_from_hz(1_100_000_000)).abs_diff(FREQUENCY_MAX_HZ) <= 62);
    }

    #[test]
    fn frequency_decodes_within_one_step() {
        for hz in [433_050_000u32, 434_790_000, 868_300_000, 915_123_456] {
            let decoded = hz_from_frf(frf_from_hz(hz));
            assert!(decoded.abs_diff(hz) <= 62, "{hz} decoded as {decoded}");
        }
    }


    #[test]
    fn power_mapping_clamps_and_inverts() {
        let rfm69 = ChipVariant::PacketOnly.profile().power;
        let rfm95 = ChipVariant::PacketOrChirpSwitchable.profile().power;

        assert_eq!(rfm69.field_for(-2), 16);
        assert_eq!(rfm69.field_for(13), 31);
        assert_eq!(rfm69.dbm_for(0x40 | rfm69.field_for(-40)), -2);
        assert_eq!(rfm95.field_for(17), 15);
        assert_eq!(rfm95.dbm_for(0xF0 | rfm95.field_for(30)), 17);
        assert_eq!(rfm95.dbm_for(rfm95.max_value), 17);
        assert_eq!(rfm69.dbm_for(rfm69.max_value), 13);
    }

    #[test]
    fn power_mapping_round_trips_every_dbm() {
        for variant in [ChipVariant::PacketOnly, ChipVariant::PacketOrChirpSwitchable] {
            let power = variant.profile().power;
            for dbm in i8::MIN..=i8::MAX {
                let field = power.field_for(dbm);
                assert_eq!(field & !power.field_mask, 0);
                assert_eq!(
                    power.dbm_for(field),
                    dbm.clamp(power.min_dbm, power.max_dbm),
                    "{variant:?} at {dbm} dBm"
                );
            }
        }
    }

    #[test]
    fn rssi_scaling_per_generation() {
        assert_eq!(RssiScale::Raw.apply(180), 180);
        assert_eq!(RssiScale::Halved.apply(181), 91);
        assert_eq!(RssiScale::Halved.apply(180), 90);
        assert_eq!(RssiScale::Below(157).apply(60), 97);
    }

    #[test]
    fn chirp_page_only_on_switchable_chip() {
        let rfm69 = ChipVariant::PacketOnly.profile();
        let rfm95 = ChipVariant::PacketOrChirpSwitchable.profile();

        assert_eq!(rfm69.modulation(true), Modulation::Packet);
        assert_eq!(rfm95.modulation(true), Modulation::Chirp);
        assert_eq!(rfm69.max_payload(Modulation::Chirp), 63);
        assert_eq!(rfm95.max_payload(Modulation::Chirp), 128);
    }
}
