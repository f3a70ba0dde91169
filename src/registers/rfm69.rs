//! RFM69 (SX1231) registers
//!
//! The RFM69 is a fixed-function FSK/OOK packet radio. Only the registers the
//! driver programs are modelled as typed registers; registers that the
//! protocol logic accesses by address are listed as constants.
//!
//! # Important Notes
//! - Reset puts every register to its POR value, not the recommended
//!   defaults listed in the datasheet
//! - The FIFO is 66 bytes deep
//! - The reset pin is active high

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use super::{byte_register, frf_register, sync_register, word_register};

/// Operating mode register
pub const OP_MODE: u8 = 0x01;
/// Output power register, see [`PaLevel`]
pub const PA_LEVEL: u8 = 0x11;
/// RSSI of the last sample in -dBm * 2
pub const RSSI_VALUE: u8 = 0x24;
/// DIO0..DIO3 mapping
pub const DIO_MAPPING1: u8 = 0x25;
/// DIO4, DIO5 mapping and clock output
pub const DIO_MAPPING2: u8 = 0x26;
/// Interrupt flags, see [`PacketIrq1`](super::PacketIrq1)
pub const IRQ_FLAGS1: u8 = 0x27;
/// Interrupt flags, see [`PacketIrq2`](super::PacketIrq2)
pub const IRQ_FLAGS2: u8 = 0x28;
/// Timeout from Rx start to RSSI interrupt, in units of 16 bit periods
pub const RX_TIMEOUT1: u8 = 0x2A;
/// Timeout from RSSI interrupt to PayloadReady, in units of 16 bit periods
pub const RX_TIMEOUT2: u8 = 0x2B;
/// Node address register, see [`NodeAddress`]
pub const NODE_ADRS: u8 = 0x39;

/// Mode field of `RegOpMode`
pub const MODE_MASK: u8 = 0x1C;

/// Data modulation register (address: 0x02)
///
/// Selects the data processing mode and the modulation scheme.
///
/// # Important Notes
/// - Packet mode is required for the FIFO based payload protocol
/// - No modulation shaping is the POR default
#[register(0x02u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct DataModulation {
    /// Data processing mode
    /// - 0b00 = packet mode (default)
    /// - 0b10 = continuous mode with bit synchronizer
    /// - 0b11 = continuous mode without bit synchronizer
    pub data_mode: u8,
    /// OOK instead of FSK
    pub ook: bool,
    /// Modulation shaping, meaning depends on the modulation
    pub shaping: u8,
}

/// Frequency deviation register (address: 0x05)
///
/// Fdev = Fstep * value. The POR value 0x0052 gives 5 kHz.
#[register(0x05u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct FrequencyDeviation {
    /// Deviation in synthesizer steps, 14 bits
    pub value: u16,
}

/// Carrier frequency register (address: 0x07)
///
/// Frf = Fstep * value, where Fstep = 32 MHz / 2^19.
///
/// # Important Notes
/// - The frequency change only takes effect once the LSB is written, so the
///   three bytes are always written as one burst
#[register(0x07u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Frequency {
    /// 24 bit synthesizer value
    pub frf: u32,
}

/// Chip version register (address: 0x10)
///
/// Reads 0x24 on production silicon. A value of 0x00 means nothing answered
/// on the bus.
#[register(0x10u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct Version {
    /// Full revision number in the high nibble, metal mask revision in the low
    pub value: u8,
}

/// PA selection and output power register (address: 0x11)
///
/// # Power Amplifiers
/// - PA0 on the RFIO pin: Pout = -18 + output_power dBm
/// - PA1 on PA_BOOST: Pout = -18 + output_power dBm, used with level 16..31
/// - PA1 + PA2 on PA_BOOST: Pout = -14 + output_power dBm
///
/// # Important Notes
/// - The RFM69HCW has no RFIO output; PA0 yields almost no power there
#[register(0x11u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PaLevel {
    /// Enable PA0
    pub pa0: bool,
    /// Enable PA1
    pub pa1: bool,
    /// Enable PA2
    pub pa2: bool,
    /// Output power setting, 5 bits
    pub output_power: u8,
}

impl Default for PaLevel {
    fn default() -> Self {
        Self {
            pa0: true,
            pa1: false,
            pa2: false,
            output_power: 0x1F,
        }
    }
}

/// LNA settings register (address: 0x18)
#[register(0x18u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Lna {
    /// Input impedance
    /// - false = 50 Ω
    /// - true = 200 Ω (default)
    pub zin_200: bool,
    /// LNA gain
    /// - 0b000 = set by the AGC loop (default)
    /// - 0b001 = G1, highest gain
    /// - 0b110 = G6, lowest gain
    pub gain_select: u8,
}

impl Default for Lna {
    fn default() -> Self {
        Self {
            zin_200: true,
            gain_select: 0,
        }
    }
}

/// Channel filter bandwidth register (address: 0x19)
///
/// RxBw = FXOSC / (mantissa * 2^(exponent + 2)) in FSK mode.
#[register(0x19u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct RxBandwidth {
    /// DC offset canceller cutoff, default 0b010 (4% of RxBw)
    pub dcc_freq: u8,
    /// Mantissa code: 0b00 = 16, 0b01 = 20, 0b10 = 24
    pub mantissa: u8,
    /// Exponent, 3 bits
    pub exponent: u8,
}

/// Channel filter bandwidth used during AFC (address: 0x1A)
///
/// Same layout as [`RxBandwidth`].
#[register(0x1Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct AfcBandwidth {
    /// DC offset canceller cutoff during AFC
    pub dcc_freq: u8,
    /// Mantissa code during AFC
    pub mantissa: u8,
    /// Exponent during AFC
    pub exponent: u8,
}

/// RSSI trigger level for the Rssi interrupt (address: 0x29)
///
/// Threshold = -value / 2 dBm. POR value 0xFF, recommended 0xE4.
#[register(0x29u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct RssiThreshold {
    /// Threshold in -0.5 dB steps
    pub value: u8,
}

/// Preamble length register (address: 0x2C)
#[register(0x2Cu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PreambleLength {
    /// Number of preamble bytes sent before the sync word
    pub bytes: u16,
}

/// Sync word recognition register (address: 0x2E)
#[register(0x2Eu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct SyncConfig {
    /// Enable sync word generation and detection
    pub sync_on: bool,
    /// Fill the FIFO while `fifo_fill_condition` holds instead of on a sync match
    pub fifo_fill_condition: bool,
    /// Number of sync word bytes, 1..=8
    pub size: u8,
    /// Number of tolerated bit errors
    pub tolerance: u8,
}

/// Sync word value (address: 0x2F..=0x36)
///
/// Only the first [`SyncConfig::size`] bytes are used on air.
#[register(0x2Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct SyncValue {
    /// Sync word bytes, most significant first
    pub value: [u8; 8],
}

/// Address based filtering in the packet engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressFiltering {
    /// Accept every packet
    None = 0b00,
    /// Accept packets addressed to the node address
    Node = 0b01,
    /// Accept packets addressed to the node or the broadcast address
    NodeOrBroadcast = 0b10,
}

/// Packet engine configuration register (address: 0x37)
#[register(0x37u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PacketConfig1 {
    /// Variable length packets, the first FIFO byte holds the length
    pub variable_length: bool,
    /// DC free encoding: 0b00 none, 0b01 Manchester, 0b10 whitening
    pub dc_free: u8,
    /// Append and check a CRC
    pub crc_on: bool,
    /// Keep the FIFO and raise PayloadReady when the CRC fails
    pub crc_auto_clear_off: bool,
    /// Address filtering mode
    pub address_filtering: AddressFiltering,
}

/// Payload length register (address: 0x38)
///
/// In variable length mode this is the maximum accepted length.
#[register(0x38u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PayloadLength {
    /// Length in bytes
    pub value: u8,
}

/// Node address register (address: 0x39)
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct NodeAddress {
    /// Node address for filtering
    pub address: u8,
}

/// Broadcast address register (address: 0x3A)
#[register(0x3Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct BroadcastAddress {
    /// Broadcast address for filtering
    pub address: u8,
}

/// FIFO threshold register (address: 0x3C)
///
/// # Important Notes
/// - With `tx_start_not_empty` the transmitter starts as soon as the FIFO
///   holds one byte, which lets a frame be written before entering Tx
#[register(0x3Cu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct FifoThreshold {
    /// Start transmission when the FIFO is not empty instead of on the level
    pub tx_start_not_empty: bool,
    /// FifoLevel interrupt threshold, 7 bits
    pub threshold: u8,
}

/// Second packet engine configuration register (address: 0x3D)
#[register(0x3Du8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct PacketConfig2 {
    /// Delay before restarting Rx after PayloadReady, 4 bits
    pub inter_packet_rx_delay: u8,
    /// Restart Rx automatically once the FIFO is read
    pub auto_rx_restart: bool,
    /// AES encryption of the payload
    pub aes: bool,
}

/// Fading margin improvement register (address: 0x6F)
///
/// - 0x00 = normal mode
/// - 0x20 = improved margin, use if AfcLowBetaOn = 1
/// - 0x30 = improved margin, use if AfcLowBetaOn = 0
#[register(0x6Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct TestDagc {
    /// Raw register value
    pub value: u8,
}

word_register!(FrequencyDeviation, value);
frf_register!(Frequency);
byte_register!(Version, value);
byte_register!(RssiThreshold, value);
word_register!(PreambleLength, bytes);
sync_register!(SyncValue);
byte_register!(PayloadLength, value);
byte_register!(NodeAddress, address);
byte_register!(BroadcastAddress, address);
byte_register!(TestDagc, value);

impl FromByteArray for DataModulation {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            data_mode: (bytes[0] >> 5) & 0x03,
            ook: (bytes[0] >> 3) & 0x03 == 0b01,
            shaping: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for DataModulation {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.data_mode & 0x03) << 5) | ((self.ook as u8) << 3) | (self.shaping & 0x03)])
    }
}

impl FromByteArray for PaLevel {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pa0: bytes[0] & 0x80 != 0,
            pa1: bytes[0] & 0x40 != 0,
            pa2: bytes[0] & 0x20 != 0,
            output_power: bytes[0] & 0x1F,
        })
    }
}

impl ToByteArray for PaLevel {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.pa0 as u8) << 7)
            | ((self.pa1 as u8) << 6)
            | ((self.pa2 as u8) << 5)
            | (self.output_power & 0x1F)])
    }
}

impl FromByteArray for Lna {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            zin_200: bytes[0] & 0x80 != 0,
            gain_select: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for Lna {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.zin_200 as u8) << 7) | (self.gain_select & 0x07)])
    }
}

fn bandwidth_byte(dcc_freq: u8, mantissa: u8, exponent: u8) -> u8 {
    ((dcc_freq & 0x07) << 5) | ((mantissa & 0x03) << 3) | (exponent & 0x07)
}

impl FromByteArray for RxBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            dcc_freq: bytes[0] >> 5,
            mantissa: (bytes[0] >> 3) & 0x03,
            exponent: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for RxBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([bandwidth_byte(self.dcc_freq, self.mantissa, self.exponent)])
    }
}

impl FromByteArray for AfcBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            dcc_freq: bytes[0] >> 5,
            mantissa: (bytes[0] >> 3) & 0x03,
            exponent: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for AfcBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([bandwidth_byte(self.dcc_freq, self.mantissa, self.exponent)])
    }
}

impl FromByteArray for SyncConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            sync_on: bytes[0] & 0x80 != 0,
            fifo_fill_condition: bytes[0] & 0x40 != 0,
            size: ((bytes[0] >> 3) & 0x07) + 1,
            tolerance: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for SyncConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.sync_on as u8) << 7)
            | ((self.fifo_fill_condition as u8) << 6)
            | ((self.size.saturating_sub(1) & 0x07) << 3)
            | (self.tolerance & 0x07)])
    }
}

impl AddressFiltering {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => Self::Node,
            0b10 => Self::NodeOrBroadcast,
            _ => Self::None,
        }
    }
}

impl FromByteArray for PacketConfig1 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            variable_length: bytes[0] & 0x80 != 0,
            dc_free: (bytes[0] >> 5) & 0x03,
            crc_on: bytes[0] & 0x10 != 0,
            crc_auto_clear_off: bytes[0] & 0x08 != 0,
            address_filtering: AddressFiltering::from_bits(bytes[0] >> 1),
        })
    }
}

impl ToByteArray for PacketConfig1 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.variable_length as u8) << 7)
            | ((self.dc_free & 0x03) << 5)
            | ((self.crc_on as u8) << 4)
            | ((self.crc_auto_clear_off as u8) << 3)
            | ((self.address_filtering as u8) << 1)])
    }
}

impl FromByteArray for FifoThreshold {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_start_not_empty: bytes[0] & 0x80 != 0,
            threshold: bytes[0] & 0x7F,
        })
    }
}

impl ToByteArray for FifoThreshold {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.tx_start_not_empty as u8) << 7) | (self.threshold & 0x7F)])
    }
}

impl FromByteArray for PacketConfig2 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            inter_packet_rx_delay: bytes[0] >> 4,
            auto_rx_restart: bytes[0] & 0x02 != 0,
            aes: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for PacketConfig2 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.inter_packet_rx_delay & 0x0F) << 4)
            | ((self.auto_rx_restart as u8) << 1)
            | (self.aes as u8)])
    }
}
