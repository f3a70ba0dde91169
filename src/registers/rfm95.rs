//! RFM95 (SX1276) registers
//!
//! The RFM95 runs either the FSK/OOK packet modem or the LoRa chirp modem,
//! selected by the `LongRangeMode` bit of [`OpMode`]. Registers `0x0D..=0x3F`
//! form two different pages depending on that bit; LoRa page registers carry
//! a `Lora` prefix here.
//!
//! # Important Notes
//! - `LongRangeMode` can only be changed in Sleep mode
//! - The FIFO is 256 bytes, shared between Tx and Rx in LoRa mode through
//!   the base address registers
//! - The reset pin is active low

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use super::{byte_register, frf_register, sync_register, word_register};

/// Operating mode register
pub const OP_MODE: u8 = 0x01;
/// PA selection and output power, see [`PaConfig`]
pub const PA_CONFIG: u8 = 0x09;
/// DIO0..DIO3 mapping
pub const DIO_MAPPING1: u8 = 0x40;
/// DIO4, DIO5 mapping
pub const DIO_MAPPING2: u8 = 0x41;

/// FSK page: RSSI of the last sample in -dBm * 2
pub const RSSI_VALUE: u8 = 0x11;
/// FSK page: timeout from Rx start to the Rssi interrupt, 16 bit periods
pub const RX_TIMEOUT1: u8 = 0x20;
/// FSK page: timeout from Rx start to the PreambleDetect interrupt
pub const RX_TIMEOUT2: u8 = 0x21;
/// FSK page: timeout from Rx start to the SyncAddress interrupt
pub const RX_TIMEOUT3: u8 = 0x22;
/// FSK page: node address register, see [`NodeAddress`]
pub const NODE_ADRS: u8 = 0x33;
/// FSK page: interrupt flags, see [`PacketIrq1`](super::PacketIrq1)
pub const IRQ_FLAGS1: u8 = 0x3E;
/// FSK page: interrupt flags, see [`PacketIrq2`](super::PacketIrq2)
pub const IRQ_FLAGS2: u8 = 0x3F;

/// LoRa page: SPI pointer into the FIFO
pub const LORA_FIFO_ADDR_PTR: u8 = 0x0D;
/// LoRa page: FIFO start of the Tx payload
pub const LORA_FIFO_TX_BASE_ADDR: u8 = 0x0E;
/// LoRa page: FIFO start of the Rx payload
pub const LORA_FIFO_RX_BASE_ADDR: u8 = 0x0F;
/// LoRa page: FIFO start of the last received packet
pub const LORA_FIFO_RX_CURRENT_ADDR: u8 = 0x10;
/// LoRa page: interrupt flags, see [`LoraIrq`]
pub const LORA_IRQ_FLAGS: u8 = 0x12;
/// LoRa page: length of the last received payload
pub const LORA_RX_NB_BYTES: u8 = 0x13;
/// LoRa page: RSSI of the last packet, dBm = -157 + value
pub const LORA_PKT_RSSI_VALUE: u8 = 0x1A;
/// LoRa page: current RSSI, dBm = -157 + value
pub const LORA_RSSI_VALUE: u8 = 0x1B;
/// LoRa page: payload length for transmission
pub const LORA_PAYLOAD_LENGTH: u8 = 0x22;

/// Mode field of `RegOpMode`
pub const MODE_MASK: u8 = 0x07;

bitflags::bitflags! {
    /// LoRa interrupt flags (address: 0x12)
    ///
    /// Flags are cleared by writing a 1 to them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LoraIrq: u8 {
        /// Single receive ended without a packet
        const RX_TIMEOUT = 1 << 7;
        /// Packet reception complete
        const RX_DONE = 1 << 6;
        /// Payload CRC failed
        const PAYLOAD_CRC_ERROR = 1 << 5;
        /// A valid header was received
        const VALID_HEADER = 1 << 4;
        /// Packet transmission complete
        const TX_DONE = 1 << 3;
        /// Channel activity detection finished
        const CAD_DONE = 1 << 2;
        /// Frequency hopping channel change requested
        const FHSS_CHANGE_CHANNEL = 1 << 1;
        /// Channel activity was detected
        const CAD_DETECTED = 1 << 0;
    }
}

/// Operating mode register (address: 0x01)
///
/// # Important Notes
/// - `long_range` and `modulation` are only writable in Sleep mode
/// - The mode field is changed through a read-modify-write so the other
///   bits survive mode transitions
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct OpMode {
    /// LoRa modem instead of FSK/OOK
    pub long_range: bool,
    /// FSK page: modulation type, 0b00 = FSK, 0b01 = OOK
    pub modulation: u8,
    /// Access the low frequency register bank
    pub low_frequency: bool,
    /// Transceiver mode, 3 bits
    pub mode: u8,
}

/// Frequency deviation register (address: 0x04)
#[register(0x04u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct FrequencyDeviation {
    /// Deviation in synthesizer steps, 14 bits
    pub value: u16,
}

/// Carrier frequency register (address: 0x06)
///
/// Frf = Fstep * value, where Fstep = 32 MHz / 2^19.
///
/// # Important Notes
/// - In Sleep/Standby the new frequency is applied once the LSB is written
#[register(0x06u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Frequency {
    /// 24 bit synthesizer value
    pub frf: u32,
}

/// PA selection and output power register (address: 0x09)
///
/// # Output Power
/// - RFO pin: Pout = Pmax - (15 - output_power), Pmax = 10.8 + 0.6 * max_power
/// - PA_BOOST pin: Pout = 17 - (15 - output_power)
///
/// The RFM95 only routes PA_BOOST to the antenna.
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PaConfig {
    /// Use the PA_BOOST pin instead of RFO
    pub pa_boost: bool,
    /// Pmax selection, 3 bits
    pub max_power: u8,
    /// Output power, 4 bits
    pub output_power: u8,
}

/// LNA settings register (address: 0x0C)
#[register(0x0Cu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Lna {
    /// LNA gain, 0b001 = G1 (highest) .. 0b110 = G6 (lowest)
    pub gain: u8,
    /// Low frequency band current adjustment, 2 bits
    pub boost_lf: u8,
    /// High frequency band boost, 0b11 = 150% LNA current
    pub boost_hf: u8,
}

/// FSK receiver configuration register (address: 0x0D)
///
/// - bit 7 RestartRxOnCollision
/// - bit 6 RestartRxWithoutPllLock
/// - bit 5 RestartRxWithPllLock
/// - bit 4 AfcAutoOn
/// - bit 3 AgcAutoOn
/// - bits 2..0 RxTrigger, 0b110 = PreambleDetect
#[register(0x0Du8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct RxConfig {
    /// Raw register value
    pub value: u8,
}

/// FSK RSSI configuration register (address: 0x0E)
#[register(0x0Eu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct RssiConfig {
    /// Signed offset added to the RSSI, in dB, 5 bits two's complement
    pub offset: i8,
    /// Number of samples averaged is 2^(smoothing + 1)
    pub smoothing: u8,
}

/// FSK RSSI collision threshold (address: 0x0F)
#[register(0x0Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct RssiCollision {
    /// RSSI rise in dB that counts as an interferer
    pub value: u8,
}

/// FSK RSSI threshold (address: 0x10)
///
/// Threshold = -value / 2 dBm.
#[register(0x10u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct RssiThreshold {
    /// Threshold in -0.5 dB steps
    pub value: u8,
}

/// FSK channel filter bandwidth (address: 0x12)
#[register(0x12u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct RxBandwidth {
    /// Mantissa code: 0b00 = 16, 0b01 = 20, 0b10 = 24
    pub mantissa: u8,
    /// Exponent, 3 bits
    pub exponent: u8,
}

/// FSK channel filter bandwidth during AFC (address: 0x13)
#[register(0x13u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct AfcBandwidth {
    /// Mantissa code during AFC
    pub mantissa: u8,
    /// Exponent during AFC
    pub exponent: u8,
}

/// FSK preamble detector (address: 0x1F)
#[register(0x1Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PreambleDetect {
    /// Enable the preamble detector
    pub on: bool,
    /// Detector size in bytes, 1..=3
    pub size: u8,
    /// Tolerated chip errors per bit, 5 bits
    pub tolerance: u8,
}

/// FSK preamble length (address: 0x25)
#[register(0x25u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PreambleLength {
    /// Preamble bytes sent before the sync word
    pub bytes: u16,
}

/// FSK sync word configuration (address: 0x27)
#[register(0x27u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct SyncConfig {
    /// Automatic Rx restart after PayloadReady, 2 bits
    pub auto_restart_rx: u8,
    /// Preamble polarity, false = 0xAA
    pub preamble_polarity_55: bool,
    /// Enable the sync word
    pub sync_on: bool,
    /// Number of sync word bytes, 1..=8
    pub size: u8,
}

/// FSK sync word value (address: 0x28..=0x2F)
#[register(0x28u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct SyncValue {
    /// Sync word bytes, most significant first
    pub value: [u8; 8],
}

/// FSK packet configuration (address: 0x30)
///
/// Same bit layout as the RFM69 register.
#[register(0x30u8)]
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
    pub address_filtering: super::rfm69::AddressFiltering,
}

/// FSK packet configuration (address: 0x31)
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PacketConfig2 {
    /// Packet mode instead of continuous mode
    pub packet_mode: bool,
    /// IO home control
    pub io_home_on: bool,
    /// Beacon mode for fixed length packets
    pub beacon_on: bool,
    /// Bits 10..8 of the payload length
    pub payload_length_msb: u8,
}

/// FSK payload length, bits 7..0 (address: 0x32)
#[register(0x32u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PayloadLength {
    /// Length in bytes
    pub value: u8,
}

/// FSK node address (address: 0x33)
#[register(0x33u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct NodeAddress {
    /// Node address for filtering
    pub address: u8,
}

/// FSK broadcast address (address: 0x34)
#[register(0x34u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct BroadcastAddress {
    /// Broadcast address for filtering
    pub address: u8,
}

/// FSK FIFO threshold (address: 0x35)
#[register(0x35u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct FifoThreshold {
    /// Start transmission when the FIFO is not empty instead of on the level
    pub tx_start_not_empty: bool,
    /// FifoLevel interrupt threshold, 6 bits
    pub threshold: u8,
}

/// FSK image calibration (address: 0x3B)
///
/// # Important Notes
/// - Image calibration runs automatically at POR only; it has to be
///   triggered manually after a large frequency change
#[register(0x3Bu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct ImageCal {
    /// Raw register value: AutoImageCalOn, ImageCalRunning, TempChange,
    /// TempThreshold, TempMonitorOff
    pub value: u8,
}

/// Chip version register (address: 0x42)
///
/// Reads 0x12 on production silicon.
#[register(0x42u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct Version {
    /// Full revision number in the high nibble, metal mask revision in the low
    pub value: u8,
}

/// LoRa modem configuration 1 (address: 0x1D)
#[register(0x1Du8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct LoraModemConfig1 {
    /// Signal bandwidth code, 0b0110 = 62.5 kHz, 0b0111 = 125 kHz
    pub bandwidth: u8,
    /// Error coding rate code, 0b001 = 4/5
    pub coding_rate: u8,
    /// Implicit header mode
    pub implicit_header: bool,
}

/// LoRa modem configuration 2 (address: 0x1E)
#[register(0x1Eu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct LoraModemConfig2 {
    /// Spreading factor, 6..=12
    pub spreading_factor: u8,
    /// Continuous transmission
    pub tx_continuous: bool,
    /// Payload CRC generation and check
    pub rx_payload_crc_on: bool,
    /// Bits 9..8 of the single receive symbol timeout
    pub symbol_timeout_msb: u8,
}

/// LoRa single receive timeout, bits 7..0 (address: 0x1F)
///
/// Timeout = value * Ts, where Ts is the symbol duration.
#[register(0x1Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct LoraSymbolTimeout {
    /// Timeout in symbols
    pub value: u8,
}

/// LoRa preamble length (address: 0x20)
#[register(0x20u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct LoraPreambleLength {
    /// Preamble length in symbols, not counting the fixed 4.25 symbols
    pub symbols: u16,
}

/// LoRa maximum payload length (address: 0x23)
///
/// A received header announcing more bytes raises a CRC error.
#[register(0x23u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct LoraMaxPayloadLength {
    /// Maximum length in bytes
    pub value: u8,
}

/// LoRa frequency hopping period (address: 0x24)
#[register(0x24u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct LoraHopPeriod {
    /// Symbols between hops, 0 disables hopping
    pub value: u8,
}

/// LoRa modem configuration 3 (address: 0x26)
#[register(0x26u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct LoraModemConfig3 {
    /// Required when the symbol duration exceeds 16 ms
    pub low_data_rate_optimize: bool,
    /// LNA gain set by the AGC loop instead of `Lna::gain`
    pub agc_auto_on: bool,
}

/// LoRa FIFO base addresses (address: 0x0E..=0x0F)
///
/// Written as one burst: Tx base, then Rx base.
#[register(0x0Eu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct LoraFifoBaseAddresses {
    /// FIFO start of the Tx payload
    pub tx: u8,
    /// FIFO start of the Rx payload
    pub rx: u8,
}

word_register!(FrequencyDeviation, value);
frf_register!(Frequency);
byte_register!(RxConfig, value);
byte_register!(RssiCollision, value);
byte_register!(RssiThreshold, value);
word_register!(PreambleLength, bytes);
sync_register!(SyncValue);
byte_register!(PayloadLength, value);
byte_register!(NodeAddress, address);
byte_register!(BroadcastAddress, address);
byte_register!(ImageCal, value);
byte_register!(Version, value);
byte_register!(LoraSymbolTimeout, value);
word_register!(LoraPreambleLength, symbols);
byte_register!(LoraMaxPayloadLength, value);
byte_register!(LoraHopPeriod, value);

impl FromByteArray for OpMode {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            long_range: bytes[0] & 0x80 != 0,
            modulation: (bytes[0] >> 5) & 0x03,
            low_frequency: bytes[0] & 0x08 != 0,
            mode: bytes[0] & MODE_MASK,
        })
    }
}

impl ToByteArray for OpMode {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.long_range as u8) << 7)
            | ((self.modulation & 0x03) << 5)
            | ((self.low_frequency as u8) << 3)
            | (self.mode & MODE_MASK)])
    }
}

impl FromByteArray for PaConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pa_boost: bytes[0] & 0x80 != 0,
            max_power: (bytes[0] >> 4) & 0x07,
            output_power: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for PaConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.pa_boost as u8) << 7)
            | ((self.max_power & 0x07) << 4)
            | (self.output_power & 0x0F)])
    }
}

impl FromByteArray for Lna {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            gain: bytes[0] >> 5,
            boost_lf: (bytes[0] >> 3) & 0x03,
            boost_hf: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for Lna {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.gain & 0x07) << 5) | ((self.boost_lf & 0x03) << 3) | (self.boost_hf & 0x03)])
    }
}

impl FromByteArray for RssiConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        // sign-extend the 5 bit offset
        let offset = (bytes[0] as i8) >> 3;
        Ok(Self {
            offset,
            smoothing: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for RssiConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(((self.offset as u8) & 0x1F) << 3) | (self.smoothing & 0x07)])
    }
}

impl FromByteArray for RxBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            mantissa: (bytes[0] >> 3) & 0x03,
            exponent: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for RxBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.mantissa & 0x03) << 3) | (self.exponent & 0x07)])
    }
}

impl FromByteArray for AfcBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            mantissa: (bytes[0] >> 3) & 0x03,
            exponent: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for AfcBandwidth {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.mantissa & 0x03) << 3) | (self.exponent & 0x07)])
    }
}

impl FromByteArray for PreambleDetect {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            on: bytes[0] & 0x80 != 0,
            size: ((bytes[0] >> 5) & 0x03) + 1,
            tolerance: bytes[0] & 0x1F,
        })
    }
}

impl ToByteArray for PreambleDetect {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.on as u8) << 7)
            | ((self.size.saturating_sub(1) & 0x03) << 5)
            | (self.tolerance & 0x1F)])
    }
}

impl FromByteArray for SyncConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            auto_restart_rx: bytes[0] >> 6,
            preamble_polarity_55: bytes[0] & 0x20 != 0,
            sync_on: bytes[0] & 0x10 != 0,
            size: (bytes[0] & 0x07) + 1,
        })
    }
}

impl ToByteArray for SyncConfig {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.auto_restart_rx & 0x03) << 6)
            | ((self.preamble_polarity_55 as u8) << 5)
            | ((self.sync_on as u8) << 4)
            | (self.size.saturating_sub(1) & 0x07)])
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
            address_filtering: super::rfm69::AddressFiltering::from_bits(bytes[0] >> 1),
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

impl FromByteArray for PacketConfig2 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            packet_mode: bytes[0] & 0x40 != 0,
            io_home_on: bytes[0] & 0x20 != 0,
            beacon_on: bytes[0] & 0x08 != 0,
            payload_length_msb: bytes[0] & 0x07,
        })
    }
}

impl ToByteArray for PacketConfig2 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.packet_mode as u8) << 6)
            | ((self.io_home_on as u8) << 5)
            | ((self.beacon_on as u8) << 3)
            | (self.payload_length_msb & 0x07)])
    }
}

impl FromByteArray for FifoThreshold {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_start_not_empty: bytes[0] & 0x80 != 0,
            threshold: bytes[0] & 0x3F,
        })
    }
}

impl ToByteArray for FifoThreshold {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.tx_start_not_empty as u8) << 7) | (self.threshold & 0x3F)])
    }
}

impl FromByteArray for LoraModemConfig1 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            bandwidth: bytes[0] >> 4,
            coding_rate: (bytes[0] >> 1) & 0x07,
            implicit_header: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for LoraModemConfig1 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.bandwidth & 0x0F) << 4)
            | ((self.coding_rate & 0x07) << 1)
            | (self.implicit_header as u8)])
    }
}

impl FromByteArray for LoraModemConfig2 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            spreading_factor: bytes[0] >> 4,
            tx_continuous: bytes[0] & 0x08 != 0,
            rx_payload_crc_on: bytes[0] & 0x04 != 0,
            symbol_timeout_msb: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for LoraModemConfig2 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.spreading_factor & 0x0F) << 4)
            | ((self.tx_continuous as u8) << 3)
            | ((self.rx_payload_crc_on as u8) << 2)
            | (self.symbol_timeout_msb & 0x03)])
    }
}

impl FromByteArray for LoraModemConfig3 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            low_data_rate_optimize: bytes[0] & 0x08 != 0,
            agc_auto_on: bytes[0] & 0x04 != 0,
        })
    }
}

impl ToByteArray for LoraModemConfig3 {
    type Error = core::convert::Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.low_data_rate_optimize as u8) << 3) | ((self.agc_auto_on as u8) << 2)])
    }
}

impl FromByteArray for LoraFifoBaseAddresses {
    type Error = core::convert::Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            tx: bytes[0],
            rx: bytes[1],
        })
    }
}

impl ToByteArray for LoraFifoBaseAddresses {
    type Error = core::convert::Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.tx, self.rx])
    }
}
