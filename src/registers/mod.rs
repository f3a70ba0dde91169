//! Register definitions for the RFM69 (SX1231) and RFM95 (SX1276) radios
//! Generated from the SX1231 rev 7 and SX1276/77/78/79 rev 7 datasheets
//!
//! Both generations use single byte addresses and share the FIFO at `0x00` and
//! the operating mode register at `0x01`. Everything else lives at different
//! addresses per generation, and on the RFM95 the `0x0D..=0x3F` window holds a
//! different register page in FSK and in LoRa mode.

use bitflags::bitflags;

bitflags! {
    /// First packet-mode interrupt flag register
    ///
    /// `IrqFlags1` on both generations (RFM69: 0x27, RFM95 FSK page: 0x3E).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PacketIrq1: u8 {
        /// Requested operating mode is ready
        const MODE_READY = 1 << 7;
        /// Receiver is ready after RSSI, AGC and AFC
        const RX_READY = 1 << 6;
        /// Transmitter is ready after PA ramp-up
        const TX_READY = 1 << 5;
        /// PLL is locked
        const PLL_LOCK = 1 << 4;
        /// RSSI exceeded the threshold
        const RSSI = 1 << 3;
        /// A receive timeout elapsed
        const TIMEOUT = 1 << 2;
        /// RFM69: entered the intermediate state of an auto mode
        const AUTO_MODE = 1 << 1;
        /// RFM95: a valid preamble was detected
        const PREAMBLE_DETECT = 1 << 1;
        /// Sync word and, if enabled, node address matched
        const SYNC_ADDRESS_MATCH = 1 << 0;
    }
}

bitflags! {
    /// Second packet-mode interrupt flag register
    ///
    /// `IrqFlags2` on both generations (RFM69: 0x28, RFM95 FSK page: 0x3F).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PacketIrq2: u8 {
        /// FIFO is full
        const FIFO_FULL = 1 << 7;
        /// RFM69: FIFO holds at least one byte. RFM95: FIFO is empty
        const FIFO_NOT_EMPTY = 1 << 6;
        /// FIFO level exceeds the threshold
        const FIFO_LEVEL = 1 << 5;
        /// FIFO overrun, cleared by writing a 1
        const FIFO_OVERRUN = 1 << 4;
        /// Complete packet has been sent
        const PACKET_SENT = 1 << 3;
        /// Complete payload received and ready in the FIFO
        const PAYLOAD_READY = 1 << 2;
        /// CRC of the received payload is valid
        const CRC_OK = 1 << 1;
        /// Battery voltage below the low battery threshold
        const LOW_BAT = 1 << 0;
    }
}

/// Implements `FromByteArray`/`ToByteArray` for single byte registers that
/// carry one plain `u8` field.
macro_rules! byte_register {
    ($name:ident, $field:ident) => {
        impl regiface::FromByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 1];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self { $field: bytes[0] })
            }
        }

        impl regiface::ToByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 1];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok([self.$field])
            }
        }
    };
}

/// Implements `FromByteArray`/`ToByteArray` for big-endian `u16` registers
/// spanning an MSB/LSB pair.
macro_rules! word_register {
    ($name:ident, $field:ident) => {
        impl regiface::FromByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 2];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self {
                    $field: u16::from_be_bytes(bytes),
                })
            }
        }

        impl regiface::ToByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 2];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok(self.$field.to_be_bytes())
            }
        }
    };
}

/// Implements `FromByteArray`/`ToByteArray` for the 24 bit carrier frequency
/// registers (`FrfMsb`, `FrfMid`, `FrfLsb`).
macro_rules! frf_register {
    ($name:ident) => {
        impl regiface::FromByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 3];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self {
                    frf: u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
                })
            }
        }

        impl regiface::ToByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 3];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                let [_, msb, mid, lsb] = self.frf.to_be_bytes();
                Ok([msb, mid, lsb])
            }
        }
    };
}

/// Implements `FromByteArray`/`ToByteArray` for the eight byte sync word.
macro_rules! sync_register {
    ($name:ident) => {
        impl regiface::FromByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 8];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self { value: bytes })
            }
        }

        impl regiface::ToByteArray for $name {
            type Error = core::convert::Infallible;
            type Array = [u8; 8];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok(self.value)
            }
        }
    };
}

pub(crate) use {byte_register, frf_register, sync_register, word_register};

pub mod rfm69;
pub mod rfm95;
