//! Operating mode control
//!
//! Every mode change goes through [`ModeController::set_mode`], which reads
//! the operating mode register, replaces the mode field and writes it back so
//! that the modulation and bank selection bits sharing the register survive.
//!
//! # Mode Bits
//! | Mode                    | RFM69 (mask 0x1C) | RFM95 (mask 0x07) |
//! |-------------------------|-------------------|-------------------|
//! | Sleep                   | 0x00              | 0                 |
//! | Standby                 | 0x04              | 1                 |
//! | FreqSynthTx             | 0x08              | 2                 |
//! | Tx                      | 0x0C              | 3                 |
//! | FreqSynthRx             | 0x08              | 4                 |
//! | Rx                      | 0x10              | 5                 |
//! | RxSingle (LoRa only)    | -                 | 6                 |
//! | ChannelActivityDetect (LoRa only) | -       | 7                 |

use crate::bus::RegisterBus;
use crate::device::Device;
use crate::variant::{ChipVariant, Modulation, VariantProfile};

/// Operating mode of the transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Lowest power, register contents retained
    Sleep,
    /// Crystal oscillator running, ready for configuration
    #[default]
    Standby,
    /// Synthesizer locked to the transmit frequency
    FreqSynthTx,
    /// Transmitting
    Tx,
    /// Synthesizer locked to the receive frequency
    FreqSynthRx,
    /// Receiving continuously
    Rx,
    /// Receiving one packet, then Standby; ends in RxTimeout if none arrives
    RxSingle,
    /// Channel activity detection
    ChannelActivityDetect,
}

impl OperatingMode {
    /// Returns the mode field value, or `None` if the chip cannot enter this
    /// mode with the given modulation.
    pub fn bits(self, variant: ChipVariant, modulation: Modulation) -> Option<u8> {
        match variant {
            ChipVariant::PacketOnly => match self {
                Self::Sleep => Some(0x00),
                Self::Standby => Some(0x04),
                Self::FreqSynthTx | Self::FreqSynthRx => Some(0x08),
                Self::Tx => Some(0x0C),
                Self::Rx => Some(0x10),
                Self::RxSingle | Self::ChannelActivityDetect => None,
            },
            ChipVariant::PacketOrChirpSwitchable => match (self, modulation) {
                (Self::Sleep, _) => Some(0),
                (Self::Standby, _) => Some(1),
                (Self::FreqSynthTx, _) => Some(2),
                (Self::Tx, _) => Some(3),
                (Self::FreqSynthRx, _) => Some(4),
                (Self::Rx, _) => Some(5),
                (Self::RxSingle, Modulation::Chirp) => Some(6),
                (Self::ChannelActivityDetect, Modulation::Chirp) => Some(7),
                (Self::RxSingle | Self::ChannelActivityDetect, Modulation::Packet) => None,
            },
        }
    }
}

/// Single choke point for operating mode transitions.
///
/// Tracks the last mode that was actually written.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeController {
    current: OperatingMode,
}

impl ModeController {
    /// Creates a controller assuming the chip is in Standby, its state after
    /// reset.
    pub const fn new() -> Self {
        Self {
            current: OperatingMode::Standby,
        }
    }

    /// Last commanded mode.
    pub fn current(&self) -> OperatingMode {
        self.current
    }

    /// Switches the chip to `mode`.
    ///
    /// Only the mode field of the operating mode register changes. A mode the
    /// active modulation cannot enter leaves the register untouched and
    /// returns `false`.
    pub fn set_mode<B: RegisterBus>(
        &mut self,
        device: &mut Device<B>,
        profile: &VariantProfile,
        modulation: Modulation,
        mode: OperatingMode,
    ) -> bool {
        let Some(bits) = mode.bits(profile.variant, modulation) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("mode {} not available in {}", mode, modulation);
            return false;
        };

        device.modify(profile.op_mode, profile.mode_mask, bits);
        self.current = mode;
        true
    }
}
