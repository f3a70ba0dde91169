//! Driver errors

use core::fmt;

/// Error raised by [`RadioDriver::init`](crate::RadioDriver::init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The version register read back as zero.
    ///
    /// The chip does not tell a missing supply, a stuck reset line and a
    /// miswired bus apart; all three look like this.
    NoChip,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChip => f.write_str("radio did not answer the version probe"),
        }
    }
}

impl core::error::Error for InitError {}
