//! Register bus abstraction
//!
//! The radio is driven through a handful of primitive operations: asserting and
//! releasing chip select around a register transaction, exchanging single bytes,
//! blocking delays and driving the reset line. [`RegisterBus`] captures exactly
//! that contract so the protocol logic can run against real hardware or against
//! a simulated chip.
//!
//! [`SpiRegisterBus`] implements the contract on top of the `embedded-hal` 1.0
//! traits.
//!
//! # Important Notes
//! - The bus is treated as infallible. HAL errors are recorded in a sticky
//!   fault flag and failed reads return `0x00`, which the initialization
//!   sequence reports as a missing chip.

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

/// Byte-level access to the radio's serial bus and control lines.
pub trait RegisterBus {
    /// Assert chip select, starting a register transaction.
    fn select(&mut self);

    /// Release chip select, ending the current register transaction.
    fn deselect(&mut self);

    /// Exchange one byte with the chip and return the byte clocked in.
    fn transfer(&mut self, byte: u8) -> u8;

    /// Block for the given number of milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Drive the reset line.
    ///
    /// `true` holds the chip in reset, `false` lets it run. The electrical
    /// level is the implementor's concern.
    fn set_reset(&mut self, active: bool);
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn select(&mut self) {
        (**self).select()
    }

    fn deselect(&mut self) {
        (**self).deselect()
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        (**self).transfer(byte)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }

    fn set_reset(&mut self, active: bool) {
        (**self).set_reset(active)
    }
}

/// Electrical level that holds the chip in reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetPolarity {
    /// Reset while the line is high (RFM69 `RESET` pin)
    ActiveHigh,
    /// Reset while the line is low (RFM95 `NRESET` pin)
    ActiveLow,
}

/// [`RegisterBus`] over an `embedded-hal` SPI bus with a GPIO chip select.
///
/// Chip select is driven manually because register bursts span many single
/// byte exchanges. The SPI bus must be configured for mode 0, MSB first, at
/// no more than 10 MHz.
pub struct SpiRegisterBus<SPI, CS, RST, D> {
    spi: SPI,
    cs: CS,
    reset: RST,
    delay: D,
    polarity: ResetPolarity,
    fault: bool,
}

impl<SPI, CS, RST, D> SpiRegisterBus<SPI, CS, RST, D> {
    /// Creates a new bus from its parts.
    ///
    /// # Arguments
    /// * `spi` - SPI bus shared with no other device while a transaction is open
    /// * `cs` - Chip select pin, active low
    /// * `reset` - Reset pin of the module
    /// * `delay` - Millisecond delay provider
    /// * `polarity` - Level of `reset` that holds the chip in reset
    pub fn new(spi: SPI, cs: CS, reset: RST, delay: D, polarity: ResetPolarity) -> Self {
        Self {
            spi,
            cs,
            reset,
            delay,
            polarity,
            fault: false,
        }
    }

    /// Returns `true` if any HAL operation failed since construction or the
    /// last [`clear_fault`](Self::clear_fault).
    pub fn fault(&self) -> bool {
        self.fault
    }

    /// Clears the sticky fault flag.
    pub fn clear_fault(&mut self) {
        self.fault = false;
    }

    /// Releases the underlying parts.
    pub fn release(self) -> (SPI, CS, RST, D) {
        (self.spi, self.cs, self.reset, self.delay)
    }
}

impl<SPI, CS, RST, D> RegisterBus for SpiRegisterBus<SPI, CS, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    fn select(&mut self) {
        if self.cs.set_low().is_err() {
            self.fault = true;
        }
    }

    fn deselect(&mut self) {
        if self.spi.flush().is_err() {
            self.fault = true;
        }
        if self.cs.set_high().is_err() {
            self.fault = true;
        }
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        let mut word = [byte];
        match self.spi.transfer_in_place(&mut word) {
            Ok(()) => word[0],
            Err(_) => {
                self.fault = true;
                0x00
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn set_reset(&mut self, active: bool) {
        let high = match self.polarity {
            ResetPolarity::ActiveHigh => active,
            ResetPolarity::ActiveLow => !active,
        };
        let result = if high {
            self.reset.set_high()
        } else {
            self.reset.set_low()
        };
        if result.is_err() {
            self.fault = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[test]
    fn register_read_frames_bytes_with_chip_select() {
        let spi = SpiMock::new(&[
            SpiTransaction::transfer_in_place(vec![0x10], vec![0x00]),
            SpiTransaction::transfer_in_place(vec![0x00], vec![0x24]),
            SpiTransaction::flush(),
        ]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let reset = PinMock::new(&[]);

        let mut bus =
            SpiRegisterBus::new(spi, cs, reset, NoopDelay::new(), ResetPolarity::ActiveHigh);
        bus.select();
        bus.transfer(0x10);
        let version = bus.transfer(0x00);
        bus.deselect();

        assert_eq!(version, 0x24);
        assert!(!bus.fault());

        let (mut spi, mut cs, mut reset, _) = bus.release();
        spi.done();
        cs.done();
        reset.done();
    }

    #[test]
    fn reset_level_follows_polarity() {
        let spi = SpiMock::new(&[]);
        let cs = PinMock::new(&[]);
        let reset = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);

        // RFM95: NRESET is active low, so releasing reset drives the pin high
        let mut bus =
            SpiRegisterBus::new(spi, cs, reset, NoopDelay::new(), ResetPolarity::ActiveLow);
        bus.set_reset(false);
        bus.set_reset(true);

        let (mut spi, mut cs, mut reset, _) = bus.release();
        spi.done();
        cs.done();
        reset.done();
    }
}
