//! RFM69/RFM95 register interface
//!
//! This module provides register-level access to the radio over any
//! [`RegisterBus`]. Both chip generations share the same serial protocol:
//!
//! - The first byte of a transaction is the register address, with bit 7 set
//!   for a write and cleared for a read
//! - Further bytes in the same transaction access consecutive addresses
//! - The FIFO (address `0x00`) does not auto-increment, so a burst on it
//!   streams the data buffer
//!
//! The interface is built around the `Device<B>` struct which wraps a bus and
//! provides methods for:
//! - Reading and writing typed registers
//! - Reading, writing and masking raw register bytes
//! - Streaming bytes into and out of the FIFO
//!
//! # Example
//! ```ignore
//! use rfm_radio::{Device, registers::rfm69::Version};
//!
//! let mut device = Device::new(bus);
//! let version: Version = device.read_register();
//! ```

use core::convert::Infallible;

use regiface::{ByteArray, ReadableRegister, WritableRegister};

use crate::bus::RegisterBus;

/// Address of the FIFO on both chip generations.
pub const FIFO: u8 = 0x00;

const WRITE: u8 = 0x80;

/// Register interface to the radio.
///
/// This struct wraps a [`RegisterBus`] and frames every access as one
/// chip-select transaction.
pub struct Device<B> {
    bus: B,
}

impl<B> Device<B> {
    /// Creates a new Device instance wrapping the provided bus.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Releases the underlying bus.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B> Device<B>
where
    B: RegisterBus,
{
    /// Reads a typed register from the device.
    ///
    /// Multi-byte registers are read in one burst starting at `R::id()`.
    pub fn read_register<R>(&mut self) -> R
    where
        R: ReadableRegister<IdType = u8, Error = Infallible>,
    {
        let mut raw_value = R::Array::new();

        self.bus.select();
        self.bus.transfer(R::id() & !WRITE);
        for byte in raw_value.as_mut() {
            *byte = self.bus.transfer(0x00);
        }
        self.bus.deselect();

        match R::from_bytes(raw_value) {
            Ok(register) => register,
            Err(never) => match never {},
        }
    }

    /// Writes a typed register to the device.
    ///
    /// Multi-byte registers are written in one burst starting at `R::id()`.
    pub fn write_register<R>(&mut self, register: R)
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(bytes) => bytes,
            Err(never) => match never {},
        };

        self.write_burst(R::id(), raw_value.as_ref());
    }

    /// Reads a single register byte.
    pub fn read(&mut self, address: u8) -> u8 {
        self.bus.select();
        self.bus.transfer(address & !WRITE);
        let value = self.bus.transfer(0x00);
        self.bus.deselect();

        value
    }

    /// Writes a single register byte.
    pub fn write(&mut self, address: u8, value: u8) {
        self.write_burst(address, &[value]);
    }

    /// Replaces the bits selected by `mask` with the corresponding bits of
    /// `bits`, leaving every other bit of the register untouched.
    pub fn modify(&mut self, address: u8, mask: u8, bits: u8) {
        let value = self.read(address);
        self.write(address, (value & !mask) | (bits & mask));
    }

    /// Writes `bytes` to consecutive registers starting at `address`.
    pub fn write_burst(&mut self, address: u8, bytes: &[u8]) {
        self.bus.select();
        self.bus.transfer(address | WRITE);
        for &byte in bytes {
            self.bus.transfer(byte);
        }
        self.bus.deselect();
    }

    /// Streams `header` followed by `payload` into the FIFO in a single
    /// transaction.
    pub fn write_fifo(&mut self, header: &[u8], payload: &[u8]) {
        self.bus.select();
        self.bus.transfer(FIFO | WRITE);
        for &byte in header.iter().chain(payload) {
            self.bus.transfer(byte);
        }
        self.bus.deselect();
    }

    /// Fills `bytes` from the FIFO in a single transaction.
    pub fn read_fifo(&mut self, bytes: &mut [u8]) {
        self.bus.select();
        self.bus.transfer(FIFO);
        for byte in bytes.iter_mut() {
            *byte = self.bus.transfer(0x00);
        }
        self.bus.deselect();
    }

    /// Blocks for `ms` milliseconds.
    pub fn delay_ms(&mut self, ms: u32) {
        self.bus.delay_ms(ms);
    }

    /// Drives the reset line, see [`RegisterBus::set_reset`].
    pub fn set_reset(&mut self, active: bool) {
        self.bus.set_reset(active);
    }
}

/// In-memory register file used by unit tests.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::VecDeque;
    use std::vec::Vec;

    use super::{RegisterBus, FIFO, WRITE};

    /// Chip model without interrupt behavior: 128 registers with burst
    /// auto-increment and a FIFO queue.
    pub(crate) struct RegisterFile {
        pub regs: [u8; 128],
        pub fifo: VecDeque<u8>,
        pub fifo_written: Vec<u8>,
        pub writes: Vec<(u8, u8)>,
        pub reset: Option<bool>,
        pub delays: u32,
        cursor: Option<(u8, bool)>,
    }

    impl RegisterFile {
        pub fn new() -> Self {
            Self {
                regs: [0; 128],
                fifo: VecDeque::new(),
                fifo_written: Vec::new(),
                writes: Vec::new(),
                reset: None,
                delays: 0,
                cursor: None,
            }
        }

        /// Returns the values written to `address`, in order.
        pub fn writes_to(&self, address: u8) -> Vec<u8> {
            self.writes
                .iter()
                .filter(|(a, _)| *a == address)
                .map(|(_, v)| *v)
                .collect()
        }
    }

    impl RegisterBus for RegisterFile {
        fn select(&mut self) {
            self.cursor = None;
        }

        fn deselect(&mut self) {
            self.cursor = None;
        }

        fn transfer(&mut self, byte: u8) -> u8 {
            let Some((address, write)) = self.cursor else {
                self.cursor = Some((byte & !WRITE, byte & WRITE != 0));
                return 0x00;
            };

            let value = if address == FIFO {
                if write {
                    self.fifo_written.push(byte);
                    0x00
                } else {
                    self.fifo.pop_front().unwrap_or(0x00)
                }
            } else if write {
                self.regs[address as usize] = byte;
                self.writes.push((address, byte));
                0x00
            } else {
                self.regs[address as usize]
            };

            if address != FIFO {
                self.cursor = Some((address.wrapping_add(1) & 0x7F, write));
            }
            value
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delays += ms;
        }

        fn set_reset(&mut self, active: bool) {
            self.reset = Some(active);
        }
    }
}
