//! Interrupt latching
//!
//! The chip signals completed exchanges on its DIO pins. The host's pin
//! interrupt handler cannot touch the register bus while the main context is
//! blocked inside a driver call, so it only calls [`IrqLatch::signal`]. The
//! blocked driver services the signal itself: it reads the chip's flag
//! registers and latches the events of interest in [`IrqFlags`].
//!
//! The latch is made of atomics only and can live in a `static`:
//!
//! ```ignore
//! static RADIO_IRQ: IrqLatch = IrqLatch::new();
//!
//! #[interrupt]
//! fn EXTI0() {
//!     RADIO_IRQ.signal();
//! }
//!
//! #[interrupt]
//! fn TIM2() {
//!     RADIO_IRQ.on_tick();
//! }
//! ```
//!
//! # Important Notes
//! - Flags are only set by the interrupt path ([`signal`](IrqLatch::signal)
//!   serviced by the driver, [`force_timeout`](IrqLatch::force_timeout),
//!   [`on_tick`](IrqLatch::on_tick))
//! - The driver clears flags right before it arms an exchange, so a stale
//!   event never completes the next one

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use bitflags::bitflags;

use crate::registers::rfm95::LoraIrq;
use crate::registers::{PacketIrq1, PacketIrq2};
use crate::timeout::TickCounter;

bitflags! {
    /// Events latched for the main context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u8 {
        /// The receive deadline passed
        const TIMEOUT = 1 << 0;
        /// The transmitted packet left the chip
        const SEND_COMPLETE = 1 << 1;
        /// A received payload is waiting in the FIFO
        const RECEIVE_READY = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "IrqFlags({=u8:#x})", self.bits())
    }
}

/// Decoded chip interrupt registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipEvents {
    /// Events to latch
    pub flags: IrqFlags,
    /// Payload CRC verdict, meaningful when `flags` has `RECEIVE_READY`
    pub crc_ok: bool,
}

impl ChipEvents {
    /// Decodes packet mode `IrqFlags1` and `IrqFlags2`.
    pub fn from_packet(irq1: u8, irq2: u8) -> Self {
        let irq1 = PacketIrq1::from_bits_retain(irq1);
        let irq2 = PacketIrq2::from_bits_retain(irq2);

        let mut flags = IrqFlags::empty();
        flags.set(IrqFlags::TIMEOUT, irq1.contains(PacketIrq1::TIMEOUT));
        flags.set(IrqFlags::SEND_COMPLETE, irq2.contains(PacketIrq2::PACKET_SENT));
        flags.set(IrqFlags::RECEIVE_READY, irq2.contains(PacketIrq2::PAYLOAD_READY));

        Self {
            flags,
            crc_ok: irq2.contains(PacketIrq2::CRC_OK),
        }
    }

    /// Decodes the LoRa `IrqFlags` register.
    pub fn from_chirp(irq: u8) -> Self {
        let irq = LoraIrq::from_bits_retain(irq);

        let mut flags = IrqFlags::empty();
        flags.set(IrqFlags::TIMEOUT, irq.contains(LoraIrq::RX_TIMEOUT));
        flags.set(IrqFlags::RECEIVE_READY, irq.contains(LoraIrq::RX_DONE));
        flags.set(IrqFlags::SEND_COMPLETE, irq.contains(LoraIrq::TX_DONE));

        Self {
            flags,
            crc_ok: !irq.contains(LoraIrq::PAYLOAD_CRC_ERROR),
        }
    }
}

/// Sticky event flags shared between interrupt and main context.
#[derive(Debug)]
pub struct IrqLatch {
    flags: AtomicU8,
    pending: AtomicBool,
    ticks: TickCounter,
}

impl IrqLatch {
    /// Creates an empty latch.
    pub const fn new() -> Self {
        Self {
            flags: AtomicU8::new(0),
            pending: AtomicBool::new(false),
            ticks: TickCounter::new(),
        }
    }

    /// Notes a DIO edge. The driver reads the chip flags on its next check.
    ///
    /// Safe to call from any interrupt context.
    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Latches a receive timeout. Idempotent.
    ///
    /// Safe to call from any interrupt context.
    pub fn force_timeout(&self) {
        self.raise(IrqFlags::TIMEOUT);
    }

    /// Advances the software deadline, forcing the timeout when it passes.
    ///
    /// Call at a fixed cadence when a software timeout strategy is used;
    /// ticks while no receive is armed are ignored.
    pub fn on_tick(&self) {
        if self.ticks.tick() {
            #[cfg(feature = "defmt")]
            defmt::debug!("software receive deadline passed");
            self.force_timeout();
        }
    }

    /// Currently latched events.
    pub fn flags(&self) -> IrqFlags {
        IrqFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    /// Returns `true` if a DIO edge has not been serviced yet.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn raise(&self, flags: IrqFlags) {
        self.flags.fetch_or(flags.bits(), Ordering::Release);
    }

    pub(crate) fn clear(&self, flags: IrqFlags) {
        self.flags.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    /// Consumes the pending DIO edge, if any.
    pub(crate) fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn ticks(&self) -> &TickCounter {
        &self.ticks
    }
}

impl Default for IrqLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_flags_decode() {
        let events = ChipEvents::from_packet(0b1101_0100, 0b0000_0110);

        assert_eq!(events.flags, IrqFlags::TIMEOUT | IrqFlags::RECEIVE_READY);
        assert!(events.crc_ok);

        let sent = ChipEvents::from_packet(0x00, 0b0000_1000);
        assert_eq!(sent.flags, IrqFlags::SEND_COMPLETE);
        assert!(!sent.crc_ok);
    }

    #[test]
    fn chirp_flags_decode() {
        let events = ChipEvents::from_chirp(0x40 | 0x20);
        assert_eq!(events.flags, IrqFlags::RECEIVE_READY);
        assert!(!events.crc_ok);

        assert_eq!(ChipEvents::from_chirp(0x80).flags, IrqFlags::TIMEOUT);
        assert_eq!(ChipEvents::from_chirp(0x08).flags, IrqFlags::SEND_COMPLETE);
        assert!(ChipEvents::from_chirp(0x17).flags.is_empty());
    }

    #[test]
    fn latch_is_sticky_until_cleared() {
        let latch = IrqLatch::new();

        latch.force_timeout();
        latch.force_timeout();
        latch.raise(IrqFlags::RECEIVE_READY);
        assert_eq!(latch.flags(), IrqFlags::TIMEOUT | IrqFlags::RECEIVE_READY);

        latch.clear(IrqFlags::TIMEOUT);
        assert_eq!(latch.flags(), IrqFlags::RECEIVE_READY);
    }

    #[test]
    fn pending_signal_is_taken_once() {
        let latch = IrqLatch::new();
        latch.signal();

        assert!(latch.is_pending());
        assert!(latch.take_pending());
        assert!(!latch.take_pending());
    }

    #[test]
    fn ticks_without_receive_do_nothing() {
        let latch = IrqLatch::new();

        for _ in 0..10 {
            latch.on_tick();
        }

        assert!(latch.flags().is_empty());
    }
}
