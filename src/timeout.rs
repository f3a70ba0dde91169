//! Receive timeout governor
//!
//! A receive with timeout enabled must end even if no packet arrives. The
//! chip can raise a Timeout interrupt by itself, but that interrupt is known
//! to occasionally not fire, so a tick counter driven by the host can force
//! the timeout as well. [`TimeoutStrategy`] selects either mechanism or both.
//!
//! # Hardware Timeout
//! - Packet mode: Timeout is routed to DIO4 and the RX timeout registers are
//!   loaded with nonzero periods; disabling zeroes them again
//! - Chirp mode: the receive uses single receive mode, which ends with
//!   RxTimeout on DIO1 after the programmed symbol count
//!
//! # Software Timeout
//! While armed, every [`IrqLatch::on_tick`] advances the [`TickCounter`]; the
//! tick that reaches the limit forces the timeout latch and disarms the
//! counter.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::bus::RegisterBus;
use crate::config::TimeoutStrategy;
use crate::device::Device;
use crate::irq::IrqLatch;
use crate::variant::{Modulation, VariantProfile};

/// Tick based deadline, safe to advance from interrupt context.
#[derive(Debug)]
pub struct TickCounter {
    armed: AtomicBool,
    count: AtomicU16,
    limit: AtomicU16,
}

impl TickCounter {
    /// Creates a disarmed counter.
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
            count: AtomicU16::new(0),
            limit: AtomicU16::new(0),
        }
    }

    /// Starts counting from zero towards `limit`.
    pub fn arm(&self, limit: u16) {
        self.count.store(0, Ordering::Relaxed);
        self.limit.store(limit, Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }

    /// Stops counting.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    /// Returns `true` while the counter is running.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Advances the counter by one tick.
    ///
    /// Returns `true` exactly once, on the tick that reaches the limit, and
    /// disarms the counter at that point.
    pub fn tick(&self) -> bool {
        if !self.armed.load(Ordering::Acquire) {
            return false;
        }

        let count = self.count.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        if count < self.limit.load(Ordering::Relaxed) {
            return false;
        }

        // only the tick that flips `armed` reports the deadline
        self.armed.swap(false, Ordering::AcqRel)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Enables and disables the receive deadline according to a
/// [`TimeoutStrategy`].
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGovernor {
    strategy: TimeoutStrategy,
    enabled: bool,
}

impl TimeoutGovernor {
    /// Creates a disabled governor.
    pub const fn new(strategy: TimeoutStrategy) -> Self {
        Self {
            strategy,
            enabled: false,
        }
    }

    /// The configured strategy.
    pub fn strategy(&self) -> TimeoutStrategy {
        self.strategy
    }

    /// Returns `true` between `enable(true)` and `enable(false)`.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns `true` if an enabled receive should use single receive mode.
    pub fn single_receive(&self, modulation: Modulation) -> bool {
        self.enabled && modulation == Modulation::Chirp && self.strategy.uses_hardware()
    }

    /// Arms or disarms the deadline.
    ///
    /// Disabling always zeroes the packet mode hardware registers and
    /// disarms the tick counter, whatever the strategy.
    pub fn enable<B: RegisterBus>(
        &mut self,
        enable: bool,
        device: &mut Device<B>,
        profile: &VariantProfile,
        modulation: Modulation,
        latch: &IrqLatch,
    ) {
        self.enabled = enable;

        if modulation == Modulation::Packet {
            let hardware = enable && self.strategy.uses_hardware();
            if hardware {
                let route = profile.timeout_route;
                device.modify(route.register, route.mask, route.bits);
            }
            for &(register, value) in profile.rx_timeouts {
                device.write(register, if hardware { value } else { 0x00 });
            }
        }

        match self.strategy.ticks() {
            Some(ticks) if enable => latch.ticks().arm(ticks),
            _ => latch.ticks().disarm(),
        }
    }
}
