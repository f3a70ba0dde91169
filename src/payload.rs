//! Payload exchanges
//!
//! # Frame Layout
//! Packet mode uses variable length packets with address filtering. The
//! first FIFO byte is the length of everything after it, which includes the
//! destination address:
//!
//! ```text
//! | L = n + 1 | destination | payload (n bytes) |
//! ```
//!
//! Chirp mode writes the raw payload to the FIFO at the Tx base address and
//! the length to `RegPayloadLength`; the explicit LoRa header carries it on
//! air. There is no destination address.
//!
//! # Exchange Protocol
//! 1. Clear the latches of the exchange and any unserviced DIO edge
//! 2. Route the completion event to DIO0
//! 3. For a receive, arm or disarm the timeout governor
//! 4. Enter Tx or Rx
//! 5. Busy-wait on the latch; a receive also ends on `TIMEOUT`
//! 6. Disarm the governor and return to Standby
//!
//! A transmit has no deadline: PacketSent always follows once the FIFO
//! drained.

use crate::bus::RegisterBus;
use crate::irq::{ChipEvents, IrqFlags};
use crate::mode::OperatingMode;
use crate::radio::{ExchangeState, RadioDriver, RxOutcome};
use crate::registers::rfm95::LoraIrq;
use crate::variant::DioRoute;

/// Packet mode header for a payload of `len` bytes.
pub fn packet_header(len: usize, destination: u8) -> [u8; 2] {
    [(len + 1) as u8, destination]
}

/// Number of payload bytes to copy for a packet mode length byte.
pub fn packet_payload_len(length: u8, capacity: usize) -> usize {
    (length as usize).saturating_sub(1).min(capacity)
}

impl<B> RadioDriver<'_, B>
where
    B: RegisterBus,
{
    fn route(&mut self, route: DioRoute) {
        self.device.modify(route.register, route.mask, route.bits);
    }

    fn arm_receive(&mut self, timeout_enabled: bool) {
        self.exchange = ExchangeState::Arming;
        self.latch.clear(IrqFlags::RECEIVE_READY | IrqFlags::TIMEOUT);
        self.latch.take_pending();

        match self.profile.chirp_for(self.modulation) {
            Some(chirp) => {
                self.device.write(
                    chirp.irq_flags,
                    (LoraIrq::RX_TIMEOUT | LoraIrq::RX_DONE | LoraIrq::PAYLOAD_CRC_ERROR).bits(),
                );
                self.route(chirp.ready_route);
                let base = self.device.read(chirp.fifo_rx_base);
                self.device.write(chirp.fifo_addr_ptr, base);
            }
            None => self.route(self.profile.ready_route),
        }

        self.governor.enable(
            timeout_enabled,
            &mut self.device,
            self.profile,
            self.modulation,
            self.latch,
        );

        let mode = if self.governor.single_receive(self.modulation) {
            if let Some(chirp) = self.profile.chirp {
                self.route(chirp.timeout_route);
            }
            OperatingMode::RxSingle
        } else {
            OperatingMode::Rx
        };
        self.set_mode(mode);
        self.exchange = ExchangeState::Waiting;
    }

    fn service_pending(&mut self) {
        if self.latch.take_pending() {
            self.on_interrupt();
        }
    }

    fn finish_exchange(&mut self, state: ExchangeState) {
        self.governor.enable(
            false,
            &mut self.device,
            self.profile,
            self.modulation,
            self.latch,
        );
        self.set_mode(OperatingMode::Standby);
        self.exchange = state;
    }

    /// Drops a receive started with [`start_receive`](Self::start_receive)
    /// that was never completed, so no deadline outlives it.
    pub(crate) fn abort_receive(&mut self) {
        if self.governor.is_enabled() {
            self.governor.enable(
                false,
                &mut self.device,
                self.profile,
                self.modulation,
                self.latch,
            );
        }
        self.latch.clear(IrqFlags::TIMEOUT);
    }

    /// Puts the chip in receive mode without waiting.
    ///
    /// Completion is observed with [`poll_receive_ready`](Self::poll_receive_ready).
    /// Events latched before this call are discarded.
    pub fn start_receive(&mut self, timeout_enabled: bool) {
        self.arm_receive(timeout_enabled);
    }

    /// Checks whether a started receive has a payload.
    ///
    /// On a payload the RSSI and CRC verdict are sampled and the chip returns
    /// to Standby, leaving the payload in the FIFO for
    /// [`read_payload`](Self::read_payload). A latched timeout ends the
    /// receive the same way but reports not ready.
    pub fn poll_receive_ready(&mut self) -> RxOutcome {
        self.service_pending();

        let flags = self.latch.flags();
        if !flags.contains(IrqFlags::RECEIVE_READY) {
            if flags.contains(IrqFlags::TIMEOUT) && self.exchange == ExchangeState::Waiting {
                self.latch.clear(IrqFlags::TIMEOUT);
                self.finish_exchange(ExchangeState::TimedOut);
            }
            return RxOutcome::NOT_READY;
        }
        self.latch.clear(IrqFlags::RECEIVE_READY);

        let (rssi, crc_ok) = match self.profile.chirp_for(self.modulation) {
            Some(chirp) => {
                let rssi = chirp.rssi.apply(self.device.read(chirp.packet_rssi));
                let events = ChipEvents::from_chirp(self.device.read(chirp.irq_flags));
                (rssi, events.crc_ok)
            }
            None => {
                let rssi = self.profile.rssi.apply(self.device.read(self.profile.rssi_value));
                let irq2 = self.device.read(self.profile.irq_flags2);
                let events = ChipEvents::from_packet(0x00, irq2);
                (rssi, events.crc_ok)
            }
        };

        self.finish_exchange(ExchangeState::Completed);
        RxOutcome {
            ready: true,
            rssi,
            crc_ok,
        }
    }

    /// Copies the received payload into `buf`.
    ///
    /// Returns the number of bytes copied, at most `buf.len()`. In packet
    /// mode the destination address is dropped.
    pub fn read_payload(&mut self, buf: &mut [u8]) -> usize {
        let reported = match self.profile.chirp_for(self.modulation) {
            Some(chirp) => {
                let current = self.device.read(chirp.fifo_rx_current);
                self.device.write(chirp.fifo_addr_ptr, current);
                self.device.read(chirp.rx_nb_bytes) as usize
            }
            None => {
                let mut header = [0u8; 2];
                self.device.read_fifo(&mut header);
                packet_payload_len(header[0], usize::MAX)
            }
        };

        let len = reported.min(buf.len());
        if len < reported {
            #[cfg(feature = "defmt")]
            defmt::warn!("received {} bytes, buffer holds {}", reported, buf.len());
        }

        self.device.read_fifo(&mut buf[..len]);
        len
    }

    /// Receives one payload into `buf`, blocking until it arrives.
    ///
    /// With `timeout_enabled` the receive is bounded by the configured
    /// [`TimeoutStrategy`](crate::TimeoutStrategy). Returns 0 on timeout,
    /// after switching the PA to maximum power for the next attempt.
    pub fn receive_payload(&mut self, buf: &mut [u8], timeout_enabled: bool) -> usize {
        self.arm_receive(timeout_enabled);

        let ready = loop {
            self.service_pending();

            let flags = self.latch.flags();
            if flags.contains(IrqFlags::RECEIVE_READY) {
                break true;
            }
            if flags.contains(IrqFlags::TIMEOUT) {
                break false;
            }
            core::hint::spin_loop();
        };

        if !ready {
            #[cfg(feature = "defmt")]
            defmt::debug!("receive timed out");
            self.latch.clear(IrqFlags::TIMEOUT);
            self.finish_exchange(ExchangeState::TimedOut);
            self.device.write(self.profile.pa, self.profile.power.max_value);
            return 0;
        }

        self.latch.clear(IrqFlags::RECEIVE_READY);
        self.finish_exchange(ExchangeState::Completed);
        self.read_payload(buf)
    }

    /// Sends `buf` to `destination`, blocking until the chip reports it sent.
    ///
    /// A receive left pending by [`start_receive`](Self::start_receive) is
    /// abandoned.
    ///
    /// Payloads longer than the modulation allows (63 bytes in packet mode,
    /// 128 in chirp mode) are truncated. Returns the number of payload bytes
    /// sent. `destination` is ignored in chirp mode.
    pub fn transmit_payload(&mut self, buf: &[u8], destination: u8) -> usize {
        self.abort_receive();
        self.exchange = ExchangeState::Arming;

        let len = buf.len().min(self.profile.max_payload(self.modulation));
        if len < buf.len() {
            #[cfg(feature = "defmt")]
            defmt::warn!("payload truncated from {} to {} bytes", buf.len(), len);
        }
        let payload = &buf[..len];

        let route = match self.profile.chirp_for(self.modulation) {
            Some(chirp) => {
                let base = self.device.read(chirp.fifo_tx_base);
                self.device.write(chirp.fifo_addr_ptr, base);
                self.device.write(chirp.payload_length, len as u8);
                self.device.write_fifo(&[], payload);
                self.device.write(chirp.irq_flags, LoraIrq::all().bits());
                chirp.sent_route
            }
            None => {
                self.device.write_fifo(&packet_header(len, destination), payload);
                self.profile.sent_route
            }
        };

        self.latch.clear(IrqFlags::SEND_COMPLETE);
        self.latch.take_pending();
        self.route(route);
        self.set_mode(OperatingMode::Tx);
        self.exchange = ExchangeState::Waiting;

        loop {
            self.service_pending();
            if self.latch.flags().contains(IrqFlags::SEND_COMPLETE) {
                break;
            }
            core::hint::spin_loop();
        }

        self.latch.clear(IrqFlags::SEND_COMPLETE);
        self.set_mode(OperatingMode::Standby);
        self.exchange = ExchangeState::Completed;
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_counts_address_byte() {
        assert_eq!(packet_header(3, 9), [4, 9]);
        assert_eq!(packet_header(63, 0x84), [64, 0x84]);
    }

    #[test]
    fn received_length_is_clamped() {
        assert_eq!(packet_payload_len(4, 10), 3);
        assert_eq!(packet_payload_len(40, 10), 10);
        assert_eq!(packet_payload_len(0, 10), 0);
    }
}
