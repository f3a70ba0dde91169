//! Simulated RFM69/RFM95 for driver tests.
//!
//! The model covers what the driver relies on: a flat register file with
//! burst auto-increment, the packet mode FIFO queue, the LoRa FIFO memory
//! behind `RegFifoAddrPtr`, and interrupt flags raised on mode changes.
//! Every raised flag is announced through [`IrqLatch::signal`], the way a
//! DIO edge handler would.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rfm_radio::{ChipVariant, IrqLatch, RegisterBus};

const WRITE: u8 = 0x80;
const OP_MODE: u8 = 0x01;
const LONG_RANGE: u8 = 0x80;

const LORA_FIFO_ADDR_PTR: u8 = 0x0D;
const LORA_FIFO_TX_BASE: u8 = 0x0E;
const LORA_FIFO_RX_BASE: u8 = 0x0F;
const LORA_FIFO_RX_CURRENT: u8 = 0x10;
const LORA_IRQ_FLAGS: u8 = 0x12;
const LORA_RX_NB_BYTES: u8 = 0x13;
const LORA_PKT_RSSI: u8 = 0x1A;
const LORA_PAYLOAD_LENGTH: u8 = 0x22;

const LORA_RX_TIMEOUT: u8 = 1 << 7;
const LORA_RX_DONE: u8 = 1 << 6;
const LORA_CRC_ERROR: u8 = 1 << 5;
const LORA_TX_DONE: u8 = 1 << 3;

const IRQ1_TIMEOUT: u8 = 1 << 2;
const IRQ2_PACKET_SENT: u8 = 1 << 3;
const IRQ2_PAYLOAD_READY: u8 = 1 << 2;
const IRQ2_CRC_OK: u8 = 1 << 1;

/// Frames waiting to be received, shareable with other threads.
///
/// Packet mode frames are complete FIFO images (`[L, dest, payload..]`),
/// LoRa frames are raw payloads.
#[derive(Clone, Default)]
pub struct Air(Arc<Mutex<VecDeque<Vec<u8>>>>);

impl Air {
    pub fn send(&self, frame: &[u8]) {
        self.0.lock().unwrap().push_back(frame.to_vec());
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }

    fn take(&self) -> Option<Vec<u8>> {
        self.0.lock().unwrap().pop_front()
    }
}

struct Layout {
    version: u8,
    mode_mask: u8,
    tx: u8,
    rx: u8,
    rx_single: Option<u8>,
    irq1: u8,
    irq2: u8,
    rssi: u8,
    rx_timeout: u8,
}

const RFM69: Layout = Layout {
    version: 0x10,
    mode_mask: 0x1C,
    tx: 0x0C,
    rx: 0x10,
    rx_single: None,
    irq1: 0x27,
    irq2: 0x28,
    rssi: 0x24,
    rx_timeout: 0x2A,
};

const RFM95: Layout = Layout {
    version: 0x42,
    mode_mask: 0x07,
    tx: 3,
    rx: 5,
    rx_single: Some(6),
    irq1: 0x3E,
    irq2: 0x3F,
    rssi: 0x11,
    rx_timeout: 0x20,
};

pub struct SimChip<'a> {
    latch: &'a IrqLatch,
    layout: &'static Layout,
    pub regs: [u8; 128],
    pub air: Air,
    /// The chip raises its Timeout interrupt when a timeout is configured
    pub hardware_timeout: bool,
    /// Received packets also carry the Timeout flag
    pub timeout_with_payload: bool,
    /// RSSI register value reported with received packets
    pub rssi: u8,
    /// CRC verdict reported with received packets
    pub crc_ok: bool,
    /// Frames that left the chip, as they were in the FIFO
    pub sent: Vec<Vec<u8>>,
    /// Every mode field value written, in order
    pub modes: Vec<u8>,
    pub writes: Vec<(u8, u8)>,
    pub reset: Option<bool>,
    pub delays: u32,
    packet_fifo: VecDeque<u8>,
    tx_fifo: Vec<u8>,
    lora_fifo: [u8; 256],
    cursor: Option<(u8, bool)>,
}

impl<'a> SimChip<'a> {
    pub fn new(variant: ChipVariant, latch: &'a IrqLatch) -> Self {
        let layout = match variant {
            ChipVariant::PacketOnly => &RFM69,
            ChipVariant::PacketOrChirpSwitchable => &RFM95,
        };
        let mut regs = [0u8; 128];
        match variant {
            ChipVariant::PacketOnly => {
                regs[0x10] = 0x24;
                regs[OP_MODE as usize] = 0x04;
            }
            ChipVariant::PacketOrChirpSwitchable => {
                regs[0x42] = 0x12;
                regs[OP_MODE as usize] = 0x01;
            }
        }

        Self {
            latch,
            layout,
            regs,
            air: Air::default(),
            hardware_timeout: false,
            timeout_with_payload: false,
            rssi: 0,
            crc_ok: true,
            sent: Vec::new(),
            modes: Vec::new(),
            writes: Vec::new(),
            reset: None,
            delays: 0,
            packet_fifo: VecDeque::new(),
            tx_fifo: Vec::new(),
            lora_fifo: [0; 256],
            cursor: None,
        }
    }

    pub fn rfm69(latch: &'a IrqLatch) -> Self {
        Self::new(ChipVariant::PacketOnly, latch)
    }

    pub fn rfm95(latch: &'a IrqLatch) -> Self {
        Self::new(ChipVariant::PacketOrChirpSwitchable, latch)
    }

    /// A bus on which nothing answers.
    pub fn absent(variant: ChipVariant, latch: &'a IrqLatch) -> Self {
        let mut chip = Self::new(variant, latch);
        chip.regs = [0; 128];
        chip
    }

    pub fn writes_to(&self, address: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn mode_field(&self) -> u8 {
        self.regs[OP_MODE as usize] & self.layout.mode_mask
    }

    pub fn standby(&self) -> u8 {
        if self.layout.mode_mask == 0x1C {
            0x04
        } else {
            0x01
        }
    }

    pub fn tx_mode(&self) -> u8 {
        self.layout.tx
    }

    pub fn rx_single_mode(&self) -> Option<u8> {
        self.layout.rx_single
    }

    fn lora(&self) -> bool {
        self.layout.rx_single.is_some() && self.regs[OP_MODE as usize] & LONG_RANGE != 0
    }

    fn receiving(&self) -> bool {
        let mode = self.mode_field();
        mode == self.layout.rx || Some(mode) == self.layout.rx_single
    }

    fn set(&mut self, address: u8, bits: u8) {
        self.regs[address as usize] |= bits;
    }

    fn reset_bits(&mut self, address: u8, bits: u8) {
        self.regs[address as usize] &= !bits;
    }

    fn payload_pending(&self) -> bool {
        if self.lora() {
            self.regs[LORA_IRQ_FLAGS as usize] & LORA_RX_DONE != 0
        } else {
            self.regs[self.layout.irq2 as usize] & IRQ2_PAYLOAD_READY != 0
        }
    }

    fn deliver(&mut self, frame: Vec<u8>) {
        if self.lora() {
            let base = self.regs[LORA_FIFO_RX_BASE as usize];
            for (i, byte) in frame.iter().enumerate() {
                self.lora_fifo[base.wrapping_add(i as u8) as usize] = *byte;
            }
            self.regs[LORA_FIFO_RX_CURRENT as usize] = base;
            self.regs[LORA_RX_NB_BYTES as usize] = frame.len() as u8;
            self.regs[LORA_PKT_RSSI as usize] = self.rssi;
            let mut flags = LORA_RX_DONE;
            if !self.crc_ok {
                flags |= LORA_CRC_ERROR;
            }
            if self.timeout_with_payload {
                flags |= LORA_RX_TIMEOUT;
            }
            self.set(LORA_IRQ_FLAGS, flags);
        } else {
            self.packet_fifo = frame.into();
            self.regs[self.layout.rssi as usize] = self.rssi;
            let mut flags = IRQ2_PAYLOAD_READY;
            if self.crc_ok {
                flags |= IRQ2_CRC_OK;
            }
            self.set(self.layout.irq2, flags);
            if self.timeout_with_payload {
                self.set(self.layout.irq1, IRQ1_TIMEOUT);
            }
        }
        self.latch.signal();
    }

    /// Picks up a frame that was put on the air while already receiving.
    fn listen(&mut self) {
        if self.receiving() && !self.payload_pending() {
            if let Some(frame) = self.air.take() {
                self.deliver(frame);
            }
        }
    }

    fn enter_mode(&mut self, old: u8, mode: u8) {
        self.modes.push(mode);
        if old == mode {
            return;
        }

        if old == self.layout.tx {
            self.reset_bits(self.layout.irq2, IRQ2_PACKET_SENT);
        }
        if old == self.layout.rx || Some(old) == self.layout.rx_single {
            self.reset_bits(self.layout.irq1, IRQ1_TIMEOUT);
        }

        if mode == self.layout.tx {
            if self.lora() {
                let base = self.regs[LORA_FIFO_TX_BASE as usize];
                let len = self.regs[LORA_PAYLOAD_LENGTH as usize];
                let frame = (0..len)
                    .map(|i| self.lora_fifo[base.wrapping_add(i) as usize])
                    .collect();
                self.sent.push(frame);
                self.set(LORA_IRQ_FLAGS, LORA_TX_DONE);
            } else {
                self.sent.push(std::mem::take(&mut self.tx_fifo));
                self.set(self.layout.irq2, IRQ2_PACKET_SENT);
            }
            self.latch.signal();
        } else if self.receiving() {
            if let Some(frame) = self.air.take() {
                self.deliver(frame);
            } else if self.hardware_timeout {
                if self.lora() {
                    if Some(mode) == self.layout.rx_single {
                        self.set(LORA_IRQ_FLAGS, LORA_RX_TIMEOUT);
                        self.latch.signal();
                    }
                } else if self.regs[self.layout.rx_timeout as usize] != 0 {
                    self.set(self.layout.irq1, IRQ1_TIMEOUT);
                    self.latch.signal();
                }
            }
        }
    }

    fn write_register(&mut self, address: u8, value: u8) {
        self.writes.push((address, value));

        if address == OP_MODE {
            let old = self.mode_field();
            self.regs[OP_MODE as usize] = value;
            let mode = self.mode_field();
            self.enter_mode(old, mode);
        } else if address == LORA_IRQ_FLAGS && self.lora() {
            self.reset_bits(LORA_IRQ_FLAGS, value);
        } else {
            self.regs[address as usize] = value;
        }
    }

    fn read_register(&mut self, address: u8) -> u8 {
        if address == self.layout.irq1
            || address == self.layout.irq2
            || (address == LORA_IRQ_FLAGS && self.lora())
        {
            self.listen();
        }
        self.regs[address as usize]
    }

    fn fifo(&mut self, write: bool, byte: u8) -> u8 {
        if self.lora() {
            let pointer = self.regs[LORA_FIFO_ADDR_PTR as usize];
            self.regs[LORA_FIFO_ADDR_PTR as usize] = pointer.wrapping_add(1);
            if write {
                self.lora_fifo[pointer as usize] = byte;
                0x00
            } else {
                self.lora_fifo[pointer as usize]
            }
        } else if write {
            self.tx_fifo.push(byte);
            0x00
        } else {
            let value = self.packet_fifo.pop_front().unwrap_or(0x00);
            if self.packet_fifo.is_empty() {
                self.reset_bits(self.layout.irq2, IRQ2_PAYLOAD_READY | IRQ2_CRC_OK);
            }
            value
        }
    }
}

impl RegisterBus for SimChip<'_> {
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

        if address == 0x00 {
            return self.fifo(write, byte);
        }

        let value = if write {
            self.write_register(address, byte);
            0x00
        } else {
            self.read_register(address)
        };
        self.cursor = Some((address.wrapping_add(1) & 0x7F, write));
        value
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays += ms;
    }

    fn set_reset(&mut self, active: bool) {
        self.reset = Some(active);
    }
}

/// Calls `on_tick` every millisecond on another thread while `f` runs.
pub fn with_ticker<R>(latch: &IrqLatch, f: impl FnOnce() -> R) -> R {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    let done = AtomicBool::new(false);
    std::thread::scope(|scope| {
        scope.spawn(|| {
            while !done.load(Ordering::Acquire) {
                latch.on_tick();
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        let result = f();
        done.store(true, Ordering::Release);
        result
    })
}
