mod common;

use std::time::Duration;

use common::{with_ticker, SimChip};
use rfm_radio::{
    ChipVariant, ExchangeState, IrqFlags, IrqLatch, OperatingMode, RadioConfig, RadioDriver,
    TimeoutStrategy,
};

fn packet_radio<'a>(
    chip: SimChip<'a>,
    latch: &'a IrqLatch,
    timeout: TimeoutStrategy,
) -> RadioDriver<'a, SimChip<'a>> {
    let config = RadioConfig::default().with_timeout(timeout);
    let mut radio = RadioDriver::with_config(chip, latch, config);
    radio.init(868_000_000, 5, ChipVariant::PacketOnly).unwrap();
    radio
}

#[test]
fn hardware_timeout_returns_zero_at_full_power() {
    let latch = IrqLatch::new();
    let mut chip = SimChip::rfm69(&latch);
    chip.hardware_timeout = true;
    let mut radio = packet_radio(chip, &latch, TimeoutStrategy::Hardware);
    radio.set_output_power(0);

    let mut buf = [0u8; 63];
    let len = radio.receive_payload(&mut buf, true);

    assert_eq!(len, 0);
    assert_eq!(radio.output_power(), 13);
    assert_eq!(radio.mode(), OperatingMode::Standby);
    assert_eq!(radio.exchange_state(), ExchangeState::TimedOut);
    assert!(!radio.timeout_enabled());

    let chip = radio.release();
    assert_eq!(chip.regs[0x11], 0x5F);
    // armed, then zeroed again
    assert_eq!(chip.writes_to(0x2A), vec![0x1F, 0x00]);
    assert_eq!(chip.writes_to(0x2B), vec![0x1F, 0x00]);
    assert_eq!(chip.regs[0x26] & 0xC0, 0x00);
}

#[test]
fn switchable_chip_programs_three_timeouts() {
    let latch = IrqLatch::new();
    let mut chip = SimChip::rfm95(&latch);
    chip.hardware_timeout = true;
    let config = RadioConfig::default().with_timeout(TimeoutStrategy::Hardware);
    let mut radio = RadioDriver::with_config(chip, &latch, config);
    radio.init(868_000_000, 5, ChipVariant::PacketOrChirpSwitchable).unwrap();

    let mut buf = [0u8; 63];
    assert_eq!(radio.receive_payload(&mut buf, true), 0);
    assert_eq!(radio.output_power(), 17);

    let chip = radio.release();
    assert_eq!(chip.writes_to(0x20), vec![0x1F, 0x00]);
    assert_eq!(chip.writes_to(0x21), vec![0x2F, 0x00]);
    assert_eq!(chip.writes_to(0x22), vec![0x3F, 0x00]);
    assert_eq!(chip.regs[0x41] & 0xC0, 0x80);
}

#[test]
fn ready_wins_over_simultaneous_timeout() {
    let latch = IrqLatch::new();
    let mut chip = SimChip::rfm69(&latch);
    chip.hardware_timeout = true;
    chip.timeout_with_payload = true;
    chip.air.send(&[3, 5, 0x10, 0x20]);
    let mut radio = packet_radio(chip, &latch, TimeoutStrategy::Hardware);

    let mut buf = [0u8; 63];
    let len = radio.receive_payload(&mut buf, true);

    assert_eq!(len, 2);
    assert_eq!(&buf[..2], &[0x10, 0x20]);
    assert_eq!(radio.exchange_state(), ExchangeState::Completed);
}

#[test]
fn software_fallback_ends_silent_receive() {
    let latch = IrqLatch::new();
    // the chip's timeout interrupt never fires
    let chip = SimChip::rfm69(&latch);
    let mut radio = packet_radio(chip, &latch, TimeoutStrategy::default());

    let mut buf = [0u8; 63];
    let len = with_ticker(&latch, || radio.receive_payload(&mut buf, true));

    assert_eq!(len, 0);
    assert_eq!(radio.output_power(), 13);
    assert!(!radio.timeout_enabled());
    assert_eq!(radio.mode(), OperatingMode::Standby);
}

#[test]
fn ticks_after_receive_are_ignored() {
    let latch = IrqLatch::new();
    let chip = SimChip::rfm69(&latch);
    chip.air.send(&[2, 5, 0x01]);
    let mut radio = packet_radio(chip, &latch, TimeoutStrategy::Software { ticks: 1 });

    let mut buf = [0u8; 63];
    assert_eq!(radio.receive_payload(&mut buf, true), 1);

    for _ in 0..5 {
        latch.on_tick();
    }
    assert!(!latch.flags().contains(IrqFlags::TIMEOUT));
}

#[test]
fn forced_timeout_from_another_thread() {
    let latch = IrqLatch::new();
    let chip = SimChip::rfm69(&latch);
    let mut radio = packet_radio(chip, &latch, TimeoutStrategy::Hardware);

    let mut buf = [0u8; 63];
    let len = std::thread::scope(|scope| {
        scope.spawn(|| {
            std::thread::sleep(Duration::from_millis(5));
            latch.force_timeout();
        });
        radio.receive_payload(&mut buf, true)
    });

    assert_eq!(len, 0);
    assert_eq!(radio.exchange_state(), ExchangeState::TimedOut);
}

#[test]
fn receive_outcome_matches_first_observed_event() {
    for round in 0..40u64 {
        let latch = IrqLatch::new();
        let chip = SimChip::rfm69(&latch);
        let air = chip.air.clone();
        let mut radio = packet_radio(chip, &latch, TimeoutStrategy::Software { ticks: 2 });
        radio.set_output_power(0);

        let mut buf = [0u8; 63];
        let len = with_ticker(&latch, || {
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    std::thread::sleep(Duration::from_micros(round * 100));
                    air.send(&[4, 5, 0xA1, 0xA2, 0xA3]);
                    latch.signal();
                });
                radio.receive_payload(&mut buf, true)
            })
        });

        match len {
            0 => {
                assert_eq!(radio.exchange_state(), ExchangeState::TimedOut);
                assert_eq!(radio.output_power(), 13);
            }
            3 => {
                assert_eq!(&buf[..3], &[0xA1, 0xA2, 0xA3]);
                assert_eq!(radio.exchange_state(), ExchangeState::Completed);
                assert_eq!(radio.output_power(), 0);
            }
            other => panic!("round {round}: unexpected length {other}"),
        }
        assert_eq!(radio.mode(), OperatingMode::Standby);
        assert!(!radio.timeout_enabled());
    }
}

#[test]
fn sleep_abandons_started_receive() {
    let latch = IrqLatch::new();
    let chip = SimChip::rfm69(&latch);
    let timeout = TimeoutStrategy::HardwareWithFallback { ticks: 2 };
    let mut radio = packet_radio(chip, &latch, timeout);

    radio.start_receive(true);
    assert!(radio.timeout_enabled());

    radio.sleep();
    for _ in 0..5 {
        latch.on_tick();
    }

    assert!(!radio.timeout_enabled());
    assert_eq!(radio.exchange_state(), ExchangeState::Idle);
    assert!(!latch.flags().contains(IrqFlags::TIMEOUT));

    radio.wake();
    assert!(!radio.timeout_enabled());

    let chip = radio.release();
    assert_eq!(chip.regs[0x2A], 0x00);
    assert_eq!(chip.regs[0x2B], 0x00);
}

#[test]
fn transmit_abandons_started_receive() {
    let latch = IrqLatch::new();
    let chip = SimChip::rfm69(&latch);
    let timeout = TimeoutStrategy::HardwareWithFallback { ticks: 2 };
    let mut radio = packet_radio(chip, &latch, timeout);

    radio.start_receive(true);
    assert_eq!(radio.transmit_payload(&[1], 2), 1);
    for _ in 0..5 {
        latch.on_tick();
    }

    assert!(!radio.timeout_enabled());
    assert_eq!(radio.exchange_state(), ExchangeState::Completed);
    assert!(!latch.flags().contains(IrqFlags::TIMEOUT));

    let chip = radio.release();
    assert_eq!(chip.sent, vec![vec![2, 2, 1]]);
    assert_eq!(chip.regs[0x2A], 0x00);
    assert_eq!(chip.regs[0x2B], 0x00);
}

#[test]
fn reinit_abandons_started_receive() {
    let latch = IrqLatch::new();
    let chip = SimChip::rfm69(&latch);
    let mut radio = packet_radio(chip, &latch, TimeoutStrategy::Software { ticks: 1 });

    radio.start_receive(true);
    radio.init(868_000_000, 5, ChipVariant::PacketOnly).unwrap();
    latch.on_tick();

    assert!(!radio.timeout_enabled());
    assert!(latch.flags().is_empty());
    assert_eq!(radio.mode(), OperatingMode::Standby);
}
