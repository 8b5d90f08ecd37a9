// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Wall-clock services on top of a single alarm: reading time, spinning and
//! sleeping with the hart parked in `wfi`.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let timer = static_init!(
//!     TimerService<'static, QemuRv64VirtClint, MachineTrap>,
//!     TimerService::new(&peripherals.clint, &peripherals.trap)
//! );
//! timer.install_interrupt_vector()?;
//! timer.sleep(1_000);
//! ```

use kernel::hil::time::{Alarm, ConvertTicks, Ticks64};
use kernel::platform::trap::{TrapControl, TrapError};

pub struct TimerService<'a, A: Alarm, T: TrapControl> {
    alarm: &'a A,
    trap: &'a T,
}

impl<'a, A: Alarm, T: TrapControl> TimerService<'a, A, T> {
    pub fn new(alarm: &'a A, trap: &'a T) -> TimerService<'a, A, T> {
        TimerService { alarm, trap }
    }

    pub fn now(&self) -> Ticks64 {
        self.alarm.now()
    }

    /// Milliseconds since the counter started, truncated to 32 bits.
    pub fn ticks_ms(&self) -> u32 {
        self.alarm.ticks_to_ms(self.now()) as u32
    }

    /// Spin for at least `us` microseconds.
    pub fn busy_delay(&self, us: u32) {
        let start = self.now();
        let dt = self.alarm.ticks_from_us(us);
        while self.now().wrapping_sub(start) < dt {
            core::hint::spin_loop();
        }
    }

    /// Park the hart for at least `us` microseconds.
    ///
    /// The timer trap handler only masks the timer interrupt, so a wakeup
    /// says nothing about the deadline. It is re-checked after every `wfi`.
    pub fn sleep(&self, us: u32) {
        let start = self.now();
        let dt = self.alarm.ticks_from_us(us);
        let deadline = start.wrapping_add(dt);
        self.alarm.set_alarm(start, dt);

        // Global interrupts stay off from the deadline check until `wfi`.
        // `wfi` still wakes on the pending timer interrupt, and the trap is
        // taken once interrupts are opened again.
        self.trap.disable_interrupts();
        while self.now().within_range(start, deadline) {
            self.trap.enable_timer_interrupt();
            self.trap.wait_for_interrupt();
            self.trap.enable_interrupts();
            self.trap.disable_interrupts();
        }

        self.trap.disable_timer_interrupt();
        self.alarm.disarm();
        self.trap.enable_interrupts();
    }

    /// Point the trap vector at the timer trap handler and check that the
    /// hardware accepted it.
    pub fn install_interrupt_vector(&self) -> Result<(), TrapError> {
        let expected = self.trap.timer_trap_handler();
        self.trap.set_trap_vector(expected);

        let found = self.trap.trap_vector();
        if found != expected {
            return Err(TrapError::VectorInstallFailed { expected, found });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use kernel::hil::time::{Freq10MHz, Time};

    const HANDLER: usize = 0x8000_0100;

    struct MockClock {
        ticks: Cell<u64>,
        compare: Cell<u64>,
        /// Ticks that pass on every read of the counter.
        step: u64,
    }

    impl MockClock {
        fn new(start: u64, step: u64) -> Self {
            MockClock {
                ticks: Cell::new(start),
                compare: Cell::new(u64::MAX),
                step,
            }
        }

        fn advance(&self, ticks: u64) {
            self.ticks.set(self.ticks.get() + ticks);
        }
    }

    impl Time for MockClock {
        type Frequency = Freq10MHz;

        fn now(&self) -> Ticks64 {
            let now = self.ticks.get();
            self.advance(self.step);
            Ticks64::from(now)
        }
    }

    impl Alarm for MockClock {
        fn set_alarm(&self, reference: Ticks64, dt: Ticks64) {
            self.compare.set(reference.wrapping_add(dt).into_u64());
        }

        fn get_alarm(&self) -> Ticks64 {
            Ticks64::from(self.compare.get())
        }

        fn disarm(&self) {
            self.compare.set(u64::MAX);
        }

        fn is_armed(&self) -> bool {
            self.compare.get() != u64::MAX
        }
    }

    /// Models `mie.MTIE`, `mstatus.MIE`, `mtvec` and a hart that sleeps in
    /// `wfi` until the comparator fires.
    struct MockTrap<'a> {
        clock: &'a MockClock,
        vector: Cell<usize>,
        vector_writable: bool,
        mtie: Cell<bool>,
        mie: Cell<bool>,
        waits: Cell<u32>,
        traps_taken: Cell<u32>,
        /// Wakeups still to happen before the comparator fires.
        spurious_wakeups: Cell<u32>,
    }

    impl<'a> MockTrap<'a> {
        fn new(clock: &'a MockClock) -> Self {
            MockTrap {
                clock,
                vector: Cell::new(0),
                vector_writable: true,
                mtie: Cell::new(false),
                mie: Cell::new(true),
                waits: Cell::new(0),
                traps_taken: Cell::new(0),
                spurious_wakeups: Cell::new(0),
            }
        }

        fn timer_pending(&self) -> bool {
            self.clock.ticks.get() >= self.clock.compare.get()
        }
    }

    impl TrapControl for MockTrap<'_> {
        fn timer_trap_handler(&self) -> usize {
            HANDLER
        }

        fn set_trap_vector(&self, handler: usize) {
            if self.vector_writable {
                self.vector.set(handler);
            }
        }

        fn trap_vector(&self) -> usize {
            self.vector.get()
        }

        fn enable_timer_interrupt(&self) {
            self.mtie.set(true);
        }

        fn disable_timer_interrupt(&self) {
            self.mtie.set(false);
        }

        fn timer_interrupt_enabled(&self) -> bool {
            self.mtie.get()
        }

        fn enable_interrupts(&self) {
            self.mie.set(true);
            if self.mtie.get() && self.timer_pending() {
                // The handler: mask the timer interrupt and return.
                self.mtie.set(false);
                self.traps_taken.set(self.traps_taken.get() + 1);
            }
        }

        fn disable_interrupts(&self) {
            self.mie.set(false);
        }

        fn wait_for_interrupt(&self) {
            self.waits.set(self.waits.get() + 1);
            assert!(!self.mie.get(), "wfi entered with interrupts enabled");

            let spurious = self.spurious_wakeups.get();
            if spurious > 0 {
                self.spurious_wakeups.set(spurious - 1);
                self.clock.advance(1);
                return;
            }

            assert!(self.mtie.get(), "wfi with nothing enabled would hang");
            if !self.timer_pending() {
                self.clock.ticks.set(self.clock.compare.get());
            }
        }
    }

    #[test]
    fn sleep_lasts_until_the_deadline() {
        let clock = MockClock::new(5_000, 0);
        let trap = MockTrap::new(&clock);
        let timer = TimerService::new(&clock, &trap);

        let start = timer.now();
        timer.sleep(1_000);
        let elapsed = timer.now().wrapping_sub(start);

        assert!(elapsed >= Ticks64::from(10_000u64));
        assert!(!trap.timer_interrupt_enabled());
        assert!(trap.mie.get());
        assert!(!clock.is_armed());
        assert_eq!(trap.waits.get(), 1);
        assert_eq!(trap.traps_taken.get(), 1);
    }

    #[test]
    fn spurious_wakeups_go_back_to_sleep() {
        let clock = MockClock::new(0, 0);
        let trap = MockTrap::new(&clock);
        trap.spurious_wakeups.set(3);
        let timer = TimerService::new(&clock, &trap);

        timer.sleep(250);

        assert!(timer.now() >= Ticks64::from(2_500u64));
        assert_eq!(trap.waits.get(), 4);
        assert!(!trap.timer_interrupt_enabled());
    }

    #[test]
    fn zero_sleep_does_not_wait() {
        let clock = MockClock::new(42, 0);
        let trap = MockTrap::new(&clock);
        let timer = TimerService::new(&clock, &trap);

        timer.sleep(0);

        assert_eq!(trap.waits.get(), 0);
        assert!(!trap.timer_interrupt_enabled());
        assert!(trap.mie.get());
    }

    #[test]
    fn busy_delay_spins_for_the_duration() {
        let clock = MockClock::new(100, 7);
        let trap = MockTrap::new(&clock);
        let timer = TimerService::new(&clock, &trap);

        timer.busy_delay(10);

        assert!(clock.ticks.get() - 100 >= 100);
        assert_eq!(trap.waits.get(), 0);
    }

    #[test]
    fn ticks_are_reported_in_milliseconds() {
        let clock = MockClock::new(123_456_789, 0);
        let trap = MockTrap::new(&clock);
        let timer = TimerService::new(&clock, &trap);
        assert_eq!(timer.ticks_ms(), 12_345);

        // 2^32 ms and a bit: only the low 32 bits are kept.
        clock.ticks.set(((1u64 << 32) + 5) * 10_000);
        assert_eq!(timer.ticks_ms(), 5);
    }

    #[test]
    fn vector_install_is_verified() {
        let clock = MockClock::new(0, 0);
        let trap = MockTrap::new(&clock);
        let timer = TimerService::new(&clock, &trap);
        assert_eq!(timer.install_interrupt_vector(), Ok(()));
        assert_eq!(trap.trap_vector(), HANDLER);

        let mut stuck = MockTrap::new(&clock);
        stuck.vector_writable = false;
        let timer = TimerService::new(&clock, &stuck);
        assert_eq!(
            timer.install_interrupt_vector(),
            Err(TrapError::VectorInstallFailed {
                expected: HANDLER,
                found: 0,
            })
        );
    }
}
