// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware agnostic interfaces for time and alarms.
//!
//! The machine timer counts a free-running 64-bit value that never wraps in
//! practice, so ticks are represented as [`Ticks64`]. Arithmetic on ticks is
//! still wrapping so that a deadline computed near the end of the range
//! behaves like the hardware comparator does.

use core::fmt;

/// Trait to represent clock frequency in Hz
///
/// This trait is used as an associated type for `Time` so clients can portably
/// convert native cycles to real-time values.
pub trait Frequency {
    /// Returns frequency in Hz.
    fn frequency() -> u32;
}

/// 10MHz `Frequency`
#[derive(Debug)]
pub struct Freq10MHz;
impl Frequency for Freq10MHz {
    fn frequency() -> u32 {
        10_000_000
    }
}

/// A 64-bit tick count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticks64(u64);

impl Ticks64 {
    pub const ZERO: Ticks64 = Ticks64(0);

    pub fn into_u64(self) -> u64 {
        self.0
    }

    pub fn wrapping_add(self, other: Self) -> Self {
        Ticks64(self.0.wrapping_add(other.0))
    }

    pub fn wrapping_sub(self, other: Self) -> Self {
        Ticks64(self.0.wrapping_sub(other.0))
    }

    /// Returns whether `self` lies in the half-open interval `[start, end)`,
    /// accounting for wraparound.
    pub fn within_range(self, start: Self, end: Self) -> bool {
        self.wrapping_sub(start).0 < end.wrapping_sub(start).0
    }
}

impl From<u64> for Ticks64 {
    fn from(val: u64) -> Self {
        Ticks64(val)
    }
}

impl From<u32> for Ticks64 {
    fn from(val: u32) -> Self {
        Ticks64(val as u64)
    }
}

impl fmt::Display for Ticks64 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A free-running time source.
pub trait Time {
    /// The number of ticks per second.
    type Frequency: Frequency;

    /// Returns the current time in hardware clock units.
    fn now(&self) -> Ticks64;
}

/// A single hardware comparator that raises an interrupt once `now()`
/// reaches the programmed value.
///
/// There is no client callback: the interrupt only wakes the hart from
/// `wfi`, and callers re-check the time themselves.
pub trait Alarm: Time {
    /// Arm the comparator to fire at `reference + dt`.
    ///
    /// Passing `reference = now()` programs a relative delay. The deadline is
    /// computed with wrapping arithmetic.
    fn set_alarm(&self, reference: Ticks64, dt: Ticks64);

    /// The currently programmed deadline.
    fn get_alarm(&self) -> Ticks64;

    /// Push the comparator out of reach so it never fires.
    fn disarm(&self);

    /// Whether the comparator holds a reachable deadline.
    fn is_armed(&self) -> bool;
}

/// Conversion between ticks and real time, available for every `Time`.
pub trait ConvertTicks {
    /// Ticks in `us` microseconds.
    fn ticks_from_us(&self, us: u32) -> Ticks64;

    /// Ticks in `ms` milliseconds.
    fn ticks_from_ms(&self, ms: u32) -> Ticks64;

    /// Whole milliseconds in `ticks`, rounded down.
    fn ticks_to_ms(&self, ticks: Ticks64) -> u64;
}

impl<T: Time + ?Sized> ConvertTicks for T {
    fn ticks_from_us(&self, us: u32) -> Ticks64 {
        let hz = <T::Frequency>::frequency() as u64;
        Ticks64::from((us as u64 * hz) / 1_000_000)
    }

    fn ticks_from_ms(&self, ms: u32) -> Ticks64 {
        let hz = <T::Frequency>::frequency() as u64;
        Ticks64::from((ms as u64 * hz) / 1_000)
    }

    fn ticks_to_ms(&self, ticks: Ticks64) -> u64 {
        let hz = <T::Frequency>::frequency() as u64;
        ticks.into_u64() / (hz / 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct FixedClock(Cell<u64>);

    impl Time for FixedClock {
        type Frequency = Freq10MHz;
        fn now(&self) -> Ticks64 {
            Ticks64::from(self.0.get())
        }
    }

    #[test]
    fn conversions_at_10mhz() {
        let clock = FixedClock(Cell::new(0));
        assert_eq!(clock.ticks_from_us(1), Ticks64::from(10u64));
        assert_eq!(clock.ticks_from_us(1000), Ticks64::from(10_000u64));
        assert_eq!(clock.ticks_from_ms(80), Ticks64::from(800_000u64));
        assert_eq!(clock.ticks_to_ms(Ticks64::from(10_000u64)), 1);
        assert_eq!(clock.ticks_to_ms(Ticks64::from(9_999u64)), 0);
    }

    #[test]
    fn range_check_handles_wraparound() {
        let start = Ticks64::from(u64::MAX - 5);
        let end = start.wrapping_add(Ticks64::from(10u64));
        assert!(Ticks64::from(u64::MAX).within_range(start, end));
        assert!(Ticks64::from(2u64).within_range(start, end));
        assert!(!end.within_range(start, end));
        assert!(!Ticks64::from(100u64).within_range(start, end));
    }
}
