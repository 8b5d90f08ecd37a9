// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Create a timer using the Machine Timer registers.

use core::marker::PhantomData;

use kernel::hil::time::{self, Frequency, Ticks64, Time};
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_structs, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    pub MachineTimerRegisters {
        (0x0000 => _reserved),
        (0x4000 => compare: ReadWrite<u64>),
        (0x4008 => _reserved2),
        (0xBFF8 => value: ReadWrite<u64>),
        (0xC000 => @END),
    }
}

/// Comparator value that can never be reached.
const DISARMED: u64 = u64::MAX;

/// The `mtime`/`mtimecmp` pair of hart 0, counting at `F`.
///
/// On RV64 both registers are accessed with single 64-bit loads and stores,
/// so no torn-read handling is needed.
pub struct MachineTimer<F: Frequency> {
    registers: StaticRef<MachineTimerRegisters>,
    _frequency: PhantomData<F>,
}

impl<F: Frequency> MachineTimer<F> {
    pub const fn new(base: StaticRef<MachineTimerRegisters>) -> Self {
        MachineTimer {
            registers: base,
            _frequency: PhantomData,
        }
    }
}

impl<F: Frequency> Time for MachineTimer<F> {
    type Frequency = F;

    fn now(&self) -> Ticks64 {
        Ticks64::from(self.registers.value.get())
    }
}

impl<F: Frequency> time::Alarm for MachineTimer<F> {
    fn set_alarm(&self, reference: Ticks64, dt: Ticks64) {
        let now = self.now();
        let mut expire = reference.wrapping_add(dt);

        // A deadline that has already passed fires immediately.
        if !now.within_range(reference, expire) {
            expire = now;
        }

        self.registers.compare.set(expire.into_u64());
    }

    fn get_alarm(&self) -> Ticks64 {
        Ticks64::from(self.registers.compare.get())
    }

    fn disarm(&self) {
        self.registers.compare.set(DISARMED);
    }

    fn is_armed(&self) -> bool {
        self.registers.compare.get() != DISARMED
    }
}
