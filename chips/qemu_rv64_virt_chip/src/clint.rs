// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Machine Timer instantiation.

use kernel::hil::time::Freq10MHz;
use kernel::utilities::StaticRef;
use riscv::machine_timer::{MachineTimer, MachineTimerRegisters};

pub const CLINT_BASE: StaticRef<MachineTimerRegisters> =
    unsafe { StaticRef::new(0x0200_0000 as *const MachineTimerRegisters) };

/// QEMU's `virt` machine drives `mtime` at 10 MHz.
pub type QemuRv64VirtClint = MachineTimer<Freq10MHz>;
