// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! QEMU's `sifive_test` system controller, used to power off or reset the
//! machine.

use kernel::platform::power::PowerControl;
use kernel::utilities::registers::interfaces::Writeable;
use kernel::utilities::registers::{register_structs, WriteOnly};
use kernel::utilities::StaticRef;

pub const SYSCON_BASE: StaticRef<SysconRegisters> =
    unsafe { StaticRef::new(0x0010_0000 as *const SysconRegisters) };

register_structs! {
    pub SysconRegisters {
        (0x0 => control: WriteOnly<u32>),
        (0x4 => @END),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SysconCommand {
    PowerOff = 0x5555,
    Reboot = 0x7777,
}

pub struct Syscon {
    regs: StaticRef<SysconRegisters>,
}

impl Syscon {
    pub const fn new(regs: StaticRef<SysconRegisters>) -> Syscon {
        Syscon { regs }
    }

    /// Write `command` to the controller. On QEMU this does not return.
    pub fn request(&self, command: SysconCommand) {
        self.regs.control.set(command as u32);
    }

    fn request_and_halt(&self, command: SysconCommand) -> ! {
        self.request(command);
        loop {
            core::hint::spin_loop();
        }
    }
}

impl PowerControl for Syscon {
    fn poweroff(&self) -> ! {
        self.request_and_halt(SysconCommand::PowerOff)
    }

    fn reboot(&self) -> ! {
        self.request_and_halt(SysconCommand::Reboot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::boxed::Box;

    #[test]
    fn commands_reach_the_control_register() {
        let word: *mut u32 = Box::leak(Box::new(0u32));
        let syscon = Syscon::new(unsafe { StaticRef::new(word as *const SysconRegisters) });

        syscon.request(SysconCommand::Reboot);
        assert_eq!(unsafe { word.read_volatile() }, 0x7777);
        syscon.request(SysconCommand::PowerOff);
        assert_eq!(unsafe { word.read_volatile() }, 0x5555);
    }
}
