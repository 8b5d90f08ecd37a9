// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use core::panic::PanicInfo;

use kernel::debug;
use kernel::platform::power::PowerControl;
use qemu_rv64_virt_chip::syscon::{Syscon, SYSCON_BASE};
use qemu_rv64_virt_chip::uart::{Uart16550, UART0_BASE};

/// Panic handler.
///
/// Writes straight to the UART so that a panic during boot, before a debug
/// writer is registered, still gets reported.
#[cfg(not(test))]
#[panic_handler]
pub fn panic_fmt(pi: &PanicInfo) -> ! {
    let uart = Uart16550::new(UART0_BASE);
    debug::panic_print(&uart, pi);

    // The system is no longer in a well-defined state.
    Syscon::new(SYSCON_BASE).poweroff()
}
