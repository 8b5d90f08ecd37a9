// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Machine-mode trap entry for the timer interrupt.
//!
//! The runtime takes exactly one kind of trap: the machine timer interrupt
//! that ends a `wfi` inside a timed sleep. The handler masks `mie.MTIE` and
//! returns. Nothing else is saved because the handler only uses `t0`, which
//! it parks in `mscratch`.

use kernel::platform::trap::TrapControl;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::csr::mie::mie;
use crate::csr::mstatus::mstatus;
use crate::csr::{self, mtvec};
use crate::support;

#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
extern "C" {
    fn _timer_trap();
}

// `mtvec` in direct mode ignores the low two address bits, so the entry must
// be 4-byte aligned to read back unchanged.
#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
core::arch::global_asm!(
    "
    .section .text._timer_trap, \"ax\"
    .globl _timer_trap
    .p2align 2
  _timer_trap:
    csrw mscratch, t0
    li   t0, 0x80
    csrc mie, t0
    csrr t0, mscratch
    mret
    "
);

#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
fn timer_trap_address() -> usize {
    _timer_trap as usize
}

// Mock implementation for tests on the host.
#[cfg(not(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none")))]
fn timer_trap_address() -> usize {
    unimplemented!()
}

/// `TrapControl` backed by the hart's own `mtvec`, `mie` and `mstatus`.
pub struct MachineTrap {}

impl MachineTrap {
    pub const fn new() -> Self {
        MachineTrap {}
    }
}

impl TrapControl for MachineTrap {
    fn timer_trap_handler(&self) -> usize {
        timer_trap_address()
    }

    fn set_trap_vector(&self, handler: usize) {
        csr::CSR.mtvec.set(mtvec::direct_mode(handler).get());
    }

    fn trap_vector(&self) -> usize {
        // Raw value, mode bits included: a vector left in vectored mode must
        // not compare equal to the handler address.
        csr::CSR.mtvec.get()
    }

    fn enable_timer_interrupt(&self) {
        csr::CSR.mie.modify(mie::mtimer::SET);
    }

    fn disable_timer_interrupt(&self) {
        csr::CSR.mie.modify(mie::mtimer::CLEAR);
    }

    fn timer_interrupt_enabled(&self) -> bool {
        csr::CSR.mie.is_set(mie::mtimer)
    }

    fn enable_interrupts(&self) {
        csr::CSR.mstatus.modify(mstatus::mie::SET);
    }

    fn disable_interrupts(&self) {
        csr::CSR.mstatus.modify(mstatus::mie::CLEAR);
    }

    fn wait_for_interrupt(&self) {
        unsafe {
            support::wfi();
        }
    }
}
