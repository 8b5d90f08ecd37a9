// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Shared support for RISC-V machine-mode targets.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod csr;
pub mod machine_timer;
pub mod support;
pub mod trap;

// Default to 32 bit if no architecture is specified or if this is being
// compiled for testing on a different architecture.
#[cfg(not(target_arch = "riscv64"))]
pub const XLEN: usize = 32;

#[cfg(target_arch = "riscv64")]
pub const XLEN: usize = 64;

#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
extern "C" {
    // Boundaries of the .bss section.
    static mut _szero: usize;
    static mut _ezero: usize;
}

/// Entry point of the image (`_start`).
///
/// Sets up the global pointer and the stack from symbols of the linker
/// script, parks every hart but hart 0, and jumps to `reset_handler`, which
/// the board defines.
#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
core::arch::global_asm!(
    "
    .section .riscv.start, \"ax\"
    .globl _start
  _start:
    .cfi_startproc
    .cfi_undefined ra

    // Linker relaxation must not turn this into `mv gp, gp`.
    .option push
    .option norelax
    la   gp, __global_pointer$
    .option pop

    csrr t0, mhartid
    bnez t0, 200f

    la   sp, _estack
    mv   s0, sp
    j    reset_handler

  200:
    wfi
    j    200b
    .cfi_endproc
    "
);

/// Zero the .bss section.
///
/// QEMU loads the image straight into RAM, so .data needs no relocation.
///
/// # Safety
///
/// Must be called once, before anything reads a zero-initialized static.
#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
pub unsafe fn init_memory() {
    let mut pdest = core::ptr::addr_of_mut!(_szero);
    let pend = core::ptr::addr_of_mut!(_ezero);
    while pdest < pend {
        pdest.write_volatile(0);
        pdest = pdest.add(1);
    }
}

// Mock implementation for tests on the host.
#[cfg(not(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none")))]
pub unsafe fn init_memory() {
    unimplemented!()
}
