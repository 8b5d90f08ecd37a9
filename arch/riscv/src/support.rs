// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Core low-level operations.

#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
#[inline(always)]
/// WFI instruction
pub unsafe fn wfi() {
    use core::arch::asm;
    asm!("wfi", options(nomem, nostack));
}

// Mock implementation for tests on the host.
#[cfg(not(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none")))]
/// WFI instruction (mock)
pub unsafe fn wfi() {
    unimplemented!()
}
