// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! `ReadWriteRiscvCsr` type for RISC-V CSRs.

use core::marker::PhantomData;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::{RegisterLongName, UIntLike};

pub const MSTATUS: usize = 0x300;
pub const MIE: usize = 0x304;
pub const MTVEC: usize = 0x305;

/// Read/Write registers.
///
/// The CSR number is a const generic because the `csrr`/`csrw` family of
/// instructions only encode the register as an immediate.
pub struct ReadWriteRiscvCsr<T: UIntLike, R: RegisterLongName, const V: usize> {
    associated_register: PhantomData<R>,
    associated_length: PhantomData<T>,
}

impl<T: UIntLike, R: RegisterLongName, const V: usize> ReadWriteRiscvCsr<T, R, V> {
    pub const fn new() -> Self {
        ReadWriteRiscvCsr {
            associated_register: PhantomData,
            associated_length: PhantomData,
        }
    }

    /// The CSR number this instance accesses.
    pub const fn number(&self) -> usize {
        V
    }
}

impl<R: RegisterLongName, const V: usize> ReadWriteRiscvCsr<usize, R, V> {
    /// Atomically set the bits in `bitmask`, returning the previous value.
    #[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
    #[inline]
    pub fn read_and_set_bits(&self, bitmask: usize) -> usize {
        use core::arch::asm;
        let r: usize;
        unsafe {
            asm!("csrrs {rd}, {csr}, {rs1}",
                 rd = out(reg) r,
                 csr = const V,
                 rs1 = in(reg) bitmask,
            );
        }
        r
    }

    /// Atomically clear the bits in `bitmask`, returning the previous value.
    #[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
    #[inline]
    pub fn read_and_clear_bits(&self, bitmask: usize) -> usize {
        use core::arch::asm;
        let r: usize;
        unsafe {
            asm!("csrrc {rd}, {csr}, {rs1}",
                 rd = out(reg) r,
                 csr = const V,
                 rs1 = in(reg) bitmask,
            );
        }
        r
    }

    // Mock implementations for tests on the host.
    #[cfg(not(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none")))]
    pub fn read_and_set_bits(&self, _bitmask: usize) -> usize {
        unimplemented!("setting bits in RISC-V CSR {:#x}", V)
    }

    #[cfg(not(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none")))]
    pub fn read_and_clear_bits(&self, _bitmask: usize) -> usize {
        unimplemented!("clearing bits in RISC-V CSR {:#x}", V)
    }
}

impl<R: RegisterLongName, const V: usize> Readable for ReadWriteRiscvCsr<usize, R, V> {
    type T = usize;
    type R = R;

    #[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
    #[inline]
    fn get(&self) -> usize {
        use core::arch::asm;
        let r: usize;
        unsafe {
            asm!("csrr {rd}, {csr}", rd = out(reg) r, csr = const V);
        }
        r
    }

    #[cfg(not(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none")))]
    fn get(&self) -> usize {
        unimplemented!("reading RISC-V CSR {:#x}", V)
    }
}

impl<R: RegisterLongName, const V: usize> Writeable for ReadWriteRiscvCsr<usize, R, V> {
    type T = usize;
    type R = R;

    #[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
    #[inline]
    fn set(&self, val_to_set: usize) {
        use core::arch::asm;
        unsafe {
            asm!("csrw {csr}, {rs}", rs = in(reg) val_to_set, csr = const V);
        }
    }

    #[cfg(not(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none")))]
    fn set(&self, _val_to_set: usize) {
        unimplemented!("writing RISC-V CSR {:#x}", V)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csr_number_is_carried_in_the_type() {
        let mie = ReadWriteRiscvCsr::<usize, (), MIE>::new();
        let mtvec = ReadWriteRiscvCsr::<usize, (), MTVEC>::new();
        assert_eq!(mie.number(), 0x304);
        assert_eq!(mtvec.number(), 0x305);
    }
}
