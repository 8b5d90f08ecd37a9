// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Tock Register interface for using CSR registers.
//!
//! Off target (`cfg(not(target_os = "none"))`) every access is a host mock
//! that panics, so only code paths that never touch a CSR can be unit tested.

use riscv_csr::csr::{ReadWriteRiscvCsr, MIE, MSTATUS, MTVEC};

pub mod mie;
pub mod mstatus;
pub mod mtvec;

pub struct CSR {
    pub mie: ReadWriteRiscvCsr<usize, mie::mie::Register, MIE>,
    pub mtvec: ReadWriteRiscvCsr<usize, mtvec::mtvec::Register, MTVEC>,
    pub mstatus: ReadWriteRiscvCsr<usize, mstatus::mstatus::Register, MSTATUS>,
}

// Define the "addresses" of each CSR register.
pub const CSR: &CSR = &CSR {
    mie: ReadWriteRiscvCsr::new(),
    mtvec: ReadWriteRiscvCsr::new(),
    mstatus: ReadWriteRiscvCsr::new(),
};
