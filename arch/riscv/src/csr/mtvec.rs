// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use kernel::utilities::registers::{register_bitfields, LocalRegisterCopy};

// mtvec contains the address(es) of the trap handler
register_bitfields![usize,
    pub mtvec [
        trap_addr OFFSET(2) NUMBITS(crate::XLEN - 2) [],
        mode OFFSET(0) NUMBITS(2) [
            Direct = 0,
            Vectored = 1
        ]
    ]
];

/// Encode `handler` as a direct-mode `mtvec` value.
///
/// The low two bits of the address are dropped, so `handler` must be
/// 4-byte aligned for the register to read back unchanged.
pub fn direct_mode(handler: usize) -> LocalRegisterCopy<usize, mtvec::Register> {
    let mut value = LocalRegisterCopy::new(0);
    value.modify(mtvec::trap_addr.val(handler >> 2) + mtvec::mode::Direct);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_mode_round_trips_aligned_handlers() {
        let value = direct_mode(0x8000_0104);
        assert_eq!(value.get(), 0x8000_0104);
        assert_eq!(value.read(mtvec::trap_addr) << 2, 0x8000_0104);
        assert!(value.matches_all(mtvec::mode::Direct));
    }

    #[test]
    fn direct_mode_drops_misaligned_low_bits() {
        let value = direct_mode(0x8000_0106);
        assert_eq!(value.read(mtvec::trap_addr) << 2, 0x8000_0104);
        assert_ne!(value.get(), 0x8000_0106);
    }
}
