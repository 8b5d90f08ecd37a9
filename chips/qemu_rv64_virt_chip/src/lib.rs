// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Chip support for the qemu-system-riscv64 virt machine

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub use virtio;

pub mod virtio_mmio;

pub mod chip;
pub mod clint;
pub mod fw_cfg;
pub mod ramfb;
pub mod syscon;
pub mod uart;
