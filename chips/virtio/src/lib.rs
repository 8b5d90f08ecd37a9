// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! VirtIO support for the doomgeneric runtime.
//!
//! Only what the input path needs is implemented: the MMIO transport (version
//! 2), fixed-size split virtqueues driven by polling, and the virtio-input
//! device driver.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod devices;
pub mod queues;
pub mod transports;
