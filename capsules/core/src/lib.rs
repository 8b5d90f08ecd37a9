// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

#![forbid(unsafe_code)]
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod keyboard;
pub mod timer_service;
