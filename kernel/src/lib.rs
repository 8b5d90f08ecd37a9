// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Core runtime kernel
//!
//! The kernel crate holds the pieces shared by the chip, capsule and board
//! crates of the doomgeneric runtime: the Hardware Interface Layer (HIL)
//! traits, the trap-control interface implemented by the architecture crate,
//! debug output, compile-time configuration and small utilities such as
//! `StaticRef` and `static_init!`.
//!
//! Most `unsafe` code outside of the architecture crate is in this crate.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
#[macro_use]
pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod platform;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
