// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Data structure for storing compile-time configuration options.
//!
//! Configuration lives in a `const` object rather than being spread across
//! `#[cfg(feature = ...)]` blocks. Cargo features are only used to choose the
//! values of the fields below, so every code path is type-checked by the
//! compiler even when it ends up disabled. After type-checking, the compiler
//! folds the constants, so a boolean condition used in an `if` block has no
//! cost in the resulting binary.

use crate::hil::keyboard::KeyRepeatPolicy;

/// Data structure holding compile-time configuration options.
///
/// To change the configuration, modify the relevant values in the `CONFIG`
/// constant object defined at the end of this file, or enable the matching
/// kernel crate feature from the board crate.
pub struct Config {
    /// Whether input drivers should trace every raw event and every key
    /// transition they report to the debug output.
    pub trace_input_events: bool,

    /// Whether the panic handler should print the panic message and location.
    ///
    /// Disabling this removes the formatting machinery for panics from the
    /// binary.
    pub debug_panics: bool,

    /// How a key event whose value is neither press (1) nor release (0) is
    /// reported by the event-based key translator.
    pub key_repeat: KeyRepeatPolicy,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined. These options are available in the kernel crate to be used for
/// relevant configuration. Notably, this is the only location in the kernel
/// crate where we permit `#[cfg(x)]` to be used to configure code based on
/// Cargo features.
pub const CONFIG: Config = Config {
    trace_input_events: cfg!(feature = "trace_input"),
    debug_panics: !cfg!(feature = "no_debug_panics"),
    key_repeat: if cfg!(feature = "suppress_key_repeat") {
        KeyRepeatPolicy::Suppress
    } else {
        KeyRepeatPolicy::ReportAsPressed
    },
};
