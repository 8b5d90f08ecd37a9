// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interface for ending execution of the whole machine.

/// Machine-wide power control.
///
/// There is no supervisor to return to, so both operations diverge. A chip
/// that cannot reach its power controller spins forever instead.
pub trait PowerControl {
    /// Turn the machine off.
    fn poweroff(&self) -> !;

    /// Reset the machine.
    fn reboot(&self) -> !;
}
