// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interface to the trap vector and the interrupt enables it depends on.
//!
//! The only interrupt the runtime takes is the machine timer interrupt. Its
//! handler does nothing except mask the timer interrupt again, so that a
//! hart parked in `wfi` resumes exactly once per programmed deadline.

use core::fmt;

/// Errors from installing the trap vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapError {
    /// The trap vector register did not read back the handler address.
    VectorInstallFailed { expected: usize, found: usize },
}

impl fmt::Display for TrapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrapError::VectorInstallFailed { expected, found } => write!(
                f,
                "trap vector install failed: wrote {:#x}, read back {:#x}",
                expected, found
            ),
        }
    }
}

/// Control over the trap vector and the machine timer interrupt.
pub trait TrapControl {
    /// Address of the timer trap handler this implementation installs.
    fn timer_trap_handler(&self) -> usize;

    /// Point the trap vector at `handler` in direct mode.
    fn set_trap_vector(&self, handler: usize);

    /// Address currently held by the trap vector register.
    fn trap_vector(&self) -> usize;

    /// Unmask the machine timer interrupt.
    fn enable_timer_interrupt(&self);

    /// Mask the machine timer interrupt.
    fn disable_timer_interrupt(&self);

    /// Whether the machine timer interrupt is currently unmasked.
    fn timer_interrupt_enabled(&self) -> bool;

    /// Set the global machine interrupt enable.
    fn enable_interrupts(&self);

    /// Clear the global machine interrupt enable. `wfi` still returns once an
    /// unmasked interrupt is pending, but the trap is only taken after
    /// [`TrapControl::enable_interrupts`].
    fn disable_interrupts(&self);

    /// Park the hart until an interrupt is pending.
    fn wait_for_interrupt(&self);
}
