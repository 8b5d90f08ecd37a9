// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Key transitions from a serial console.
//!
//! A terminal only sends bytes, and only while a key is down (typematic
//! repeat). Presses are reported for the first byte of a key, releases are
//! synthesized once the key has not been seen for [`RELEASE_TIMEOUT_MS`], or
//! as soon as a different key shows up. In the latter case the press of the
//! new key is held back until the next poll, so that the engine sees the
//! release first.

use core::cell::Cell;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::keyboard::{KeyInput, KeyTransition};
use kernel::hil::time::{ConvertTicks, Ticks64, Time};
use kernel::hil::uart;

use super::keymap::serial_byte_to_key;

/// How long a key counts as held after its last byte.
pub const RELEASE_TIMEOUT_MS: u32 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HeldKey {
    Idle,
    Held { key: u8, last_seen: Ticks64 },
}

pub struct SerialKeyTranslator<'a, U: uart::Receive, T: Time> {
    uart: &'a U,
    clock: &'a T,
    state: Cell<HeldKey>,
    pending: Cell<Option<u8>>,
}

impl<'a, U: uart::Receive, T: Time> SerialKeyTranslator<'a, U, T> {
    pub fn new(uart: &'a U, clock: &'a T) -> SerialKeyTranslator<'a, U, T> {
        SerialKeyTranslator {
            uart,
            clock,
            state: Cell::new(HeldKey::Idle),
            pending: Cell::new(None),
        }
    }

    /// Empty the receive FIFO and keep the most recent byte.
    fn last_received_byte(&self) -> Option<u8> {
        let mut last = None;
        while let Some(byte) = self.uart.receive_byte() {
            last = Some(byte);
        }
        last
    }

    fn next_transition(&self) -> Option<KeyTransition> {
        let now = self.clock.now();

        if let Some(key) = self.pending.take() {
            self.state.set(HeldKey::Held {
                key,
                last_seen: now,
            });
            return Some(KeyTransition::pressed(key));
        }

        let received = self.last_received_byte().and_then(serial_byte_to_key);

        match (self.state.get(), received) {
            (HeldKey::Idle, None) => None,
            (HeldKey::Idle, Some(key)) => {
                self.state.set(HeldKey::Held {
                    key,
                    last_seen: now,
                });
                Some(KeyTransition::pressed(key))
            }
            (HeldKey::Held { key, .. }, Some(new_key)) if new_key == key => {
                self.state.set(HeldKey::Held {
                    key,
                    last_seen: now,
                });
                None
            }
            (HeldKey::Held { key, .. }, Some(new_key)) => {
                self.state.set(HeldKey::Idle);
                self.pending.set(Some(new_key));
                Some(KeyTransition::released(key))
            }
            (HeldKey::Held { key, last_seen }, None) => {
                let timeout = self.clock.ticks_from_ms(RELEASE_TIMEOUT_MS);
                if now.wrapping_sub(last_seen) >= timeout {
                    self.state.set(HeldKey::Idle);
                    Some(KeyTransition::released(key))
                } else {
                    None
                }
            }
        }
    }
}

impl<U: uart::Receive, T: Time> KeyInput for SerialKeyTranslator<'_, U, T> {
    fn poll_key(&self) -> Option<KeyTransition> {
        let transition = self.next_transition();
        if CONFIG.trace_input_events {
            if let Some(t) = transition {
                debug!("serial key {:#x} pressed={}", t.key, t.pressed);
            }
        }
        transition
    }
}
