// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Interface for keyboard key presses.
//!
//! Input drivers expose raw events through [`KeyEventSource`] (an evdev style
//! `type`/`code`/`value` triple) or raw bytes through
//! [`uart::Receive`](crate::hil::uart::Receive). Key translators turn either
//! into [`KeyTransition`]s carrying engine key codes, which is what the game
//! loop consumes via [`KeyInput`].

/// Event type of a synchronization marker.
pub const EV_SYN: u16 = 0x00;
/// Event type of a key press, release or repeat.
pub const EV_KEY: u16 = 0x01;
/// Event type of a relative axis movement.
pub const EV_REL: u16 = 0x02;
/// Event type of an absolute axis position.
pub const EV_ABS: u16 = 0x03;
/// Event type of a miscellaneous report such as a raw scan code.
pub const EV_MSC: u16 = 0x04;

/// `value` of an `EV_KEY` event for a release.
pub const KEY_VALUE_RELEASED: u32 = 0;
/// `value` of an `EV_KEY` event for a press.
pub const KEY_VALUE_PRESSED: u32 = 1;

/// A raw input event as delivered by an input device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: u32,
}

impl InputEvent {
    pub const fn new(event_type: u16, code: u16, value: u32) -> Self {
        InputEvent {
            event_type,
            code,
            value,
        }
    }

    pub fn is_key(&self) -> bool {
        self.event_type == EV_KEY
    }
}

/// A press or release of a single engine key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyTransition {
    pub pressed: bool,
    /// Engine key code, never zero.
    pub key: u8,
}

impl KeyTransition {
    pub const fn pressed(key: u8) -> Self {
        KeyTransition { pressed: true, key }
    }

    pub const fn released(key: u8) -> Self {
        KeyTransition {
            pressed: false,
            key,
        }
    }
}

/// How an `EV_KEY` event whose value is neither press nor release (an
/// autorepeat, value 2) is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRepeatPolicy {
    /// Report every repeat as another press of the same key.
    ReportAsPressed,
    /// Drop repeats entirely.
    Suppress,
}

/// A device that queues raw input events.
pub trait KeyEventSource {
    /// Return the next completed event, if any, without blocking.
    fn poll_event(&self) -> Option<InputEvent>;
}

/// A source of engine key transitions.
pub trait KeyInput {
    /// Return the next key transition, or `None` if there is none right now.
    fn poll_key(&self) -> Option<KeyTransition>;
}
