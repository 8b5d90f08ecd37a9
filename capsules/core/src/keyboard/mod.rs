// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Keyboard input for the game loop.
//!
//! The board picks one input source at build time and wraps the matching
//! translator in a [`KeyEventTranslator`], which is all the host callbacks
//! see.

use kernel::hil::keyboard::{KeyEventSource, KeyInput, KeyTransition};
use kernel::hil::time::Time;
use kernel::hil::uart;

pub mod event;
pub mod keymap;
pub mod serial;

pub use event::EventKeyTranslator;
pub use serial::SerialKeyTranslator;

/// Where key presses come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    /// A virtio-input keyboard.
    VirtIO,
    /// Bytes typed on the serial console.
    Serial,
}

pub enum KeyEventTranslator<'a, U: uart::Receive, T: Time, S: KeyEventSource> {
    Serial(SerialKeyTranslator<'a, U, T>),
    Event(EventKeyTranslator<'a, S>),
}

impl<U: uart::Receive, T: Time, S: KeyEventSource> KeyEventTranslator<'_, U, T, S> {
    pub fn source(&self) -> InputSource {
        match self {
            KeyEventTranslator::Serial(_) => InputSource::Serial,
            KeyEventTranslator::Event(_) => InputSource::VirtIO,
        }
    }
}

impl<U: uart::Receive, T: Time, S: KeyEventSource> KeyInput for KeyEventTranslator<'_, U, T, S> {
    fn poll_key(&self) -> Option<KeyTransition> {
        match self {
            KeyEventTranslator::Serial(translator) => translator.poll_key(),
            KeyEventTranslator::Event(translator) => translator.poll_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use kernel::hil::keyboard::{InputEvent, EV_KEY};
    use kernel::hil::time::{Freq10MHz, Ticks64};

    struct OneByte(Cell<Option<u8>>);

    impl uart::Receive for OneByte {
        fn receive_byte(&self) -> Option<u8> {
            self.0.take()
        }
    }

    struct Stopped;

    impl Time for Stopped {
        type Frequency = Freq10MHz;

        fn now(&self) -> Ticks64 {
            Ticks64::ZERO
        }
    }

    struct OneEvent(Cell<Option<InputEvent>>);

    impl KeyEventSource for OneEvent {
        fn poll_event(&self) -> Option<InputEvent> {
            self.0.take()
        }
    }

    #[test]
    fn variants_dispatch_to_their_translator() {
        let uart = OneByte(Cell::new(Some(b'q')));
        let events = OneEvent(Cell::new(Some(InputEvent::new(EV_KEY, 0x10, 1))));

        let serial: KeyEventTranslator<OneByte, Stopped, OneEvent> =
            KeyEventTranslator::Serial(SerialKeyTranslator::new(&uart, &Stopped));
        assert_eq!(serial.source(), InputSource::Serial);
        assert_eq!(serial.poll_key(), Some(KeyTransition::pressed(b'q')));

        let virtio: KeyEventTranslator<OneByte, Stopped, OneEvent> =
            KeyEventTranslator::Event(EventKeyTranslator::new(&events));
        assert_eq!(virtio.source(), InputSource::VirtIO);
        assert_eq!(virtio.poll_key(), Some(KeyTransition::pressed(b'q')));
        assert_eq!(virtio.poll_key(), None);
    }
}
