// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Key transitions from an evdev style event source such as virtio-input.

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::keyboard::{
    KeyEventSource, KeyInput, KeyRepeatPolicy, KeyTransition, KEY_VALUE_PRESSED,
    KEY_VALUE_RELEASED,
};

use super::keymap::scancode_to_key;

pub struct EventKeyTranslator<'a, S: KeyEventSource> {
    source: &'a S,
    repeat: KeyRepeatPolicy,
}

impl<'a, S: KeyEventSource> EventKeyTranslator<'a, S> {
    /// A translator using the repeat policy from the kernel configuration.
    pub fn new(source: &'a S) -> EventKeyTranslator<'a, S> {
        Self::with_repeat_policy(source, CONFIG.key_repeat)
    }

    pub fn with_repeat_policy(source: &'a S, repeat: KeyRepeatPolicy) -> EventKeyTranslator<'a, S> {
        EventKeyTranslator { source, repeat }
    }
}

impl<S: KeyEventSource> KeyInput for EventKeyTranslator<'_, S> {
    /// Consume events until one maps to an engine key. Non-key events and
    /// keys without a mapping are dropped on the way.
    fn poll_key(&self) -> Option<KeyTransition> {
        while let Some(event) = self.source.poll_event() {
            if !event.is_key() {
                continue;
            }
            let Some(key) = scancode_to_key(event.code) else {
                continue;
            };

            let pressed = match event.value {
                KEY_VALUE_RELEASED => false,
                KEY_VALUE_PRESSED => true,
                _ => match self.repeat {
                    KeyRepeatPolicy::ReportAsPressed => true,
                    KeyRepeatPolicy::Suppress => continue,
                },
            };

            if CONFIG.trace_input_events {
                debug!("input key {:#x} pressed={}", key, pressed);
            }
            return Some(KeyTransition { pressed, key });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::keymap::{KEY_ESCAPE, KEY_FIRE, KEY_UPARROW};
    use core::cell::RefCell;
    use kernel::hil::keyboard::{InputEvent, EV_KEY, EV_MSC, EV_SYN};
    use std::collections::VecDeque;

    struct FakeEvents {
        queue: RefCell<VecDeque<InputEvent>>,
    }

    impl FakeEvents {
        fn new(events: &[InputEvent]) -> Self {
            FakeEvents {
                queue: RefCell::new(events.iter().copied().collect()),
            }
        }

        fn remaining(&self) -> usize {
            self.queue.borrow().len()
        }
    }

    impl KeyEventSource for FakeEvents {
        fn poll_event(&self) -> Option<InputEvent> {
            self.queue.borrow_mut().pop_front()
        }
    }

    fn key(code: u16, value: u32) -> InputEvent {
        InputEvent::new(EV_KEY, code, value)
    }

    #[test]
    fn press_and_release_are_translated() {
        let events = FakeEvents::new(&[key(1, 1), key(1, 0)]);
        let translator = EventKeyTranslator::new(&events);
        assert_eq!(
            translator.poll_key(),
            Some(KeyTransition::pressed(KEY_ESCAPE))
        );
        assert_eq!(
            translator.poll_key(),
            Some(KeyTransition::released(KEY_ESCAPE))
        );
        assert_eq!(translator.poll_key(), None);
    }

    #[test]
    fn non_key_events_are_skipped() {
        let events = FakeEvents::new(&[
            InputEvent::new(EV_MSC, 4, 0x1d),
            key(0x1d, 1),
            InputEvent::new(EV_SYN, 0, 0),
        ]);
        let translator = EventKeyTranslator::new(&events);
        assert_eq!(translator.poll_key(), Some(KeyTransition::pressed(KEY_FIRE)));
        assert_eq!(events.remaining(), 1);
        assert_eq!(translator.poll_key(), None);
        assert_eq!(events.remaining(), 0);
    }

    #[test]
    fn unmapped_codes_are_dropped() {
        // 0x00 has no mapping and 0x200 is outside the table.
        let events = FakeEvents::new(&[key(0x00, 1), key(0x200, 1), key(0x67, 1)]);
        let translator = EventKeyTranslator::new(&events);
        assert_eq!(
            translator.poll_key(),
            Some(KeyTransition::pressed(KEY_UPARROW))
        );
        assert_eq!(translator.poll_key(), None);
    }

    #[test]
    fn repeats_follow_the_policy() {
        let events = FakeEvents::new(&[key(0x67, 2), key(0x67, 0)]);
        let translator =
            EventKeyTranslator::with_repeat_policy(&events, KeyRepeatPolicy::ReportAsPressed);
        assert_eq!(
            translator.poll_key(),
            Some(KeyTransition::pressed(KEY_UPARROW))
        );

        let events = FakeEvents::new(&[key(0x67, 2), key(0x67, 0)]);
        let translator =
            EventKeyTranslator::with_repeat_policy(&events, KeyRepeatPolicy::Suppress);
        assert_eq!(
            translator.poll_key(),
            Some(KeyTransition::released(KEY_UPARROW))
        );
    }
}
