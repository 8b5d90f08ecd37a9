// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Engine key codes and the tables mapping raw input onto them.
//!
//! Printable keys are plain lower case ASCII. Everything else uses the
//! engine's extended codes below.

pub const KEY_RIGHTARROW: u8 = 0xae;
pub const KEY_LEFTARROW: u8 = 0xac;
pub const KEY_UPARROW: u8 = 0xad;
pub const KEY_DOWNARROW: u8 = 0xaf;
pub const KEY_STRAFE_L: u8 = 0xa0;
pub const KEY_STRAFE_R: u8 = 0xa1;
pub const KEY_USE: u8 = 0xa2;
pub const KEY_FIRE: u8 = 0xa3;
pub const KEY_ESCAPE: u8 = 27;
pub const KEY_ENTER: u8 = 13;
pub const KEY_TAB: u8 = 9;
pub const KEY_F1: u8 = 0x80 + 0x3b;
pub const KEY_F2: u8 = 0x80 + 0x3c;
pub const KEY_F3: u8 = 0x80 + 0x3d;
pub const KEY_F4: u8 = 0x80 + 0x3e;
pub const KEY_F5: u8 = 0x80 + 0x3f;
pub const KEY_F6: u8 = 0x80 + 0x40;
pub const KEY_F7: u8 = 0x80 + 0x41;
pub const KEY_F8: u8 = 0x80 + 0x42;
pub const KEY_F9: u8 = 0x80 + 0x43;
pub const KEY_F10: u8 = 0x80 + 0x44;
pub const KEY_F11: u8 = 0x80 + 0x57;
pub const KEY_F12: u8 = 0x80 + 0x58;

pub const KEY_BACKSPACE: u8 = 0x7f;
pub const KEY_PAUSE: u8 = 0xff;

pub const KEY_EQUALS: u8 = 0x3d;
pub const KEY_MINUS: u8 = 0x2d;

pub const KEY_RSHIFT: u8 = 0x80 + 0x36;
pub const KEY_RCTRL: u8 = 0x80 + 0x1d;
pub const KEY_RALT: u8 = 0x80 + 0x38;
pub const KEY_LALT: u8 = KEY_RALT;

pub const KEY_CAPSLOCK: u8 = 0x80 + 0x3a;
pub const KEY_NUMLOCK: u8 = 0x80 + 0x45;
pub const KEY_SCRLCK: u8 = 0x80 + 0x46;

pub const KEYP_MULTIPLY: u8 = b'*';

/// Linux input (evdev) key codes below 128 to engine keys. Up to 0x58 these
/// are the AT set 1 scan codes. Zero means the key is not used by the engine.
///
/// Both control keys fire, both alt keys strafe, the space bar uses.
#[rustfmt::skip]
pub const AT_TO_DOOM: [u8; 128] = [
    // 0x00
    0, KEY_ESCAPE, b'1', b'2', b'3', b'4', b'5', b'6',
    b'7', b'8', b'9', b'0', b'-', b'=', KEY_BACKSPACE, KEY_TAB,
    // 0x10
    b'q', b'w', b'e', b'r', b't', b'y', b'u', b'i',
    b'o', b'p', b'[', b']', KEY_ENTER, KEY_FIRE, b'a', b's',
    // 0x20
    b'd', b'f', b'g', b'h', b'j', b'k', b'l', b';',
    b'\'', b'`', KEY_RSHIFT, b'\\', b'z', b'x', b'c', b'v',
    // 0x30
    b'b', b'n', b'm', b',', b'.', b'/', KEY_RSHIFT, KEYP_MULTIPLY,
    KEY_LALT, KEY_USE, KEY_CAPSLOCK, KEY_F1, KEY_F2, KEY_F3, KEY_F4, KEY_F5,
    // 0x40
    KEY_F6, KEY_F7, KEY_F8, KEY_F9, KEY_F10, KEY_NUMLOCK, 0, 0,
    // Keypad
    0, 0, 0, 0, 0, 0, 0, 0,
    // 0x50
    0, 0, 0, 0, 0, 0, 0, KEY_F11,
    KEY_F12, 0, 0, 0, 0, 0, 0, 0,
    // 0x60
    0, KEY_FIRE, 0, 0, KEY_RALT, 0, 0, KEY_UPARROW,
    0, KEY_LEFTARROW, KEY_RIGHTARROW, 0, KEY_DOWNARROW, 0, 0, 0,
    // 0x70
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
];

const fn serial_table() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = i as u8;
        i += 1;
    }
    table[b' ' as usize] = KEY_USE;
    table[b'w' as usize] = KEY_UPARROW;
    table[b's' as usize] = KEY_DOWNARROW;
    table[b'a' as usize] = KEY_LEFTARROW;
    table[b'd' as usize] = KEY_RIGHTARROW;
    table[b'-' as usize] = KEY_FIRE;
    table
}

/// ASCII bytes from a terminal to engine keys. Movement is on WASD, fire on
/// `-` and use on the space bar. Every other byte is passed through.
pub const SERIAL_TO_DOOM: [u8; 128] = serial_table();

/// The engine key for scan code `code`, if it has one.
pub fn scancode_to_key(code: u16) -> Option<u8> {
    AT_TO_DOOM
        .get(code as usize)
        .copied()
        .filter(|&key| key != 0)
}

/// The engine key for a byte received on the serial console.
///
/// Bytes outside of 7-bit ASCII and NUL are ignored.
pub fn serial_byte_to_key(byte: u8) -> Option<u8> {
    SERIAL_TO_DOOM
        .get(byte as usize)
        .copied()
        .filter(|&key| key != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scancodes_follow_the_at_layout() {
        assert_eq!(scancode_to_key(0x01), Some(KEY_ESCAPE));
        assert_eq!(scancode_to_key(0x11), Some(b'w'));
        assert_eq!(scancode_to_key(0x1c), Some(KEY_ENTER));
        assert_eq!(scancode_to_key(0x1d), Some(KEY_FIRE));
        assert_eq!(scancode_to_key(0x2a), Some(KEY_RSHIFT));
        assert_eq!(scancode_to_key(0x39), Some(KEY_USE));
        assert_eq!(scancode_to_key(0x44), Some(KEY_F10));
        assert_eq!(scancode_to_key(0x45), Some(KEY_NUMLOCK));
        assert_eq!(scancode_to_key(0x67), Some(KEY_UPARROW));
        assert_eq!(scancode_to_key(0x69), Some(KEY_LEFTARROW));
        assert_eq!(scancode_to_key(0x6a), Some(KEY_RIGHTARROW));
        assert_eq!(scancode_to_key(0x6c), Some(KEY_DOWNARROW));
        assert_eq!(scancode_to_key(0x57), Some(KEY_F11));
        assert_eq!(scancode_to_key(0x58), Some(KEY_F12));
        // Right control and right alt
        assert_eq!(scancode_to_key(0x61), Some(KEY_FIRE));
        assert_eq!(scancode_to_key(0x64), Some(KEY_RALT));
    }

    #[test]
    fn unused_and_out_of_range_scancodes_map_to_nothing() {
        assert_eq!(scancode_to_key(0x00), None);
        assert_eq!(scancode_to_key(0x48), None);
        assert_eq!(scancode_to_key(0x68), None);
        // Compose
        assert_eq!(scancode_to_key(0x7f), None);
        assert_eq!(scancode_to_key(0x80), None);
        assert_eq!(scancode_to_key(0x1d1), None);
    }

    #[test]
    fn serial_bytes_use_wasd() {
        assert_eq!(serial_byte_to_key(b'w'), Some(KEY_UPARROW));
        assert_eq!(serial_byte_to_key(b'a'), Some(KEY_LEFTARROW));
        assert_eq!(serial_byte_to_key(b's'), Some(KEY_DOWNARROW));
        assert_eq!(serial_byte_to_key(b'd'), Some(KEY_RIGHTARROW));
        assert_eq!(serial_byte_to_key(b' '), Some(KEY_USE));
        assert_eq!(serial_byte_to_key(b'-'), Some(KEY_FIRE));
    }

    #[test]
    fn other_serial_bytes_pass_through() {
        assert_eq!(serial_byte_to_key(b'y'), Some(b'y'));
        assert_eq!(serial_byte_to_key(b'\r'), Some(KEY_ENTER));
        assert_eq!(serial_byte_to_key(0x1b), Some(KEY_ESCAPE));
        assert_eq!(serial_byte_to_key(0), None);
        assert_eq!(serial_byte_to_key(0x80), None);
        assert_eq!(serial_byte_to_key(0xff), None);
    }
}
