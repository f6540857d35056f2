//! HID usage constants and keycode utilities.
//!
//! Key codes are keyboard-page usages from the USB HID Usage Tables
//! (0x04 = A, 0xE0-0xE7 = modifiers); consumer codes are consumer-page
//! usage IDs used for media control. The character map covers the
//! printable ASCII range of the US layout.

/// HID modifier key usages (keyboard page 0xE0-0xE7).
pub mod mods {
    pub const LCTRL: u8 = 0xE0;
    pub const LSHIFT: u8 = 0xE1;
    pub const LALT: u8 = 0xE2;
    pub const LGUI: u8 = 0xE3;
    pub const RCTRL: u8 = 0xE4;
    pub const RSHIFT: u8 = 0xE5;
    pub const RALT: u8 = 0xE6;
    pub const RGUI: u8 = 0xE7;
}

/// Common keyboard-page usages.
pub mod key {
    pub const A: u8 = 0x04;
    pub const B: u8 = 0x05;
    pub const C: u8 = 0x06;
    pub const D: u8 = 0x07;
    pub const ENTER: u8 = 0x28;
    pub const ESCAPE: u8 = 0x29;
    pub const BACKSPACE: u8 = 0x2A;
    pub const TAB: u8 = 0x2B;
    pub const SPACE: u8 = 0x2C;
    pub const F13: u8 = 0x68;
    pub const F14: u8 = 0x69;
    pub const F15: u8 = 0x6A;
    pub const F16: u8 = 0x6B;
    pub const F17: u8 = 0x6C;
    pub const F18: u8 = 0x6D;
    pub const F19: u8 = 0x6E;
}

/// Consumer-page usage IDs for media control.
pub mod consumer {
    pub const PLAY_PAUSE: u16 = 0x00CD;
    pub const SCAN_NEXT: u16 = 0x00B5;
    pub const SCAN_PREV: u16 = 0x00B6;
    pub const STOP: u16 = 0x00B7;
    pub const MUTE: u16 = 0x00E2;
    pub const VOLUME_UP: u16 = 0x00E9;
    pub const VOLUME_DOWN: u16 = 0x00EA;
}

/// Map a character to its HID keyboard usage (US layout).
///
/// Returns `(code, needs_shift)`, or `None` for characters the layout
/// cannot produce. Shifted symbols reuse the usage of their base key, so
/// `!` maps to the same code as `1` with the shift flag set.
pub fn char_to_hid(ch: char) -> Option<(u8, bool)> {
    match ch {
        'a'..='z' => Some((0x04 + (ch as u8 - b'a'), false)),
        'A'..='Z' => Some((0x04 + (ch as u8 - b'A'), true)),
        '1'..='9' => Some((0x1E + (ch as u8 - b'1'), false)),
        '0' => Some((0x27, false)),
        ' ' => Some((key::SPACE, false)),
        '\n' => Some((key::ENTER, false)),
        '\t' => Some((key::TAB, false)),
        // Unshifted punctuation, usage order 0x2D-0x38
        '-' => Some((0x2D, false)),
        '=' => Some((0x2E, false)),
        '[' => Some((0x2F, false)),
        ']' => Some((0x30, false)),
        '\\' => Some((0x31, false)),
        ';' => Some((0x33, false)),
        '\'' => Some((0x34, false)),
        '`' => Some((0x35, false)),
        ',' => Some((0x36, false)),
        '.' => Some((0x37, false)),
        '/' => Some((0x38, false)),
        // Shifted digit-row symbols
        '!' => Some((0x1E, true)),
        '@' => Some((0x1F, true)),
        '#' => Some((0x20, true)),
        '$' => Some((0x21, true)),
        '%' => Some((0x22, true)),
        '^' => Some((0x23, true)),
        '&' => Some((0x24, true)),
        '*' => Some((0x25, true)),
        '(' => Some((0x26, true)),
        ')' => Some((0x27, true)),
        // Shifted punctuation
        '_' => Some((0x2D, true)),
        '+' => Some((0x2E, true)),
        '{' => Some((0x2F, true)),
        '}' => Some((0x30, true)),
        '|' => Some((0x31, true)),
        ':' => Some((0x33, true)),
        '"' => Some((0x34, true)),
        '~' => Some((0x35, true)),
        '<' => Some((0x36, true)),
        '>' => Some((0x37, true)),
        '?' => Some((0x38, true)),
        _ => None,
    }
}
