//! Collaborator traits: HID transport and keypad input/LED device.
//!
//! The controller is generic over these seams; callers bring the actual
//! hardware (or mocks, in tests). Both traits are synchronous: the event
//! loop is a single-threaded cooperative poll and no operation suspends
//! independently of it.

use crate::color::Rgb;
use crate::error::DeviceError;
use crate::hid_codes::{char_to_hid, mods};
use std::time::Duration;

// ── HID transport ────────────────────────────────────────────────────

/// HID output sink: keyboard-page reports, consumer-page reports, and
/// text typing.
///
/// The controller is the sole client and never issues concurrent calls.
pub trait HidTransport {
    /// Press and hold the given keycodes (no release).
    fn press(&mut self, codes: &[u8]) -> Result<(), DeviceError>;

    /// Release the given keycodes.
    fn release(&mut self, codes: &[u8]) -> Result<(), DeviceError>;

    /// Full press+release of the given keycodes.
    fn send(&mut self, codes: &[u8]) -> Result<(), DeviceError> {
        self.press(codes)?;
        self.release(codes)
    }

    /// Release every key currently held by the transport.
    fn release_all(&mut self) -> Result<(), DeviceError>;

    /// Send a consumer-page (media) usage as a full press+release.
    fn send_consumer(&mut self, usage: u16) -> Result<(), DeviceError>;

    /// Type literal text.
    ///
    /// The default implementation expands the string through
    /// [`char_to_hid`] (US layout), tapping each character; unsupported
    /// characters abort with [`DeviceError::Unsupported`]. Transports with
    /// a native layout facility can override this.
    fn write(&mut self, text: &str) -> Result<(), DeviceError> {
        for ch in text.chars() {
            let (code, shifted) = char_to_hid(ch)
                .ok_or_else(|| DeviceError::Unsupported(format!("character {ch:?}")))?;
            if shifted {
                self.send(&[mods::LSHIFT, code])?;
            } else {
                self.send(&[code])?;
            }
        }
        Ok(())
    }
}

// ── Keypad ───────────────────────────────────────────────────────────

/// What happened to a key, as reported by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    Released,
    /// Long-press threshold crossed while still down. Purely a
    /// presentation signal.
    Held,
}

/// A single key event at a physical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub position: u8,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub fn pressed(position: u8) -> Self {
        Self {
            position,
            kind: KeyEventKind::Pressed,
        }
    }

    pub fn released(position: u8) -> Self {
        Self {
            position,
            kind: KeyEventKind::Released,
        }
    }

    pub fn held(position: u8) -> Self {
        Self {
            position,
            kind: KeyEventKind::Held,
        }
    }
}

/// Input source and LED array: a fixed set of physical key positions, each
/// with an RGB LED.
///
/// Debounce and hold detection live behind this trait; the controller only
/// sees the resulting events.
pub trait Keypad {
    /// Number of physical key positions (positions are `0..key_count`).
    fn key_count(&self) -> u8;

    /// Poll the device. Returns the events that occurred since the last
    /// call, in arrival order. Must be invoked every loop iteration.
    fn update(&mut self) -> Result<Vec<KeyEvent>, DeviceError>;

    /// Set one key's LED.
    fn set_led(&mut self, position: u8, color: Rgb) -> Result<(), DeviceError>;

    /// Turn one key's LED off.
    fn led_off(&mut self, position: u8) -> Result<(), DeviceError> {
        self.set_led(position, Rgb::BLACK)
    }

    /// Configure the device's LED sleep behavior.
    fn set_led_sleep(&mut self, enabled: bool, timeout: Duration) -> Result<(), DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport that records every call, for exercising the default
    /// `send`/`write` implementations.
    #[derive(Default)]
    struct RecordingTransport {
        calls: Vec<String>,
    }

    impl HidTransport for RecordingTransport {
        fn press(&mut self, codes: &[u8]) -> Result<(), DeviceError> {
            self.calls.push(format!("press{codes:?}"));
            Ok(())
        }

        fn release(&mut self, codes: &[u8]) -> Result<(), DeviceError> {
            self.calls.push(format!("release{codes:?}"));
            Ok(())
        }

        fn release_all(&mut self) -> Result<(), DeviceError> {
            self.calls.push("release_all".to_string());
            Ok(())
        }

        fn send_consumer(&mut self, usage: u16) -> Result<(), DeviceError> {
            self.calls.push(format!("consumer({usage})"));
            Ok(())
        }
    }

    #[test]
    fn default_send_is_press_then_release() {
        let mut t = RecordingTransport::default();
        t.send(&[0x04, 0x05]).unwrap();
        assert_eq!(t.calls, vec!["press[4, 5]", "release[4, 5]"]);
    }

    #[test]
    fn default_write_taps_characters() {
        let mut t = RecordingTransport::default();
        t.write("aB").unwrap();
        assert_eq!(
            t.calls,
            vec![
                "press[4]",
                "release[4]",
                "press[225, 5]",
                "release[225, 5]",
            ]
        );
    }

    #[test]
    fn default_write_rejects_unsupported() {
        let mut t = RecordingTransport::default();
        let err = t.write("ok\u{1F600}").unwrap_err();
        assert!(matches!(err, DeviceError::Unsupported(_)));
    }
}
