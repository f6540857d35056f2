//! Key action representation.
//!
//! [`Action`] is the tagged union behind every key binding. In serialized
//! form it uses the `action_type`/`action` pair the configuration format is
//! built around:
//!
//! ```json
//! { "action_type": "key", "action": 4 }
//! { "action_type": "key", "action": [224, 6] }
//! { "action_type": "layer", "action": 1 }
//! { "action_type": "modifier" }
//! { "action_type": "dual", "action": { "default": {...}, "modifier": {...} } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One keyboard-page emission: a single usage code or a chord pressed
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyCodes {
    /// Single HID keycode.
    Code(u8),
    /// Ordered set of keycodes pressed together (modifiers first by
    /// convention, though the transport receives them as given).
    Chord(Vec<u8>),
}

impl KeyCodes {
    /// View as a slice of codes regardless of variant.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            KeyCodes::Code(code) => std::slice::from_ref(code),
            KeyCodes::Chord(codes) => codes,
        }
    }
}

impl fmt::Display for KeyCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCodes::Code(code) => write!(f, "0x{code:02X}"),
            KeyCodes::Chord(codes) => {
                for (i, code) in codes.iter().enumerate() {
                    if i > 0 {
                        write!(f, "+")?;
                    }
                    write!(f, "0x{code:02X}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<u8> for KeyCodes {
    fn from(code: u8) -> Self {
        KeyCodes::Code(code)
    }
}

impl From<Vec<u8>> for KeyCodes {
    fn from(codes: Vec<u8>) -> Self {
        KeyCodes::Chord(codes)
    }
}

/// Named built-in functions a key can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    ToggleAllLeds,
    ShowLayerInfo,
    BrightnessUp,
    BrightnessDown,
}

/// What a key does when pressed.
///
/// `Key` is the only press-only action: the dispatcher records it on
/// key-down and releases exactly the recorded codes on key-up. Everything
/// else executes fully at press time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type", content = "action", rename_all = "snake_case")]
pub enum Action {
    /// Press-and-hold HID emission, released on key-up.
    Key(KeyCodes),
    /// Ordered taps with a fixed inter-step delay.
    Sequence(Vec<KeyCodes>),
    /// Literal text typed through the transport's layout.
    String(String),
    /// Consumer-page (media) usage, sent as a full press+release.
    Consumer(u16),
    /// Switch to the given layer id. No HID side effect.
    Layer(u8),
    /// Invoke a named built-in.
    Function(Function),
    /// Modifier marker: holding this key only toggles the modifier-held
    /// flag. Never emits HID output.
    Modifier,
    /// Two alternative sub-actions, selected by whether any modifier key
    /// is held at press time.
    Dual {
        default: Box<Action>,
        modifier: Box<Action>,
    },
    /// No action.
    None,
}

impl Action {
    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Key(_) => "key",
            Action::Sequence(_) => "sequence",
            Action::String(_) => "string",
            Action::Consumer(_) => "consumer",
            Action::Layer(_) => "layer",
            Action::Function(_) => "function",
            Action::Modifier => "modifier",
            Action::Dual { .. } => "dual",
            Action::None => "none",
        }
    }

    /// Resolve dual actions against the modifier-held flag.
    ///
    /// Nested duals are resolved repeatedly; the structure is a tree, so
    /// this terminates.
    pub fn resolve(&self, modifier_held: bool) -> &Action {
        let mut action = self;
        while let Action::Dual { default, modifier } = action {
            action = if modifier_held { modifier } else { default };
        }
        action
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keycodes_as_slice() {
        assert_eq!(KeyCodes::Code(0x04).as_slice(), &[0x04]);
        assert_eq!(
            KeyCodes::Chord(vec![0xE0, 0x06]).as_slice(),
            &[0xE0, 0x06]
        );
    }

    #[test]
    fn keycodes_display() {
        assert_eq!(KeyCodes::Code(0x04).to_string(), "0x04");
        assert_eq!(
            KeyCodes::Chord(vec![0xE0, 0xE2, 0x4C]).to_string(),
            "0xE0+0xE2+0x4C"
        );
    }

    #[test]
    fn resolve_plain_action_is_identity() {
        let a = Action::Key(KeyCodes::Code(0x04));
        assert_eq!(a.resolve(false), &a);
        assert_eq!(a.resolve(true), &a);
    }

    #[test]
    fn resolve_dual_by_modifier_flag() {
        let dual = Action::Dual {
            default: Box::new(Action::Key(KeyCodes::Code(0x05))),
            modifier: Box::new(Action::Layer(1)),
        };
        assert_eq!(dual.resolve(false), &Action::Key(KeyCodes::Code(0x05)));
        assert_eq!(dual.resolve(true), &Action::Layer(1));
    }

    #[test]
    fn resolve_nested_dual() {
        let dual = Action::Dual {
            default: Box::new(Action::Dual {
                default: Box::new(Action::None),
                modifier: Box::new(Action::Layer(2)),
            }),
            modifier: Box::new(Action::Layer(1)),
        };
        // Inner dual is resolved with the same flag.
        assert_eq!(dual.resolve(false), &Action::None);
        assert_eq!(dual.resolve(true), &Action::Layer(1));
    }

    #[test]
    fn action_json_roundtrip() {
        let json = r#"{ "action_type": "key", "action": [224, 6] }"#;
        let a: Action = serde_json::from_str(json).unwrap();
        assert_eq!(a, Action::Key(KeyCodes::Chord(vec![0xE0, 0x06])));

        let back = serde_json::to_string(&a).unwrap();
        let again: Action = serde_json::from_str(&back).unwrap();
        assert_eq!(again, a);
    }

    #[test]
    fn modifier_marker_needs_no_payload() {
        let a: Action = serde_json::from_str(r#"{ "action_type": "modifier" }"#).unwrap();
        assert_eq!(a, Action::Modifier);
    }

    #[test]
    fn dual_action_json() {
        let json = r#"{
            "action_type": "dual",
            "action": {
                "default": { "action_type": "key", "action": 5 },
                "modifier": { "action_type": "layer", "action": 1 }
            }
        }"#;
        let a: Action = serde_json::from_str(json).unwrap();
        assert_eq!(
            a,
            Action::Dual {
                default: Box::new(Action::Key(KeyCodes::Code(5))),
                modifier: Box::new(Action::Layer(1)),
            }
        );
    }

    #[test]
    fn function_names_are_snake_case() {
        let a: Action =
            serde_json::from_str(r#"{ "action_type": "function", "action": "brightness_up" }"#)
                .unwrap();
        assert_eq!(a, Action::Function(Function::BrightnessUp));
    }
}
