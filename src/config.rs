//! Declarative configuration model: layers, key bindings, settings.
//!
//! A [`Config`] is built once at startup from a layer table, a symbolic
//! color table, and a settings record, then shared read-only with the
//! controller. Validation happens here; dispatch never sees malformed
//! entries.

use crate::action::{Action, KeyCodes};
use crate::color::{ColorSpec, ColorTable};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── ColorSet ─────────────────────────────────────────────────────────

/// Per-binding colors for the three interaction states.
///
/// Absent entries fall back to a fixed name per state: `off` for default,
/// `white` for pressed, `yellow` for held.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressed: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub held: Option<ColorSpec>,
}

/// Key interaction state, selecting which color variant is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Default,
    Pressed,
    Held,
}

impl ColorSet {
    /// The color to show for `state`, with the per-state fallback name.
    pub fn for_state(&self, state: InteractionState) -> ColorSpec {
        let (configured, fallback) = match state {
            InteractionState::Default => (&self.default, "off"),
            InteractionState::Pressed => (&self.pressed, "white"),
            InteractionState::Held => (&self.held, "yellow"),
        };
        configured
            .clone()
            .unwrap_or_else(|| ColorSpec::name(fallback))
    }
}

// ── KeyBinding / Layer ───────────────────────────────────────────────

/// A single key's binding: an action plus its color set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    #[serde(flatten)]
    pub action: Action,
    #[serde(default)]
    pub colors: ColorSet,
}

impl KeyBinding {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            colors: ColorSet::default(),
        }
    }

    pub fn with_colors(action: Action, colors: ColorSet) -> Self {
        Self { action, colors }
    }
}

/// A named, complete set of key bindings with an accent color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Accent color for the layer (used by presentation surfaces, not by
    /// dispatch).
    #[serde(default = "default_accent")]
    pub color: ColorSpec,
    /// Key position → binding.
    #[serde(default)]
    pub keys: BTreeMap<u8, KeyBinding>,
}

fn default_accent() -> ColorSpec {
    ColorSpec::name("white")
}

// ── Settings ─────────────────────────────────────────────────────────

/// Global settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Configuration display name, logged at startup.
    #[serde(default)]
    pub name: Option<String>,
    /// Configuration version, logged at startup.
    #[serde(default)]
    pub version: Option<String>,
    /// Layer active at startup. Must exist in the layer table.
    pub default_layer: u8,
    /// Global LED brightness, clamped to [0.1, 1.0] at load.
    #[serde(default = "default_brightness")]
    pub brightness: f32,
    #[serde(default = "default_true")]
    pub led_sleep_enabled: bool,
    /// LED sleep timeout in seconds.
    #[serde(default = "default_led_sleep_time")]
    pub led_sleep_time: u32,
    /// Position treated as a modifier key regardless of its binding.
    /// Presence enables hold-to-switch-layer semantics on that key.
    #[serde(default)]
    pub modifier_key: Option<u8>,
    /// Gates verbose per-event logging.
    #[serde(default)]
    pub debug: bool,
}

fn default_brightness() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_led_sleep_time() -> u32 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            default_layer: 0,
            brightness: 1.0,
            led_sleep_enabled: true,
            led_sleep_time: 30,
            modifier_key: None,
            debug: false,
        }
    }
}

pub(crate) const BRIGHTNESS_MIN: f32 = 0.1;
pub(crate) const BRIGHTNESS_MAX: f32 = 1.0;

// ── Config ───────────────────────────────────────────────────────────

/// Validated configuration: layer table, color table, settings.
///
/// Constructed once at startup, immutable thereafter. Layer-switch targets
/// are deliberately not validated here — an invalid target is logged and
/// ignored at switch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub layers: BTreeMap<u8, Layer>,
    #[serde(default)]
    pub colors: ColorTable,
    pub settings: Settings,
}

impl Config {
    /// Validate and assemble a configuration.
    pub fn new(
        layers: BTreeMap<u8, Layer>,
        colors: ColorTable,
        mut settings: Settings,
    ) -> Result<Self, ConfigError> {
        if layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        if !layers.contains_key(&settings.default_layer) {
            return Err(ConfigError::MissingDefaultLayer(settings.default_layer));
        }
        settings.brightness = settings.brightness.clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX);
        Ok(Self {
            layers,
            colors,
            settings,
        })
    }

    /// Binding for a key position in a layer, if any.
    pub fn binding(&self, layer: u8, position: u8) -> Option<&KeyBinding> {
        self.layers.get(&layer)?.keys.get(&position)
    }

    /// True if `layer` exists in the layer table.
    pub fn has_layer(&self, layer: u8) -> bool {
        self.layers.contains_key(&layer)
    }

    /// Display name for a layer, synthesizing "Layer N" for unknown ids.
    pub fn layer_name(&self, layer: u8) -> String {
        self.layers
            .get(&layer)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| format!("Layer {layer}"))
    }
}

// ── simple_keymap builder ────────────────────────────────────────────

/// Build a one-layer [`Config`] from plain key definitions.
///
/// `keys` maps positions to actions (use `Action::Key(code.into())` for
/// plain keys, or any other variant). `colors` supplies the default color
/// per position; positions absent from it get blue. The standard color
/// table and default settings are used.
pub fn simple_keymap(
    keys: BTreeMap<u8, Action>,
    colors: BTreeMap<u8, ColorSpec>,
    name: &str,
) -> Result<Config, ConfigError> {
    let bindings = keys
        .into_iter()
        .map(|(pos, action)| {
            let default = colors
                .get(&pos)
                .cloned()
                .unwrap_or_else(|| ColorSpec::name("blue"));
            let binding = KeyBinding::with_colors(
                action,
                ColorSet {
                    default: Some(default),
                    pressed: None,
                    held: None,
                },
            );
            (pos, binding)
        })
        .collect();

    let layer = Layer {
        name: name.to_string(),
        description: format!("{name} layout"),
        color: ColorSpec::name("blue"),
        keys: bindings,
    };

    let settings = Settings {
        name: Some(name.to_string()),
        ..Settings::default()
    };

    Config::new(
        BTreeMap::from([(0, layer)]),
        ColorTable::default(),
        settings,
    )
}

/// Convenience for `simple_keymap` callers: wrap a code or chord as a
/// press-and-release key action.
pub fn key(codes: impl Into<KeyCodes>) -> Action {
    Action::Key(codes.into())
}
