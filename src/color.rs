//! Color types and the symbolic color table.
//!
//! Bindings reference colors either by name (resolved through a
//! [`ColorTable`]) or as literal RGB triples. Brightness scaling is applied
//! at the point of LED update, never stored pre-scaled.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Rgb ──────────────────────────────────────────────────────────────

/// RGB color triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale each channel by `brightness`, truncating.
    ///
    /// `brightness` is expected in `[0.1, 1.0]`, which keeps the result
    /// inside `[0, 255]` without an explicit clamp.
    pub fn scaled(self, brightness: f32) -> Self {
        Self {
            r: (self.r as f32 * brightness) as u8,
            g: (self.g as f32 * brightness) as u8,
            b: (self.b as f32 * brightness) as u8,
        }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

// ── ColorSpec ────────────────────────────────────────────────────────

/// A color reference in a key binding: symbolic name or literal triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Symbolic name resolved through the [`ColorTable`].
    Name(String),
    /// Literal RGB triple, used as-is.
    Literal(Rgb),
}

impl ColorSpec {
    pub fn name(name: &str) -> Self {
        ColorSpec::Name(name.to_string())
    }
}

impl From<Rgb> for ColorSpec {
    fn from(rgb: Rgb) -> Self {
        ColorSpec::Literal(rgb)
    }
}

// ── ColorTable ───────────────────────────────────────────────────────

/// Symbolic color table: name → RGB.
///
/// `Default` carries the standard ten-color palette. Unresolved names fall
/// back to `off` (black) at the lookup site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorTable {
    entries: HashMap<String, Rgb>,
}

impl ColorTable {
    /// Empty table. Every symbolic lookup will fall back to off.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace a named color.
    pub fn insert(&mut self, name: &str, rgb: Rgb) {
        self.entries.insert(name.to_string(), rgb);
    }

    /// Resolve a color reference to a concrete RGB value.
    ///
    /// Unknown names resolve to black (off).
    pub fn resolve(&self, spec: &ColorSpec) -> Rgb {
        match spec {
            ColorSpec::Literal(rgb) => *rgb,
            ColorSpec::Name(name) => self.entries.get(name).copied().unwrap_or(Rgb::BLACK),
        }
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert("off".to_string(), Rgb::new(0, 0, 0));
        entries.insert("white".to_string(), Rgb::new(255, 255, 255));
        entries.insert("blue".to_string(), Rgb::new(0, 0, 255));
        entries.insert("green".to_string(), Rgb::new(0, 255, 0));
        entries.insert("yellow".to_string(), Rgb::new(255, 255, 0));
        entries.insert("red".to_string(), Rgb::new(255, 0, 0));
        entries.insert("orange".to_string(), Rgb::new(255, 128, 0));
        entries.insert("purple".to_string(), Rgb::new(128, 0, 255));
        entries.insert("cyan".to_string(), Rgb::new(0, 255, 255));
        entries.insert("pink".to_string(), Rgb::new(255, 0, 128));
        Self { entries }
    }
}
