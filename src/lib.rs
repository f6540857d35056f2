//! Runtime controller for RGB matrix macro pads.
//!
//! The crate turns a small grid of RGB-backlit keys into a configurable
//! input device: layers of key bindings, HID keyboard/consumer actions,
//! and per-key lighting that tracks interaction state.
//!
//! Structure:
//!
//! - [`config`] — declarative configuration model (layers, bindings,
//!   settings), validated once at load time
//! - [`action`] — the action union behind every binding and its
//!   dual-action resolution
//! - [`color`] — RGB values, symbolic color table, brightness scaling
//! - [`device`] — the [`HidTransport`] and [`Keypad`] traits the
//!   controller is generic over; callers bring the hardware
//! - [`controller`] — dispatch, layer state machine, LED presentation,
//!   and the polling event loop with bounded restart
//! - [`hid_codes`] — USB HID usage constants and a US-layout character
//!   mapper
//!
//! Construct a [`Config`] (directly, via serde, or with
//! [`simple_keymap`]), pair it with device implementations in
//! [`Controller::new`], and drive [`Controller::run`] with a stop flag.
//! All dispatch is synchronous on the calling thread.

pub mod action;
pub mod color;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod hid_codes;

pub use action::{Action, Function, KeyCodes};
pub use color::{ColorSpec, ColorTable, Rgb};
pub use config::{
    key, simple_keymap, ColorSet, Config, InteractionState, KeyBinding, Layer, Settings,
};
pub use controller::{Controller, RestartPolicy};
pub use device::{HidTransport, KeyEvent, KeyEventKind, Keypad};
pub use error::{ConfigError, DeviceError, RuntimeError};
