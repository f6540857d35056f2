//! Error types for configuration loading and runtime operation

use thiserror::Error;

/// Errors raised while validating a configuration at load time.
///
/// These are fatal: a controller is never constructed from an invalid
/// configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no layers defined in configuration")]
    NoLayers,

    #[error("default layer {0} not found in configuration")]
    MissingDefaultLayer(u8),
}

/// Errors reported by device collaborators (HID transport, keypad).
///
/// Implementors of [`HidTransport`](crate::device::HidTransport) and
/// [`Keypad`](crate::device::Keypad) map their backend failures into these
/// variants.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device disconnected")]
    Disconnected,

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Fatal runtime errors surfaced by the controller.
///
/// Action-level failures never reach this type; they are logged and
/// swallowed inside the dispatcher. Only startup failures and an exhausted
/// restart budget abort the controller.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("hardware initialization failed")]
    Init(#[source] DeviceError),

    #[error("event loop failed after {attempts} restart attempts")]
    RestartLimit {
        attempts: u32,
        #[source]
        last: DeviceError,
    },
}
