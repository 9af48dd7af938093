//! Error taxonomy
//!
//! Only gateway-level failures and invalid geometry are errors. Missing
//! window attributes, malformed input records and bad colors are handled
//! where they are detected and never reach these types.

use thiserror::Error;

/// Failures of the window-manager gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to connect to X server: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X11 request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("window manager does not support EWMH")]
    EwmhUnsupported,

    #[error("window {window:#x} has no {property} property")]
    MissingProperty { window: u32, property: &'static str },

    #[error("unknown window {0:#x}")]
    UnknownWindow(u32),
}

/// Errors surfaced by the mosaic core
#[derive(Debug, Error)]
pub enum MosaicError {
    #[error("invalid layout geometry: {0}")]
    InvalidGeometry(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
