//! Winmosaic
//!
//! Presents the open windows of an EWMH window manager (or any list of text
//! items) as a spiral mosaic of colored boxes that can be narrowed down by
//! typing. This crate holds everything except the drawing: window discovery
//! and MRU ranking, the spiral layout, the tiered search and the color hash.

pub mod config;
pub mod error;
pub mod gateway;
pub mod mosaic;
pub mod shared;

pub use error::{GatewayError, MosaicError};
pub use mosaic::session::{Session, SessionOptions, SessionUpdate, Selection};
