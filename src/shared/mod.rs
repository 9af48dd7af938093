//! Types shared between the mosaic core, the gateway and the front end

pub mod geometry;

pub use geometry::{Point, Rect};
