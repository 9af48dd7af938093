//! Mosaic core
//!
//! Everything between the gateway and the renderer: ranking windows,
//! coloring boxes, placing them on a spiral and filtering them by query.

pub mod color;
pub mod item;
pub mod layout;
pub mod ranker;
pub mod records;
pub mod search;
pub mod session;

pub use color::{ColorOptions, Rgb};
pub use item::{IconRef, Item, ItemKind, Selectable, TextMeta};
pub use layout::{LayoutGeometry, Placement, SpiralWalk};
pub use search::{MatchTier, Query};
