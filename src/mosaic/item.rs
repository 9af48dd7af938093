//! Selectable boxes
//!
//! An [`Item`] is one box on the mosaic: either a live window or a line of
//! text read from stdin.

use std::path::PathBuf;

use serde::Serialize;

use super::color::{ColorOptions, Rgb};
use crate::gateway::{Desktop, WindowClass, WindowGateway, WindowHandle};
use crate::shared::geometry::Rect;

/// Icon reference carried by a records line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconRef {
    /// `*`: use the default icon
    Default,
    /// Absolute or relative path to an image
    Path(PathBuf),
    /// Name to look up in the icon theme
    Theme(String),
}

impl IconRef {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            None
        } else if s == "*" {
            Some(IconRef::Default)
        } else if s.contains('/') {
            Some(IconRef::Path(PathBuf::from(s)))
        } else {
            Some(IconRef::Theme(s.to_string()))
        }
    }
}

/// Extra fields a text item may carry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextMeta {
    /// Zero-based desktop index
    pub desktop: Option<u32>,
    pub color: Option<Rgb>,
    pub icon: Option<IconRef>,
    /// Printed on selection instead of the label
    pub alt_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Window {
        handle: WindowHandle,
        desktop: Option<Desktop>,
        class: WindowClass,
    },
    Text(TextMeta),
}

/// What a box does when it is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The window was handed to the gateway for activation
    Window(WindowHandle),
    /// Text to print on stdout
    Text(String),
    /// Launcher mode: the raw query, when nothing matched
    Query(String),
}

/// Behavior shared by every kind of box
pub trait Selectable {
    fn rect(&self) -> Option<Rect>;
    fn color(&self) -> Rgb;
    fn display_name(&self) -> &str;
    fn on_activate<G>(&self, gateway: &G) -> Selection
    where
        G: WindowGateway + ?Sized;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Input to the color assigner
    pub identity: String,
    pub display_name: String,
    pub kind: ItemKind,
    /// Set by the layout when the box is placed
    pub position: Option<Rect>,
    pub color: Rgb,
}

impl Item {
    pub fn window(
        handle: WindowHandle,
        title: String,
        class: WindowClass,
        desktop: Option<Desktop>,
    ) -> Self {
        Self {
            identity: class.identity().to_string(),
            display_name: title,
            kind: ItemKind::Window {
                handle,
                desktop,
                class,
            },
            position: None,
            color: Rgb::NEUTRAL,
        }
    }

    pub fn text(label: impl Into<String>, meta: TextMeta) -> Self {
        let label = label.into();
        Self {
            identity: label.clone(),
            display_name: label,
            kind: ItemKind::Text(meta),
            position: None,
            color: Rgb::NEUTRAL,
        }
    }

    pub fn handle(&self) -> Option<WindowHandle> {
        match &self.kind {
            ItemKind::Window { handle, .. } => Some(*handle),
            ItemKind::Text(_) => None,
        }
    }

    /// One-based desktop number to draw in the corner, if any
    pub fn desktop_label(&self) -> Option<u32> {
        match &self.kind {
            ItemKind::Window { desktop, .. } => desktop.and_then(|d| d.label()),
            ItemKind::Text(meta) => meta.desktop.map(|d| d + 1),
        }
    }

    /// Secondary strings the search may match against
    pub fn alt_fields(&self) -> Vec<&str> {
        match &self.kind {
            ItemKind::Window { class, .. } => class.fields().collect(),
            ItemKind::Text(_) => Vec::new(),
        }
    }

    /// Assign the box color. An explicit override always wins.
    pub fn apply_colors(&mut self, options: &ColorOptions) {
        self.color = match &self.kind {
            ItemKind::Text(TextMeta {
                color: Some(color), ..
            }) => *color,
            _ => options.color_for(&self.identity),
        };
    }
}

impl Selectable for Item {
    fn rect(&self) -> Option<Rect> {
        self.position
    }

    fn color(&self) -> Rgb {
        self.color
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn on_activate<G>(&self, gateway: &G) -> Selection
    where
        G: WindowGateway + ?Sized,
    {
        match &self.kind {
            ItemKind::Window { handle, .. } => {
                gateway.activate(*handle);
                Selection::Window(*handle)
            }
            ItemKind::Text(meta) => {
                Selection::Text(meta.alt_name.clone().unwrap_or_else(|| self.display_name.clone()))
            }
        }
    }
}
