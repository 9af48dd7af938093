//! Window manager gateway
//!
//! The narrow interface the mosaic core uses to talk to the window manager.
//! The core never speaks X11 itself: it enumerates windows, reads a few
//! attributes and asks for activation through [`WindowGateway`].

pub mod event_stream;
pub mod ewmh;
pub mod memory;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GatewayError;

pub use ewmh::EwmhGateway;
pub use memory::MemoryGateway;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Opaque window handle (X11 window id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub u32);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Virtual desktop a window lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Desktop {
    Index(u32),
    /// Shown on every desktop (`_NET_WM_DESKTOP` = 0xFFFFFFFF)
    All,
}

impl Desktop {
    pub const ALL_SENTINEL: u32 = 0xFFFF_FFFF;

    pub fn from_cardinal(value: u32) -> Self {
        if value == Self::ALL_SENTINEL {
            Desktop::All
        } else {
            Desktop::Index(value)
        }
    }

    /// One-based number shown on a box, if any
    pub fn label(&self) -> Option<u32> {
        match self {
            Desktop::Index(i) => Some(i + 1),
            Desktop::All => None,
        }
    }
}

/// WM_CLASS split on its embedded NUL separator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowClass {
    pub instance: Option<String>,
    pub class: Option<String>,
}

impl WindowClass {
    pub fn new(instance: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            instance: Some(instance.into()),
            class: Some(class.into()),
        }
    }

    /// Parse the raw property value (`instance\0class\0`)
    pub fn from_raw(raw: &[u8]) -> Self {
        let mut parts = raw
            .split(|&b| b == 0)
            .map(|part| String::from_utf8_lossy(part).into_owned());
        let instance = parts.next().filter(|s| !s.is_empty());
        let class = parts.next().filter(|s| !s.is_empty());
        Self { instance, class }
    }

    /// String used for color hashing
    pub fn identity(&self) -> &str {
        self.instance
            .as_deref()
            .or(self.class.as_deref())
            .unwrap_or_default()
    }

    /// Sub-fields that take part in search matching
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.instance.as_deref().into_iter().chain(self.class.as_deref())
    }
}

bitflags! {
    /// `_NET_WM_WINDOW_TYPE` values
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowTypes: u32 {
        const NORMAL        = 1 << 0;
        const DIALOG        = 1 << 1;
        const UTILITY       = 1 << 2;
        const DESKTOP       = 1 << 3;
        const DOCK          = 1 << 4;
        const TOOLBAR       = 1 << 5;
        const MENU          = 1 << 6;
        const DROPDOWN_MENU = 1 << 7;
        const POPUP_MENU    = 1 << 8;
        const TOOLTIP       = 1 << 9;
        const NOTIFICATION  = 1 << 10;
        const COMBO         = 1 << 11;
        const DND           = 1 << 12;
        const SPLASH        = 1 << 13;

        /// Types that are never offered for selection
        const CHROME = Self::DESKTOP.bits()
            | Self::DOCK.bits()
            | Self::TOOLBAR.bits()
            | Self::MENU.bits()
            | Self::DROPDOWN_MENU.bits()
            | Self::POPUP_MENU.bits()
            | Self::TOOLTIP.bits()
            | Self::NOTIFICATION.bits()
            | Self::COMBO.bits()
            | Self::DND.bits()
            | Self::SPLASH.bits();
    }
}

bitflags! {
    /// `_NET_WM_STATE` values relevant to selection
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowStates: u32 {
        const SKIP_TASKBAR = 1 << 0;
        const SKIP_PAGER   = 1 << 1;
        const STICKY       = 1 << 2;
        const HIDDEN       = 1 << 3;
        const MODAL        = 1 << 4;
        const ABOVE        = 1 << 5;
    }
}

/// Single exclusion predicate shared by every gateway implementation.
pub fn is_selectable_window(types: WindowTypes, states: WindowStates, desktop: Option<Desktop>) -> bool {
    if types.intersects(WindowTypes::CHROME) {
        return false;
    }
    if states.contains(WindowStates::SKIP_TASKBAR) {
        return false;
    }
    !matches!(desktop, Some(Desktop::All))
}

/// Change notifications delivered to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEvent {
    WindowListChanged,
    TitleChanged(WindowHandle),
    IconChanged(WindowHandle),
}

/// Window manager introspection and control.
///
/// Reads may fail per window; callers in the core substitute defaults
/// instead of propagating those failures.
pub trait WindowGateway {
    /// All client windows, in the window manager's enumeration order
    fn list_windows(&self) -> Result<Vec<WindowHandle>>;

    /// False for panels, docks, tooltips, skip-taskbar and all-desktop windows
    fn is_selectable(&self, window: WindowHandle) -> bool;

    fn title(&self, window: WindowHandle) -> Result<String>;

    fn identity_class(&self, window: WindowHandle) -> Result<WindowClass>;

    fn desktop_index(&self, window: WindowHandle) -> Result<Desktop>;

    /// Last user interaction time, 0 when unknown
    fn last_focus_time(&self, window: WindowHandle) -> Result<u32>;

    /// Currently active window, if the window manager reports one
    fn active_window(&self) -> Option<WindowHandle>;

    /// Raise and focus a window. Fire and forget.
    fn activate(&self, window: WindowHandle);
}
