//! In-memory gateway
//!
//! Holds a scripted window set. Used by tests and by callers that want to
//! drive the mosaic without an X server.

use std::cell::RefCell;

use super::{
    is_selectable_window, Desktop, Result, WindowClass, WindowGateway, WindowHandle, WindowStates,
    WindowTypes,
};
use crate::error::GatewayError;

/// A window known to [`MemoryGateway`]
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    pub handle: WindowHandle,
    pub title: Option<String>,
    pub class: Option<WindowClass>,
    pub desktop: Option<Desktop>,
    pub user_time: Option<u32>,
    pub types: WindowTypes,
    pub states: WindowStates,
}

impl MemoryWindow {
    pub fn new(id: u32, title: &str, class: &str) -> Self {
        Self {
            handle: WindowHandle(id),
            title: Some(title.to_string()),
            class: Some(WindowClass::new(class.to_lowercase(), class)),
            desktop: Some(Desktop::Index(0)),
            user_time: None,
            types: WindowTypes::NORMAL,
            states: WindowStates::empty(),
        }
    }

    pub fn with_time(mut self, time: u32) -> Self {
        self.user_time = Some(time);
        self
    }

    pub fn with_desktop(mut self, desktop: Desktop) -> Self {
        self.desktop = Some(desktop);
        self
    }

    pub fn with_types(mut self, types: WindowTypes) -> Self {
        self.types = types;
        self
    }

    pub fn with_states(mut self, states: WindowStates) -> Self {
        self.states = states;
        self
    }
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    windows: Vec<MemoryWindow>,
    active: Option<WindowHandle>,
    activated: RefCell<Vec<WindowHandle>>,
}

impl MemoryGateway {
    pub fn new(windows: Vec<MemoryWindow>) -> Self {
        Self {
            windows,
            active: None,
            activated: RefCell::new(Vec::new()),
        }
    }

    pub fn set_active(&mut self, window: Option<WindowHandle>) {
        self.active = window;
    }

    pub fn push(&mut self, window: MemoryWindow) {
        self.windows.push(window);
    }

    pub fn remove(&mut self, handle: WindowHandle) {
        self.windows.retain(|w| w.handle != handle);
    }

    pub fn set_title(&mut self, handle: WindowHandle, title: &str) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.handle == handle) {
            window.title = Some(title.to_string());
        }
    }

    /// Windows passed to `activate`, oldest first
    pub fn activated(&self) -> Vec<WindowHandle> {
        self.activated.borrow().clone()
    }

    fn get(&self, handle: WindowHandle) -> Result<&MemoryWindow> {
        self.windows
            .iter()
            .find(|w| w.handle == handle)
            .ok_or(GatewayError::UnknownWindow(handle.0))
    }
}

impl WindowGateway for MemoryGateway {
    fn list_windows(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.windows.iter().map(|w| w.handle).collect())
    }

    fn is_selectable(&self, window: WindowHandle) -> bool {
        match self.get(window) {
            Ok(w) => is_selectable_window(w.types, w.states, w.desktop),
            Err(_) => false,
        }
    }

    fn title(&self, window: WindowHandle) -> Result<String> {
        self.get(window)?
            .title
            .clone()
            .ok_or(GatewayError::MissingProperty {
                window: window.0,
                property: "_NET_WM_NAME",
            })
    }

    fn identity_class(&self, window: WindowHandle) -> Result<WindowClass> {
        self.get(window)?
            .class
            .clone()
            .ok_or(GatewayError::MissingProperty {
                window: window.0,
                property: "WM_CLASS",
            })
    }

    fn desktop_index(&self, window: WindowHandle) -> Result<Desktop> {
        self.get(window)?.desktop.ok_or(GatewayError::MissingProperty {
            window: window.0,
            property: "_NET_WM_DESKTOP",
        })
    }

    fn last_focus_time(&self, window: WindowHandle) -> Result<u32> {
        self.get(window)?.user_time.ok_or(GatewayError::MissingProperty {
            window: window.0,
            property: "_NET_WM_USER_TIME",
        })
    }

    fn active_window(&self) -> Option<WindowHandle> {
        self.active
    }

    fn activate(&self, window: WindowHandle) {
        self.activated.borrow_mut().push(window);
    }
}
