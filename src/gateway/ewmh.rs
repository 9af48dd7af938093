//! EWMH (Extended Window Manager Hints) gateway
//!
//! Reads the client list and per-window properties that any EWMH compliant
//! window manager publishes, and asks it to activate windows through
//! client messages on the root window.

use std::sync::Arc;

use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::CURRENT_TIME;

use super::{
    is_selectable_window, Desktop, GatewayEvent, Result, WindowClass, WindowGateway, WindowHandle,
    WindowStates, WindowTypes,
};
use crate::error::GatewayError;
use crate::shared::{Point, Rect};

/// `_NET_ACTIVE_WINDOW` source indication for pagers and taskbars
const SOURCE_PAGER: u32 = 2;

/// Holds all interned atoms the gateway reads or sends
#[derive(Debug)]
pub struct Atoms {
    pub utf8_string: Atom,
    pub wm_class: Atom,
    pub wm_name: Atom,
    pub net_supporting_wm_check: Atom,
    pub net_client_list: Atom,
    pub net_current_desktop: Atom,
    pub net_active_window: Atom,
    pub net_wm_name: Atom,
    pub net_wm_visible_name: Atom,
    pub net_wm_desktop: Atom,
    pub net_wm_icon: Atom,
    pub net_wm_user_time: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_skip_taskbar: Atom,
    pub net_wm_state_skip_pager: Atom,
    pub net_wm_state_sticky: Atom,
    pub net_wm_state_hidden: Atom,
    pub net_wm_state_modal: Atom,
    pub net_wm_state_above: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_normal: Atom,
    pub net_wm_window_type_dialog: Atom,
    pub net_wm_window_type_utility: Atom,
    pub net_wm_window_type_desktop: Atom,
    pub net_wm_window_type_dock: Atom,
    pub net_wm_window_type_toolbar: Atom,
    pub net_wm_window_type_menu: Atom,
    pub net_wm_window_type_dropdown_menu: Atom,
    pub net_wm_window_type_popup_menu: Atom,
    pub net_wm_window_type_tooltip: Atom,
    pub net_wm_window_type_notification: Atom,
    pub net_wm_window_type_combo: Atom,
    pub net_wm_window_type_dnd: Atom,
    pub net_wm_window_type_splash: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            utf8_string: intern("UTF8_STRING")?,
            wm_class: AtomEnum::WM_CLASS.into(),
            wm_name: AtomEnum::WM_NAME.into(),
            net_supporting_wm_check: intern("_NET_SUPPORTING_WM_CHECK")?,
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_current_desktop: intern("_NET_CURRENT_DESKTOP")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_visible_name: intern("_NET_WM_VISIBLE_NAME")?,
            net_wm_desktop: intern("_NET_WM_DESKTOP")?,
            net_wm_icon: intern("_NET_WM_ICON")?,
            net_wm_user_time: intern("_NET_WM_USER_TIME")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_skip_taskbar: intern("_NET_WM_STATE_SKIP_TASKBAR")?,
            net_wm_state_skip_pager: intern("_NET_WM_STATE_SKIP_PAGER")?,
            net_wm_state_sticky: intern("_NET_WM_STATE_STICKY")?,
            net_wm_state_hidden: intern("_NET_WM_STATE_HIDDEN")?,
            net_wm_state_modal: intern("_NET_WM_STATE_MODAL")?,
            net_wm_state_above: intern("_NET_WM_STATE_ABOVE")?,
            net_wm_window_type: intern("_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_normal: intern("_NET_WM_WINDOW_TYPE_NORMAL")?,
            net_wm_window_type_dialog: intern("_NET_WM_WINDOW_TYPE_DIALOG")?,
            net_wm_window_type_utility: intern("_NET_WM_WINDOW_TYPE_UTILITY")?,
            net_wm_window_type_desktop: intern("_NET_WM_WINDOW_TYPE_DESKTOP")?,
            net_wm_window_type_dock: intern("_NET_WM_WINDOW_TYPE_DOCK")?,
            net_wm_window_type_toolbar: intern("_NET_WM_WINDOW_TYPE_TOOLBAR")?,
            net_wm_window_type_menu: intern("_NET_WM_WINDOW_TYPE_MENU")?,
            net_wm_window_type_dropdown_menu: intern("_NET_WM_WINDOW_TYPE_DROPDOWN_MENU")?,
            net_wm_window_type_popup_menu: intern("_NET_WM_WINDOW_TYPE_POPUP_MENU")?,
            net_wm_window_type_tooltip: intern("_NET_WM_WINDOW_TYPE_TOOLTIP")?,
            net_wm_window_type_notification: intern("_NET_WM_WINDOW_TYPE_NOTIFICATION")?,
            net_wm_window_type_combo: intern("_NET_WM_WINDOW_TYPE_COMBO")?,
            net_wm_window_type_dnd: intern("_NET_WM_WINDOW_TYPE_DND")?,
            net_wm_window_type_splash: intern("_NET_WM_WINDOW_TYPE_SPLASH")?,
        })
    }

    /// Map `_NET_WM_WINDOW_TYPE` atoms to flags. Unknown atoms are ignored.
    pub fn window_types(&self, atoms: &[Atom]) -> WindowTypes {
        let table = [
            (self.net_wm_window_type_normal, WindowTypes::NORMAL),
            (self.net_wm_window_type_dialog, WindowTypes::DIALOG),
            (self.net_wm_window_type_utility, WindowTypes::UTILITY),
            (self.net_wm_window_type_desktop, WindowTypes::DESKTOP),
            (self.net_wm_window_type_dock, WindowTypes::DOCK),
            (self.net_wm_window_type_toolbar, WindowTypes::TOOLBAR),
            (self.net_wm_window_type_menu, WindowTypes::MENU),
            (self.net_wm_window_type_dropdown_menu, WindowTypes::DROPDOWN_MENU),
            (self.net_wm_window_type_popup_menu, WindowTypes::POPUP_MENU),
            (self.net_wm_window_type_tooltip, WindowTypes::TOOLTIP),
            (self.net_wm_window_type_notification, WindowTypes::NOTIFICATION),
            (self.net_wm_window_type_combo, WindowTypes::COMBO),
            (self.net_wm_window_type_dnd, WindowTypes::DND),
            (self.net_wm_window_type_splash, WindowTypes::SPLASH),
        ];
        let mut types = WindowTypes::empty();
        for (atom, flag) in table {
            if atoms.contains(&atom) {
                types |= flag;
            }
        }
        types
    }

    /// Map `_NET_WM_STATE` atoms to flags. Unknown atoms are ignored.
    pub fn window_states(&self, atoms: &[Atom]) -> WindowStates {
        let table = [
            (self.net_wm_state_skip_taskbar, WindowStates::SKIP_TASKBAR),
            (self.net_wm_state_skip_pager, WindowStates::SKIP_PAGER),
            (self.net_wm_state_sticky, WindowStates::STICKY),
            (self.net_wm_state_hidden, WindowStates::HIDDEN),
            (self.net_wm_state_modal, WindowStates::MODAL),
            (self.net_wm_state_above, WindowStates::ABOVE),
        ];
        let mut states = WindowStates::empty();
        for (atom, flag) in table {
            if atoms.contains(&atom) {
                states |= flag;
            }
        }
        states
    }

    fn is_title(&self, atom: Atom) -> bool {
        atom == self.wm_name || atom == self.net_wm_name || atom == self.net_wm_visible_name
    }
}

/// Gateway backed by a live X11 connection
pub struct EwmhGateway {
    conn: Arc<RustConnection>,
    root: Window,
    atoms: Atoms,
    screen: Rect,
}

impl EwmhGateway {
    /// Connect to `$DISPLAY` and make sure the window manager speaks EWMH
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let conn = Arc::new(conn);
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let screen = Rect::new(
            0,
            0,
            screen.width_in_pixels as u32,
            screen.height_in_pixels as u32,
        );

        info!("Connected to X server, screen {}, root window {:#x}", screen_num, root);

        let atoms = Atoms::new(conn.as_ref())?;
        let gateway = Self {
            conn,
            root,
            atoms,
            screen,
        };

        if !gateway.supports_ewmh()? {
            return Err(GatewayError::EwmhUnsupported);
        }
        Ok(gateway)
    }

    pub fn connection(&self) -> Arc<RustConnection> {
        self.conn.clone()
    }

    /// Size of the root window
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Pointer position relative to the root window
    pub fn pointer_position(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;
        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    /// A compliant WM sets `_NET_SUPPORTING_WM_CHECK` to a child window that
    /// carries `_NET_WM_NAME`.
    fn supports_ewmh(&self) -> Result<bool> {
        let check = self.property32(self.root, self.atoms.net_supporting_wm_check, AtomEnum::WINDOW)?;
        let Some(&wm_window) = check.first() else {
            return Ok(false);
        };
        let name = self.text_property(wm_window, self.atoms.net_wm_name, self.atoms.utf8_string)?;
        debug!("Supporting WM check window {:#x}, name {:?}", wm_window, name);
        Ok(name.is_some())
    }

    /// Subscribe to property changes on the root window and on `windows`
    pub fn watch(&self, windows: &[WindowHandle]) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE);
        self.conn.change_window_attributes(self.root, &aux)?;
        for window in windows {
            if let Err(e) = self.conn.change_window_attributes(window.0, &aux) {
                debug!("Cannot watch window {}: {}", window, e);
            }
        }
        self.conn.flush()?;
        Ok(())
    }

    /// Translate an X11 event into a gateway notification
    pub fn translate(&self, event: &Event) -> Option<GatewayEvent> {
        let Event::PropertyNotify(ev) = event else {
            return None;
        };
        if ev.window == self.root {
            return (ev.atom == self.atoms.net_client_list).then_some(GatewayEvent::WindowListChanged);
        }
        let window = WindowHandle(ev.window);
        if self.atoms.is_title(ev.atom) {
            Some(GatewayEvent::TitleChanged(window))
        } else if ev.atom == self.atoms.net_wm_icon {
            Some(GatewayEvent::IconChanged(window))
        } else {
            None
        }
    }

    fn property32(&self, window: Window, property: Atom, ty: impl Into<Atom>) -> Result<Vec<u32>> {
        let reply = self
            .conn
            .get_property(false, window, property, ty, 0, 1024)?
            .reply()?;
        Ok(reply.value32().map(|v| v.collect()).unwrap_or_default())
    }

    fn raw_property(&self, window: Window, property: Atom, ty: impl Into<Atom>) -> Result<Vec<u8>> {
        let reply = self
            .conn
            .get_property(false, window, property, ty, 0, 1024)?
            .reply()?;
        Ok(reply.value)
    }

    fn text_property(&self, window: Window, property: Atom, ty: impl Into<Atom>) -> Result<Option<String>> {
        let value = self.raw_property(window, property, ty)?;
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&value).into_owned()))
    }

    fn cardinal(&self, window: Window, property: Atom, name: &'static str) -> Result<u32> {
        self.property32(window, property, AtomEnum::CARDINAL)?
            .first()
            .copied()
            .ok_or(GatewayError::MissingProperty {
                window,
                property: name,
            })
    }

    fn send_client_message(&self, window: Window, message_type: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, message_type, data);
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        Ok(())
    }

    fn try_activate(&self, window: WindowHandle) -> Result<()> {
        if let Ok(Desktop::Index(desktop)) = self.desktop_index(window) {
            self.send_client_message(
                self.root,
                self.atoms.net_current_desktop,
                [desktop, CURRENT_TIME, 0, 0, 0],
            )?;
        }
        self.send_client_message(
            window.0,
            self.atoms.net_active_window,
            [SOURCE_PAGER, CURRENT_TIME, 0, 0, 0],
        )?;
        self.conn.flush()?;
        Ok(())
    }
}

impl WindowGateway for EwmhGateway {
    fn list_windows(&self) -> Result<Vec<WindowHandle>> {
        let windows = self.property32(self.root, self.atoms.net_client_list, AtomEnum::WINDOW)?;
        debug!("_NET_CLIENT_LIST has {} windows", windows.len());
        Ok(windows.into_iter().map(WindowHandle).collect())
    }

    fn is_selectable(&self, window: WindowHandle) -> bool {
        let types = match self.property32(window.0, self.atoms.net_wm_window_type, AtomEnum::ATOM) {
            Ok(atoms) => self.atoms.window_types(&atoms),
            Err(e) => {
                debug!("Window {} vanished while reading its type: {}", window, e);
                return false;
            }
        };
        let states = self
            .property32(window.0, self.atoms.net_wm_state, AtomEnum::ATOM)
            .map(|atoms| self.atoms.window_states(&atoms))
            .unwrap_or_default();
        let desktop = self.desktop_index(window).ok();
        is_selectable_window(types, states, desktop)
    }

    fn title(&self, window: WindowHandle) -> Result<String> {
        let candidates = [
            (self.atoms.net_wm_visible_name, self.atoms.utf8_string),
            (self.atoms.net_wm_name, self.atoms.utf8_string),
            (self.atoms.wm_name, AtomEnum::ANY.into()),
        ];
        for (property, ty) in candidates {
            if let Some(title) = self.text_property(window.0, property, ty)? {
                return Ok(title);
            }
        }
        Err(GatewayError::MissingProperty {
            window: window.0,
            property: "WM_NAME",
        })
    }

    fn identity_class(&self, window: WindowHandle) -> Result<WindowClass> {
        let raw = self.raw_property(window.0, self.atoms.wm_class, AtomEnum::STRING)?;
        if raw.is_empty() {
            return Err(GatewayError::MissingProperty {
                window: window.0,
                property: "WM_CLASS",
            });
        }
        Ok(WindowClass::from_raw(&raw))
    }

    fn desktop_index(&self, window: WindowHandle) -> Result<Desktop> {
        self.cardinal(window.0, self.atoms.net_wm_desktop, "_NET_WM_DESKTOP")
            .map(Desktop::from_cardinal)
    }

    fn last_focus_time(&self, window: WindowHandle) -> Result<u32> {
        self.cardinal(window.0, self.atoms.net_wm_user_time, "_NET_WM_USER_TIME")
    }

    fn active_window(&self) -> Option<WindowHandle> {
        match self.property32(self.root, self.atoms.net_active_window, AtomEnum::WINDOW) {
            Ok(values) => values.first().copied().filter(|&w| w != 0).map(WindowHandle),
            Err(e) => {
                warn!("Failed to read _NET_ACTIVE_WINDOW: {}", e);
                None
            }
        }
    }

    fn activate(&self, window: WindowHandle) {
        debug!("Activating window {}", window);
        if let Err(e) = self.try_activate(window) {
            warn!("Failed to activate window {}: {}", window, e);
        }
    }
}
