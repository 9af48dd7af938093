//! Most-recently-used window ranking

use std::cmp::Reverse;

use tracing::{debug, warn};

use super::color::ColorOptions;
use super::item::Item;
use crate::gateway::{WindowGateway, WindowHandle};

/// Shown when a window has no readable title
pub const EMPTY_TITLE: &str = "<empty>";

#[derive(Debug, Clone, Default)]
pub struct RankedWindows {
    pub items: Vec<Item>,
    /// Window placed first. When the requested active window was not in the
    /// list this is whatever ended up first, so later refreshes keep it
    /// pinned.
    pub active: Option<WindowHandle>,
}

/// Enumerate selectable windows, active one first, the rest by last focus
/// time, most recent first. Ties keep enumeration order.
pub fn rank_windows<G>(
    gateway: &G,
    own_window: Option<WindowHandle>,
    active: Option<WindowHandle>,
    colors: &ColorOptions,
) -> RankedWindows
where
    G: WindowGateway + ?Sized,
{
    let listed = match gateway.list_windows() {
        Ok(listed) => listed,
        Err(err) => {
            warn!("Failed to enumerate windows: {}", err);
            return RankedWindows::default();
        }
    };

    let mut handles: Vec<WindowHandle> = Vec::with_capacity(listed.len());
    for handle in listed {
        if Some(handle) == own_window || handles.contains(&handle) {
            continue;
        }
        if gateway.is_selectable(handle) {
            handles.push(handle);
        }
    }

    if let Some(pos) = active.and_then(|a| handles.iter().position(|&h| h == a)) {
        let handle = handles.remove(pos);
        handles.insert(0, handle);
    }
    let active = handles.first().copied();

    let mut timed: Vec<(WindowHandle, u32)> = handles
        .into_iter()
        .map(|h| (h, gateway.last_focus_time(h).unwrap_or(0)))
        .collect();
    if timed.len() > 1 {
        timed[1..].sort_by_key(|&(_, time)| Reverse(time));
    }

    let items = timed
        .into_iter()
        .map(|(handle, _)| {
            let title = gateway
                .title(handle)
                .unwrap_or_else(|_| EMPTY_TITLE.to_string());
            let class = gateway.identity_class(handle).unwrap_or_else(|err| {
                debug!("No class for {}: {}", handle, err);
                Default::default()
            });
            let desktop = gateway.desktop_index(handle).ok();
            let mut item = Item::window(handle, title, class, desktop);
            item.apply_colors(colors);
            item
        })
        .collect();

    RankedWindows { items, active }
}
