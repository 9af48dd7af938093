//! Switcher session
//!
//! Owns the item list, the current query, the layout and the focused box.
//! The front end feeds it key presses and gateway events and redraws
//! according to the returned [`SessionUpdate`].

use tracing::{debug, info};

use super::color::ColorOptions;
use super::item::{Item, Selectable};
use super::layout::{self, LayoutGeometry, Placement};
use super::ranker::{self, EMPTY_TITLE};
use super::search::{self, Query};
use crate::gateway::{GatewayEvent, WindowGateway, WindowHandle};
use crate::shared::geometry::{Point, Rect};

pub use super::item::Selection;

/// What the renderer has to do after a session call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Positions changed; redraw everything
    Relayout,
    /// Only the item at this index in [`Session::items`] changed
    Repaint(usize),
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub colors: ColorOptions,
    /// Selecting with no match yields the raw query
    pub launcher_mode: bool,
    pub search_box_width: u32,
    pub search_box_height: u32,
    /// Our own window, never listed
    pub own_window: Option<WindowHandle>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            colors: ColorOptions::default(),
            launcher_mode: false,
            search_box_width: 240,
            search_box_height: 28,
            own_window: None,
        }
    }
}

pub struct Session {
    geometry: LayoutGeometry,
    options: SessionOptions,
    /// Full list: ranked windows or text items
    items: Vec<Item>,
    /// Indices into `items` that match the query, in display order
    shown: Vec<usize>,
    query: Query,
    placement: Placement,
    /// Window kept in front across refreshes
    pinned: Option<WindowHandle>,
}

impl Session {
    pub fn new(geometry: LayoutGeometry, options: SessionOptions) -> Self {
        Self {
            geometry,
            options,
            items: Vec::new(),
            shown: Vec::new(),
            query: Query::default(),
            placement: Placement::default(),
            pinned: None,
        }
    }

    /// Replace the item list with text items
    pub fn load_items(&mut self, mut items: Vec<Item>) -> SessionUpdate {
        for item in &mut items {
            item.apply_colors(&self.options.colors);
        }
        self.items = items;
        self.refilter(0);
        SessionUpdate::Relayout
    }

    /// Re-enumerate windows. The focus index is kept where possible.
    pub fn refresh_windows<G>(&mut self, gateway: &G) -> SessionUpdate
    where
        G: WindowGateway + ?Sized,
    {
        let focus = self.placement.focus.unwrap_or(0);
        let active = self.pinned.or_else(|| gateway.active_window());
        let ranked = ranker::rank_windows(gateway, self.options.own_window, active, &self.options.colors);
        self.pinned = ranked.active;
        debug!(count = ranked.items.len(), "window list refreshed");
        self.items = ranked.items;
        self.refilter(focus);
        SessionUpdate::Relayout
    }

    pub fn handle_event<G>(&mut self, gateway: &G, event: GatewayEvent) -> SessionUpdate
    where
        G: WindowGateway + ?Sized,
    {
        match event {
            GatewayEvent::WindowListChanged => self.refresh_windows(gateway),
            GatewayEvent::TitleChanged(handle) => match self.index_of(handle) {
                Some(index) => {
                    let title = gateway
                        .title(handle)
                        .unwrap_or_else(|_| EMPTY_TITLE.to_string());
                    self.items[index].display_name = title;
                    SessionUpdate::Repaint(index)
                }
                None => SessionUpdate::Unchanged,
            },
            GatewayEvent::IconChanged(handle) => match self.index_of(handle) {
                Some(index) => SessionUpdate::Repaint(index),
                None => SessionUpdate::Unchanged,
            },
        }
    }

    /// Apply a batch of events; the result covers the whole batch
    pub fn handle_events<G, I>(&mut self, gateway: &G, events: I) -> SessionUpdate
    where
        G: WindowGateway + ?Sized,
        I: IntoIterator<Item = GatewayEvent>,
    {
        let mut merged = SessionUpdate::Unchanged;
        for event in events {
            merged = match (merged, self.handle_event(gateway, event)) {
                (SessionUpdate::Relayout, _) | (_, SessionUpdate::Relayout) => SessionUpdate::Relayout,
                (SessionUpdate::Repaint(a), SessionUpdate::Repaint(b)) if a != b => SessionUpdate::Relayout,
                (SessionUpdate::Unchanged, update) => update,
                (update, _) => update,
            };
        }
        merged
    }

    pub fn set_query(&mut self, query: &str) -> SessionUpdate {
        if query == self.query.as_str() {
            return SessionUpdate::Unchanged;
        }
        self.query = Query::new(query);
        self.refilter(0);
        SessionUpdate::Relayout
    }

    pub fn push_query(&mut self, c: char) -> SessionUpdate {
        self.query.push(c);
        self.refilter(0);
        SessionUpdate::Relayout
    }

    pub fn pop_query(&mut self) -> SessionUpdate {
        if !self.query.pop() {
            return SessionUpdate::Unchanged;
        }
        self.refilter(0);
        SessionUpdate::Relayout
    }

    pub fn clear_query(&mut self) -> SessionUpdate {
        self.set_query("")
    }

    /// Launcher mode: replace the query with the focused box's name
    pub fn complete_query(&mut self) -> SessionUpdate {
        if !self.options.launcher_mode {
            return SessionUpdate::Unchanged;
        }
        let Some(name) = self.focused_item().map(|item| item.display_name.clone()) else {
            return SessionUpdate::Unchanged;
        };
        self.set_query(&name)
    }

    pub fn set_geometry(&mut self, geometry: LayoutGeometry) -> SessionUpdate {
        if geometry == self.geometry {
            return SessionUpdate::Unchanged;
        }
        self.geometry = geometry;
        self.relayout(self.placement.focus.unwrap_or(0));
        SessionUpdate::Relayout
    }

    pub fn focus_next(&mut self) -> SessionUpdate {
        self.step_focus(true)
    }

    pub fn focus_prev(&mut self) -> SessionUpdate {
        self.step_focus(false)
    }

    /// Move focus to the nearest placed box in `direction`
    pub fn move_focus(&mut self, direction: Direction) -> SessionUpdate {
        let Some(current) = self.placement.focus else {
            return SessionUpdate::Unchanged;
        };
        match nearest_in_direction(&self.placement.rects, current, direction) {
            Some(index) => {
                self.placement.focus = Some(index);
                SessionUpdate::Relayout
            }
            None => SessionUpdate::Unchanged,
        }
    }

    /// Focus whichever placed box contains `point`
    pub fn focus_at(&mut self, point: Point) -> Option<usize> {
        let index = self.placement.rects.iter().position(|r| r.contains_point(point))?;
        self.placement.focus = Some(index);
        Some(index)
    }

    /// Choose the focused box.
    ///
    /// In launcher mode, with nothing to choose, the raw query is returned.
    pub fn activate_focused<G>(&self, gateway: &G) -> Option<Selection>
    where
        G: WindowGateway + ?Sized,
    {
        match self.focused_item() {
            Some(item) => {
                let selection = item.on_activate(gateway);
                info!(?selection, "selected");
                Some(selection)
            }
            None if self.options.launcher_mode && !self.query.is_empty() => {
                Some(Selection::Query(self.query.as_str().to_string()))
            }
            None => None,
        }
    }

    /// Rectangles the renderer must keep visible: placed boxes plus the
    /// search box while a query is typed
    pub fn occupied_area(&self) -> Vec<Rect> {
        let mut area = self.placement.rects.clone();
        if !self.query.is_empty() {
            area.push(self.search_box());
        }
        area
    }

    /// Where the query is drawn: centered horizontally, one box height above
    /// the bottom edge
    pub fn search_box(&self) -> Rect {
        let width = self.options.search_box_width;
        let height = self.options.search_box_height;
        let x = self.geometry.viewport_width.saturating_sub(width) / 2;
        let y = self
            .geometry
            .viewport_height
            .saturating_sub(height)
            .saturating_sub(self.geometry.box_height);
        Rect::new(x as i32, y as i32, width, height)
    }

    /// Placed items in display order, with their layout index and box
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Item, Rect)> {
        self.shown
            .iter()
            .zip(&self.placement.rects)
            .enumerate()
            .map(|(slot, (&index, rect))| (slot, &self.items[index], *rect))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Indices into [`Session::items`] matching the query
    pub fn shown(&self) -> &[usize] {
        &self.shown
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    /// Position of the focused box within [`Session::visible`]
    pub fn focus(&self) -> Option<usize> {
        self.placement.focus
    }

    pub fn focused_item(&self) -> Option<&Item> {
        let index = *self.shown.get(self.placement.focus?)?;
        self.items.get(index)
    }

    fn index_of(&self, handle: WindowHandle) -> Option<usize> {
        self.items.iter().position(|item| item.handle() == Some(handle))
    }

    fn step_focus(&mut self, forward: bool) -> SessionUpdate {
        let placed = self.placement.placed();
        let Some(current) = self.placement.focus else {
            return SessionUpdate::Unchanged;
        };
        if placed < 2 {
            return SessionUpdate::Unchanged;
        }
        let next = if forward {
            (current + 1) % placed
        } else {
            (current + placed - 1) % placed
        };
        self.placement.focus = Some(next);
        SessionUpdate::Relayout
    }

    fn refilter(&mut self, focus: usize) {
        self.shown = search::filter(&self.items, &self.query);
        self.relayout(focus);
    }

    fn relayout(&mut self, focus: usize) {
        self.placement = layout::place(self.shown.len(), &self.geometry, focus);
        for item in &mut self.items {
            item.position = None;
        }
        for (&index, rect) in self.shown.iter().zip(&self.placement.rects) {
            self.items[index].position = Some(*rect);
        }
    }
}

/// Closest box whose center lies in `direction`, by distance along the
/// direction and then across it
fn nearest_in_direction(rects: &[Rect], current: usize, direction: Direction) -> Option<usize> {
    let from = rects.get(current)?.center();
    rects
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != current)
        .filter_map(|(i, rect)| {
            let to = rect.center();
            let (along, across) = match direction {
                Direction::Left => (from.x as i64 - to.x as i64, to.y as i64 - from.y as i64),
                Direction::Right => (to.x as i64 - from.x as i64, to.y as i64 - from.y as i64),
                Direction::Up => (from.y as i64 - to.y as i64, to.x as i64 - from.x as i64),
                Direction::Down => (to.y as i64 - from.y as i64, to.x as i64 - from.x as i64),
            };
            (along > 0).then_some((along, across.abs(), i))
        })
        .min()
        .map(|(_, _, index)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryWindow;
    use crate::gateway::MemoryGateway;
    use crate::mosaic::item::TextMeta;

    fn geometry() -> LayoutGeometry {
        LayoutGeometry::centered(1000, 600, 200, 40).unwrap()
    }

    fn text_session(names: &[&str], options: SessionOptions) -> Session {
        let mut session = Session::new(geometry(), options);
        session.load_items(names.iter().map(|n| Item::text(*n, TextMeta::default())).collect());
        session
    }

    fn visible_names(session: &Session) -> Vec<&str> {
        session.visible().map(|(_, i, _)| i.display_name.as_str()).collect()
    }

    #[test]
    fn test_query_filters_and_resets_focus() {
        let mut session = text_session(&["git", "gitk", "Gimp", "vim"], SessionOptions::default());
        session.focus_next();
        session.focus_next();
        assert_eq!(session.focus(), Some(2));

        assert_eq!(session.set_query("git"), SessionUpdate::Relayout);
        assert_eq!(visible_names(&session), vec!["git", "gitk"]);
        assert_eq!(session.focus(), Some(0));
        assert_eq!(session.items()[2].position, None);

        session.pop_query();
        session.pop_query();
        assert_eq!(visible_names(&session), vec!["git", "gitk", "Gimp"]);
        assert_eq!(session.clear_query(), SessionUpdate::Relayout);
        assert_eq!(visible_names(&session), vec!["git", "gitk", "Gimp", "vim"]);
        assert_eq!(session.clear_query(), SessionUpdate::Unchanged);
    }

    #[test]
    fn test_focus_wraps() {
        let mut session = text_session(&["a", "b", "c"], SessionOptions::default());
        session.focus_prev();
        assert_eq!(session.focus(), Some(2));
        session.focus_next();
        assert_eq!(session.focus(), Some(0));
    }

    #[test]
    fn test_move_focus() {
        // a center, b above, c right, d below, e left
        let mut session = text_session(&["a", "b", "c", "d", "e"], SessionOptions::default());
        assert_eq!(session.move_focus(Direction::Right), SessionUpdate::Relayout);
        assert_eq!(session.focused_item().map(|i| i.display_name.as_str()), Some("c"));
        session.move_focus(Direction::Left);
        assert_eq!(session.focused_item().map(|i| i.display_name.as_str()), Some("a"));
        session.move_focus(Direction::Up);
        assert_eq!(session.focused_item().map(|i| i.display_name.as_str()), Some("b"));
        assert_eq!(session.move_focus(Direction::Up), SessionUpdate::Unchanged);
    }

    #[test]
    fn test_move_focus_prefers_primary_axis() {
        let rects = [
            Rect::new(0, 0, 100, 100),
            Rect::new(150, 200, 100, 100),
            Rect::new(400, 0, 100, 100),
            Rect::new(150, -200, 100, 100),
        ];
        // the offset box is closer along the axis than the aligned one
        assert_eq!(nearest_in_direction(&rects, 0, Direction::Right), Some(1));
        assert_eq!(nearest_in_direction(&rects, 2, Direction::Left), Some(1));
        assert_eq!(nearest_in_direction(&rects, 0, Direction::Down), Some(1));
        assert_eq!(nearest_in_direction(&rects, 0, Direction::Up), Some(3));
        assert_eq!(nearest_in_direction(&rects, 3, Direction::Up), None);
        assert_eq!(nearest_in_direction(&rects, 9, Direction::Up), None);
    }

    #[test]
    fn test_complete_query() {
        let options = SessionOptions {
            launcher_mode: true,
            ..Default::default()
        };
        let mut session = text_session(&["firefox", "xterm", "xfce4-terminal"], options);
        session.set_query("x");
        assert_eq!(visible_names(&session), vec!["xterm", "xfce4-terminal", "firefox"]);
        session.focus_next();

        assert_eq!(session.complete_query(), SessionUpdate::Relayout);
        assert_eq!(session.query().as_str(), "xfce4-terminal");
        assert_eq!(visible_names(&session), vec!["xfce4-terminal"]);
        assert_eq!(session.complete_query(), SessionUpdate::Unchanged);

        session.set_query("zzz");
        assert_eq!(session.complete_query(), SessionUpdate::Unchanged);
        assert_eq!(session.query().as_str(), "zzz");
    }

    #[test]
    fn test_complete_query_needs_launcher_mode() {
        let mut session = text_session(&["firefox"], SessionOptions::default());
        session.set_query("fi");
        assert_eq!(session.complete_query(), SessionUpdate::Unchanged);
        assert_eq!(session.query().as_str(), "fi");
    }

    #[test]
    fn test_launcher_returns_query() {
        let options = SessionOptions {
            launcher_mode: true,
            ..Default::default()
        };
        let mut session = text_session(&["firefox", "xterm"], options);
        let gw = MemoryGateway::default();

        session.set_query("term");
        assert_eq!(session.activate_focused(&gw), Some(Selection::Text("xterm".into())));

        session.set_query("htop");
        assert_eq!(session.activate_focused(&gw), Some(Selection::Query("htop".into())));
    }

    #[test]
    fn test_no_selection_without_launcher() {
        let mut session = text_session(&["firefox"], SessionOptions::default());
        session.set_query("zzz");
        assert_eq!(session.activate_focused(&MemoryGateway::default()), None);
    }

    #[test]
    fn test_occupied_area_includes_search_box() {
        let mut session = text_session(&["alpha"], SessionOptions::default());
        assert_eq!(session.occupied_area(), vec![Rect::new(400, 280, 200, 40)]);

        session.set_query("al");
        assert_eq!(
            session.occupied_area(),
            vec![Rect::new(400, 280, 200, 40), Rect::new(380, 532, 240, 28)]
        );
    }

    #[test]
    fn test_title_change_repaints_only() {
        let mut gw = MemoryGateway::new(vec![
            MemoryWindow::new(1, "one", "A").with_time(5),
            MemoryWindow::new(2, "two", "B").with_time(9),
        ]);
        let mut session = Session::new(geometry(), SessionOptions::default());
        session.refresh_windows(&gw);
        let before: Vec<_> = session.items().iter().map(|i| i.position).collect();

        gw.set_title(WindowHandle(2), "renamed");
        let update = session.handle_event(&gw, GatewayEvent::TitleChanged(WindowHandle(2)));
        assert_eq!(update, SessionUpdate::Repaint(1));
        assert_eq!(session.items()[1].display_name, "renamed");
        let after: Vec<_> = session.items().iter().map(|i| i.position).collect();
        assert_eq!(before, after);

        assert_eq!(
            session.handle_event(&gw, GatewayEvent::IconChanged(WindowHandle(42))),
            SessionUpdate::Unchanged
        );
    }

    #[test]
    fn test_refresh_keeps_focus_index() {
        let mut gw = MemoryGateway::new(vec![
            MemoryWindow::new(1, "one", "A"),
            MemoryWindow::new(2, "two", "B"),
            MemoryWindow::new(3, "three", "C"),
        ]);
        let mut session = Session::new(geometry(), SessionOptions::default());
        session.refresh_windows(&gw);
        session.focus_next();
        session.focus_next();
        assert_eq!(session.focus(), Some(2));

        gw.remove(WindowHandle(3));
        let update = session.handle_event(&gw, GatewayEvent::WindowListChanged);
        assert_eq!(update, SessionUpdate::Relayout);
        assert_eq!(session.focus(), Some(1));
    }

    #[test]
    fn test_select_window_activates() {
        let gw = MemoryGateway::new(vec![MemoryWindow::new(7, "editor", "Gvim")]);
        let mut session = Session::new(geometry(), SessionOptions::default());
        session.refresh_windows(&gw);
        assert_eq!(session.activate_focused(&gw), Some(Selection::Window(WindowHandle(7))));
        assert_eq!(gw.activated(), vec![WindowHandle(7)]);
    }

    #[test]
    fn test_activate_through_trait_object() {
        let gw = MemoryGateway::new(vec![MemoryWindow::new(7, "editor", "Gvim")]);
        let gateway: &dyn WindowGateway = &gw;
        let mut session = Session::new(geometry(), SessionOptions::default());
        session.refresh_windows(gateway);
        assert_eq!(
            session.activate_focused(gateway),
            Some(Selection::Window(WindowHandle(7)))
        );
        assert_eq!(gw.activated(), vec![WindowHandle(7)]);
    }

    #[test]
    fn test_event_batches() {
        let mut gw = MemoryGateway::new(vec![
            MemoryWindow::new(1, "one", "A").with_time(5),
            MemoryWindow::new(2, "two", "B").with_time(9),
        ]);
        let mut session = Session::new(geometry(), SessionOptions::default());
        session.refresh_windows(&gw);

        assert_eq!(session.handle_events(&gw, []), SessionUpdate::Unchanged);

        gw.set_title(WindowHandle(2), "renamed");
        let update = session.handle_events(
            &gw,
            [
                GatewayEvent::IconChanged(WindowHandle(42)),
                GatewayEvent::TitleChanged(WindowHandle(2)),
                GatewayEvent::IconChanged(WindowHandle(2)),
            ],
        );
        assert_eq!(update, SessionUpdate::Repaint(1));
        assert_eq!(session.items()[1].display_name, "renamed");

        let update = session.handle_events(
            &gw,
            [
                GatewayEvent::TitleChanged(WindowHandle(1)),
                GatewayEvent::TitleChanged(WindowHandle(2)),
            ],
        );
        assert_eq!(update, SessionUpdate::Relayout);

        // a window appearing mid-batch is picked up by the same batch
        gw.push(MemoryWindow::new(3, "three", "C").with_time(1));
        let update = session.handle_events(
            &gw,
            [
                GatewayEvent::TitleChanged(WindowHandle(1)),
                GatewayEvent::WindowListChanged,
            ],
        );
        assert_eq!(update, SessionUpdate::Relayout);
        assert_eq!(session.items().len(), 3);
    }

    #[test]
    fn test_focus_at_point() {
        let mut session = text_session(&["a", "b", "c"], SessionOptions::default());
        assert_eq!(session.focus_at(Point::new(650, 290)), Some(2));
        assert_eq!(session.focus(), Some(2));
        assert_eq!(session.focus_at(Point::new(5, 5)), None);
    }
}
