use pretty_assertions::assert_eq;

use winmosaic::gateway::memory::MemoryWindow;
use winmosaic::gateway::{Desktop, GatewayEvent, MemoryGateway, WindowHandle, WindowStates};
use winmosaic::mosaic::layout::LayoutGeometry;
use winmosaic::mosaic::records::{self, InputFormat};
use winmosaic::mosaic::session::Direction;
use winmosaic::mosaic::{ColorOptions, Rgb};
use winmosaic::{Selection, Session, SessionOptions, SessionUpdate};

fn desk() -> MemoryGateway {
    let mut gw = MemoryGateway::new(vec![
        MemoryWindow::new(0x100, "Inbox - Mail", "Thunderbird").with_time(40),
        MemoryWindow::new(0x200, "~/src/winmosaic", "XTerm").with_time(90),
        MemoryWindow::new(0x300, "Mozilla Firefox", "Firefox")
            .with_time(70)
            .with_desktop(Desktop::Index(1)),
        MemoryWindow::new(0x400, "tray", "Stalonetray").with_states(WindowStates::SKIP_TASKBAR),
        MemoryWindow::new(0x500, "switcher", "Winmosaic").with_time(99),
    ]);
    gw.set_active(Some(WindowHandle(0x100)));
    gw
}

fn names(session: &Session) -> Vec<String> {
    session
        .visible()
        .map(|(_, item, _)| item.display_name.clone())
        .collect()
}

fn options() -> SessionOptions {
    SessionOptions {
        own_window: Some(WindowHandle(0x500)),
        ..Default::default()
    }
}

#[test]
fn switch_to_window_by_typing() {
    let gw = desk();
    let geometry = LayoutGeometry::centered(1280, 800, 200, 40).unwrap();
    let mut session = Session::new(geometry, options());

    assert_eq!(session.refresh_windows(&gw), SessionUpdate::Relayout);
    assert_eq!(
        names(&session),
        vec!["Inbox - Mail", "~/src/winmosaic", "Mozilla Firefox"]
    );

    for c in "fox".chars() {
        session.push_query(c);
    }
    assert_eq!(names(&session), vec!["Mozilla Firefox"]);
    assert_eq!(session.focused_item().and_then(|i| i.desktop_label()), Some(2));

    assert_eq!(
        session.activate_focused(&gw),
        Some(Selection::Window(WindowHandle(0x300)))
    );
    assert_eq!(gw.activated(), vec![WindowHandle(0x300)]);
}

#[test]
fn window_list_changes_keep_active_in_front() {
    let mut gw = desk();
    let geometry = LayoutGeometry::centered(1280, 800, 200, 40).unwrap();
    let mut session = Session::new(geometry, options());
    session.refresh_windows(&gw);

    // the window manager now reports another active window; the one that
    // was active when the session started stays first
    gw.set_active(Some(WindowHandle(0x200)));
    gw.push(MemoryWindow::new(0x600, "notes.txt - gvim", "Gvim").with_time(95));
    let update = session.handle_event(&gw, GatewayEvent::WindowListChanged);
    assert_eq!(update, SessionUpdate::Relayout);
    assert_eq!(
        names(&session),
        vec![
            "Inbox - Mail",
            "notes.txt - gvim",
            "~/src/winmosaic",
            "Mozilla Firefox"
        ]
    );

    // once it is gone, the first window in enumeration order takes its place
    gw.remove(WindowHandle(0x100));
    session.handle_event(&gw, GatewayEvent::WindowListChanged);
    assert_eq!(
        names(&session),
        vec!["~/src/winmosaic", "notes.txt - gvim", "Mozilla Firefox"]
    );
}

#[test]
fn query_survives_refresh() {
    let mut gw = desk();
    let geometry = LayoutGeometry::centered(1280, 800, 200, 40).unwrap();
    let mut session = Session::new(geometry, options());
    session.refresh_windows(&gw);
    session.set_query("xt");

    // only the terminal matches, through its class
    assert_eq!(names(&session), vec!["~/src/winmosaic"]);

    gw.push(MemoryWindow::new(0x700, "xterm", "XTerm").with_time(1));
    session.handle_event(&gw, GatewayEvent::WindowListChanged);
    assert_eq!(names(&session), vec!["xterm", "~/src/winmosaic"]);
}

#[test]
fn stdin_records_pick_alt_name() {
    let input = "0,#3366cc,utilities-terminal,Terminal,xterm -e htop\n\
                 ,,*,Browser,firefox\n\
                 1,,/opt/icons/editor.png,Editor,\n";
    let items = records::read_items(input.as_bytes(), InputFormat::Records).unwrap();
    let geometry = LayoutGeometry::centered(1000, 600, 200, 40).unwrap();
    let mut session = Session::new(
        geometry,
        SessionOptions {
            colors: ColorOptions {
                colorize: true,
                hue_offset: 17,
            },
            ..Default::default()
        },
    );
    session.load_items(items);

    let colors: Vec<Rgb> = session.visible().map(|(_, item, _)| item.color).collect();
    assert_eq!(colors[0].to_u32(), 0x3366cc);
    assert_ne!(colors[1], Rgb::NEUTRAL);

    let gw = MemoryGateway::default();
    assert_eq!(
        session.activate_focused(&gw),
        Some(Selection::Text("xterm -e htop".into()))
    );

    session.move_focus(Direction::Up);
    assert_eq!(
        session.activate_focused(&gw),
        Some(Selection::Text("firefox".into()))
    );
    session.move_focus(Direction::Right);
    assert_eq!(
        session.activate_focused(&gw),
        Some(Selection::Text("Editor".into()))
    );
    assert!(gw.activated().is_empty());
}

#[test]
fn crowded_viewport_places_what_fits() {
    let gw = MemoryGateway::new(
        (1..=40)
            .map(|i| MemoryWindow::new(i, &format!("window {i}"), "App").with_time(i))
            .collect(),
    );
    let geometry = LayoutGeometry::centered(400, 120, 200, 40).unwrap();
    let mut session = Session::new(geometry, SessionOptions::default());
    session.refresh_windows(&gw);

    let placed = session.visible().count();
    assert!(placed > 0 && placed < 40);
    assert_eq!(session.shown().len(), 40);
    let viewport = geometry.viewport();
    assert!(session
        .visible()
        .all(|(_, _, rect)| rect.is_inside(&viewport)));
    assert_eq!(session.occupied_area().len(), placed);
}
