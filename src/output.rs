//! Text and JSON rendering of a session

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use winmosaic::gateway::WindowHandle;
use winmosaic::mosaic::item::Selectable;
use winmosaic::shared::geometry::Rect;
use winmosaic::Session;

#[derive(Debug, Serialize)]
struct BoxView<'a> {
    index: usize,
    focused: bool,
    rect: Rect,
    color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    desktop: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<WindowHandle>,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct MosaicView<'a> {
    query: &'a str,
    total: usize,
    matched: usize,
    boxes: Vec<BoxView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_box: Option<Rect>,
}

fn view(session: &Session, show_desktop: bool) -> MosaicView<'_> {
    let focus = session.focus();
    let boxes = session
        .visible()
        .map(|(index, item, rect)| BoxView {
            index,
            focused: focus == Some(index),
            rect,
            color: item.color().to_string(),
            desktop: item.desktop_label().filter(|_| show_desktop),
            window: item.handle(),
            name: item.display_name(),
        })
        .collect();

    MosaicView {
        query: session.query().as_str(),
        total: session.items().len(),
        matched: session.shown().len(),
        boxes,
        search_box: (!session.query().is_empty()).then(|| session.search_box()),
    }
}

pub fn print(out: &mut impl Write, session: &Session, show_desktop: bool, json: bool) -> Result<()> {
    let view = view(session, show_desktop);

    if json {
        serde_json::to_writer_pretty(&mut *out, &view).context("Failed to encode mosaic")?;
        writeln!(out)?;
        return Ok(());
    }

    for b in &view.boxes {
        let desktop = b.desktop.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "{}{:>3} {:>5},{:<5} {}x{} {} {:>2} {}",
            if b.focused { '*' } else { ' ' },
            b.index,
            b.rect.x,
            b.rect.y,
            b.rect.width,
            b.rect.height,
            b.color,
            desktop,
            b.name
        )?;
    }
    if view.boxes.len() < view.matched {
        writeln!(out, "# {} of {} matches did not fit", view.matched - view.boxes.len(), view.matched)?;
    }
    Ok(())
}
