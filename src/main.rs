//! winmosaic
//!
//! Headless front end for the mosaic core: builds a session from the running
//! EWMH window manager or from stdin, then prints the mosaic, selects the
//! focused box, or follows window changes.

mod cli;
mod output;

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use winmosaic::config::Config;
use winmosaic::gateway::event_stream::EventStream;
use winmosaic::gateway::{EwmhGateway, GatewayEvent, MemoryGateway, WindowGateway};
use winmosaic::mosaic::layout::LayoutGeometry;
use winmosaic::mosaic::records::{self, InputFormat};
use winmosaic::shared::geometry::{Point, Rect};
use winmosaic::{Selection, Session, SessionOptions, SessionUpdate};

use cli::{Args, Settings};

/// Used for stdin mode when no viewport is given
const FALLBACK_VIEWPORT: (u32, u32) = (1920, 1080);

fn build_geometry(args: &Args, settings: &Settings, screen: Rect, pointer: Option<Point>) -> Result<LayoutGeometry> {
    let (width, height) = args.viewport.unwrap_or((screen.width, screen.height));
    let mut geometry = LayoutGeometry::centered(width, height, settings.box_width, settings.box_height)?;

    if let Some(center) = args.center {
        geometry.center = center;
    } else if let Some(pointer) = pointer {
        geometry.center = pointer;
        geometry.clamp_center();
    }
    debug!("Layout geometry: {:?}", geometry);
    Ok(geometry)
}

fn session_options(args: &Args, settings: &Settings) -> SessionOptions {
    SessionOptions {
        colors: settings.colors,
        launcher_mode: args.launcher_mode,
        search_box_width: settings.search_box.0,
        search_box_height: settings.search_box.1,
        own_window: None,
    }
}

fn finish(session: &Session, gateway: &impl WindowGateway, args: &Args, settings: &Settings) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.select {
        match session.activate_focused(gateway) {
            Some(Selection::Window(handle)) => info!("Activated window {}", handle),
            Some(Selection::Text(text)) | Some(Selection::Query(text)) => writeln!(out, "{}", text)?,
            None => warn!("Nothing to select"),
        }
    } else {
        output::print(&mut out, session, settings.show_desktop, args.json)?;
    }

    out.flush().context("Failed to write to stdout")?;
    Ok(())
}

fn run_stdin(args: &Args, settings: &Settings) -> Result<()> {
    if settings.at_pointer {
        warn!("--at-pointer has no effect when reading stdin");
    }
    let (width, height) = FALLBACK_VIEWPORT;
    let screen = Rect::new(0, 0, width, height);
    let geometry = build_geometry(args, settings, screen, None)?;

    let format = if args.records {
        InputFormat::Records
    } else {
        InputFormat::Plain
    };
    let items = records::read_items(io::stdin().lock(), format)?;
    info!("Read {} items from stdin", items.len());

    let mut session = Session::new(geometry, session_options(args, settings));
    session.load_items(items);
    if let Some(query) = &args.query {
        session.set_query(query);
    }

    finish(&session, &MemoryGateway::default(), args, settings)
}

async fn run_windows(args: &Args, settings: &Settings) -> Result<()> {
    let gateway = EwmhGateway::connect().context("Failed to connect to the window manager")?;

    let pointer = if settings.at_pointer {
        match gateway.pointer_position() {
            Ok(point) => Some(point),
            Err(e) => {
                warn!("Failed to query pointer: {}", e);
                None
            }
        }
    } else {
        None
    };
    let geometry = build_geometry(args, settings, gateway.screen(), pointer)?;

    let mut session = Session::new(geometry, session_options(args, settings));
    session.refresh_windows(&gateway);
    if let Some(query) = &args.query {
        session.set_query(query);
    }

    if !args.watch {
        return finish(&session, &gateway, args, settings);
    }

    watch(gateway, session, args, settings).await
}

async fn watch(gateway: EwmhGateway, mut session: Session, args: &Args, settings: &Settings) -> Result<()> {
    let watched = |session: &Session| session.items().iter().filter_map(|item| item.handle()).collect::<Vec<_>>();
    gateway.watch(&watched(&session))?;
    let stream = EventStream::new(gateway.connection())?;

    output::print(&mut io::stdout().lock(), &session, settings.show_desktop, args.json)?;
    info!("Watching for window changes");

    loop {
        tokio::select! {
            batch = stream.next_batch(&gateway) => {
                let events = match batch {
                    Ok(events) => events,
                    Err(e) => {
                        error!("X11 connection lost: {}", e);
                        return Err(e);
                    }
                };

                let relisted = events.contains(&GatewayEvent::WindowListChanged);
                let update = session.handle_events(&gateway, events);
                if relisted {
                    gateway.watch(&watched(&session))?;
                }

                if update != SessionUpdate::Unchanged {
                    let mut out = io::stdout().lock();
                    writeln!(out)?;
                    output::print(&mut out, &session, settings.show_desktop, args.json)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, exiting");
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "winmosaic=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = cli::parse();
    let config = Config::load()?;
    let settings = Settings::resolve(&args, &config);
    debug!("Settings: {:?}", settings);

    if args.read_stdin {
        run_stdin(&args, &settings)
    } else {
        run_windows(&args, &settings).await
    }
}
