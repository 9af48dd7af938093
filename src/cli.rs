use clap::Parser;

use winmosaic::config::Config;
use winmosaic::mosaic::color::ColorOptions;
use winmosaic::shared::geometry::Point;

/// winmosaic: pick a window (or a line of text) from a spiral of colored boxes.
#[derive(Parser, Debug)]
#[command(name = "winmosaic", version, about)]
pub struct Args {
    /// Read items from stdin instead of listing windows.
    #[arg(short = 'r', long)]
    pub read_stdin: bool,

    /// Stdin lines are `desktop,color,icon,label,alt_name` records.
    #[arg(long, requires = "read_stdin")]
    pub records: bool,

    /// Selecting with no match prints the typed query.
    #[arg(short = 'L', long)]
    pub launcher_mode: bool,

    /// Initial search query.
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Box width in pixels.
    #[arg(short = 'W', long)]
    pub box_width: Option<u32>,

    /// Box height in pixels.
    #[arg(short = 'H', long)]
    pub box_height: Option<u32>,

    /// Rotate every box hue (0-255).
    #[arg(short = 'o', long)]
    pub hue_offset: Option<u8>,

    /// Draw every box in neutral gray.
    #[arg(short = 'C', long)]
    pub no_colors: bool,

    /// Hide desktop numbers.
    #[arg(short = 'D', long)]
    pub no_desktops: bool,

    /// Center the spiral on the mouse pointer.
    #[arg(short = 'P', long)]
    pub at_pointer: bool,

    /// Center the spiral at X,Y.
    #[arg(long, value_parser = parse_point)]
    pub center: Option<Point>,

    /// Viewport size WxH (defaults to the screen size).
    #[arg(long, value_parser = parse_size)]
    pub viewport: Option<(u32, u32)>,

    /// Print the mosaic as JSON.
    #[arg(long)]
    pub json: bool,

    /// Choose the focused box instead of printing the mosaic.
    #[arg(long, conflicts_with = "watch")]
    pub select: bool,

    /// Keep running and re-print on every window change.
    #[arg(long, conflicts_with = "read_stdin")]
    pub watch: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse::<i32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<i32>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    Ok((w, h))
}

/// Config file values with command-line overrides applied
#[derive(Debug, Clone)]
pub struct Settings {
    pub box_width: u32,
    pub box_height: u32,
    pub at_pointer: bool,
    pub colors: ColorOptions,
    pub show_desktop: bool,
    pub search_box: (u32, u32),
}

impl Settings {
    pub fn resolve(args: &Args, config: &Config) -> Self {
        let mut colors = config.color_options();
        if args.no_colors {
            colors.colorize = false;
        }
        if let Some(offset) = args.hue_offset {
            colors.hue_offset = offset;
        }

        Self {
            box_width: args.box_width.unwrap_or(config.mosaic.box_width),
            box_height: args.box_height.unwrap_or(config.mosaic.box_height),
            at_pointer: args.at_pointer || config.mosaic.at_pointer,
            colors,
            show_desktop: config.display.show_desktop && !args.no_desktops,
            search_box: (config.search.box_width, config.search.box_height),
        }
    }
}
