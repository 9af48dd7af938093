//! Text item input
//!
//! Stdin mode reads one item per line. In records mode each line carries
//! five comma-separated fields:
//!
//! ```text
//! desktop,color,icon,label,alt_name
//! ```
//!
//! Only the first four commas separate fields, so the alternate name may
//! itself contain commas.

use std::io::BufRead;

use anyhow::{Context, Result};
use tracing::warn;

use super::color::Rgb;
use super::item::{IconRef, Item, TextMeta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Each line is a label
    #[default]
    Plain,
    /// Each line is a five-field record
    Records,
}

/// Parse one records line. Malformed lines become a visible error item.
pub fn parse_record(line: &str) -> Item {
    let fields: Vec<&str> = line.splitn(5, ',').collect();
    let [desktop, color, icon, label, alt_name] = fields[..] else {
        return parse_error(line);
    };

    let desktop = match desktop.trim() {
        "" => None,
        d => match d.parse::<u32>() {
            Ok(d) => Some(d),
            Err(_) => return parse_error(line),
        },
    };

    let color = match color.trim() {
        "" => None,
        c => Some(Rgb::parse_hex(c)),
    };

    let alt_name = Some(alt_name.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Item::text(
        label.trim(),
        TextMeta {
            desktop,
            color,
            icon: IconRef::parse(icon),
            alt_name,
        },
    )
}

fn parse_error(line: &str) -> Item {
    warn!("Malformed record: {:?}", line);
    Item::text(format!("parse error: {line}"), TextMeta::default())
}

/// Read items until EOF. Empty lines are skipped.
pub fn read_items(reader: impl BufRead, format: InputFormat) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read input line")?;
        if line.is_empty() {
            continue;
        }
        items.push(match format {
            InputFormat::Plain => Item::text(line, TextMeta::default()),
            InputFormat::Records => parse_record(&line),
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosaic::item::ItemKind;
    use std::io::Cursor;

    fn meta(item: &Item) -> &TextMeta {
        match &item.kind {
            ItemKind::Text(meta) => meta,
            other => panic!("expected text item, got {other:?}"),
        }
    }

    #[test]
    fn test_full_record() {
        let item = parse_record("2,#ff0000,firefox,Firefox,firefox --private-window, now");
        assert_eq!(item.display_name, "Firefox");
        let full = meta(&item);
        assert_eq!(full.desktop, Some(2));
        assert_eq!(full.color.map(|c| c.to_u32()), Some(0xff0000));
        assert_eq!(full.icon, Some(IconRef::Theme("firefox".into())));
        assert_eq!(
            full.alt_name.as_deref(),
            Some("firefox --private-window, now")
        );
        assert_eq!(item.desktop_label(), Some(3));

        let padded = parse_record("1, #ff0000, *, Firefox , firefox \r");
        assert_eq!(padded.display_name, "Firefox");
        assert_eq!(padded.identity, "Firefox");
        let trimmed = meta(&padded);
        assert_eq!(trimmed.desktop, Some(1));
        assert_eq!(trimmed.color.map(|c| c.to_u32()), Some(0xff0000));
        assert_eq!(trimmed.icon, Some(IconRef::Default));
        assert_eq!(trimmed.alt_name.as_deref(), Some("firefox"));
    }

    #[test]
    fn test_empty_fields() {
        let item = parse_record(",,,Terminal,");
        let meta = meta(&item);
        assert_eq!(item.display_name, "Terminal");
        assert_eq!(meta, &TextMeta::default());
    }

    #[test]
    fn test_bad_color_falls_back() {
        let item = parse_record(",orange,*,Label,");
        assert_eq!(meta(&item).color.map(|c| c.to_u32()), Some(0x888888));
        assert_eq!(meta(&item).icon, Some(IconRef::Default));
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_record("1,#fff,icon,label").display_name,
            "parse error: 1,#fff,icon,label"
        );
        assert_eq!(
            parse_record("one,,,label,").display_name,
            "parse error: one,,,label,"
        );
    }

    #[test]
    fn test_read_items() {
        let input = Cursor::new("alpha\n\nbeta\ngamma\n");
        let items = read_items(input, InputFormat::Plain).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert!(items.iter().all(|i| i.alt_fields().is_empty()));

        let input = Cursor::new("0,,,/usr/bin/vim,vim\nbroken\n");
        let items = read_items(input, InputFormat::Records).unwrap();
        assert_eq!(items[0].display_name, "/usr/bin/vim");
        assert_eq!(items[1].display_name, "parse error: broken");
    }
}
