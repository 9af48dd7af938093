//! Box colors
//!
//! Each box gets a color derived from a CRC-16 of its identity string, so the
//! same application keeps the same color across runs. The checksum and the
//! HSL conversion are reproduced bit for bit: changing them would recolor
//! every user's mosaic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color, each channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Used when colorizing is off or there is nothing to hash
    pub const NEUTRAL: Rgb = Rgb {
        r: 0.6,
        g: 0.6,
        b: 0.6,
    };

    /// Fallback for color strings that do not parse
    pub const DEFAULT_OVERRIDE: u32 = 0x888888;

    pub fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f64 / 255.0,
            g: ((rgb >> 8) & 0xff) as f64 / 255.0,
            b: (rgb & 0xff) as f64 / 255.0,
        }
    }

    /// Parse `#RRGGBB`. Anything else yields [`Rgb::DEFAULT_OVERRIDE`].
    pub fn parse_hex(s: &str) -> Self {
        let digits = s.trim().strip_prefix('#').unwrap_or("");
        let value = if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            u32::from_str_radix(digits, 16).unwrap_or(Self::DEFAULT_OVERRIDE)
        } else {
            Self::DEFAULT_OVERRIDE
        };
        Self::from_u32(value)
    }

    pub fn to_u32(&self) -> u32 {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_u32())
    }
}

/// Colorization settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOptions {
    pub colorize: bool,
    /// Rotates every hue by `hue_offset / 255` of a turn
    pub hue_offset: u8,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            colorize: true,
            hue_offset: 0,
        }
    }
}

impl ColorOptions {
    pub fn color_for(&self, identity: &str) -> Rgb {
        if !self.colorize {
            return Rgb::NEUTRAL;
        }
        color_for(identity, self.hue_offset)
    }
}

/// CRC-16 (poly 0x8408, init 0xFFFF, complemented) with the two result
/// bytes swapped.
pub fn crc16(bytes: &[u8]) -> u16 {
    const POLY: u16 = 0x8408;

    let mut crc: u16 = 0xffff;
    if bytes.is_empty() {
        return !crc;
    }

    for &byte in bytes {
        let mut data = byte as u16;
        for _ in 0..8 {
            if (crc & 0x0001) ^ (data & 0x0001) != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
            data >>= 1;
        }
    }

    (!crc).swap_bytes()
}

fn hue2rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Stable color for an identity string.
///
/// Not injective: different identities or offsets may land on the same color.
pub fn color_for(identity: &str, hue_offset: u8) -> Rgb {
    if identity.is_empty() {
        return Rgb::NEUTRAL;
    }

    let crc = crc16(identity.as_bytes());
    let hue_index = ((crc >> 8) as u8).wrapping_add(hue_offset);
    let sat_index = (crc & 0xff) as u8;

    let h = hue_index as f64 / 255.0;
    let s = 0.5 + sat_index as f64 / 512.0;
    let l = 0.6;

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb {
        r: hue2rgb(p, q, h + 1.0 / 3.0),
        g: hue2rgb(p, q, h),
        b: hue2rgb(p, q, h - 1.0 / 3.0),
    }
}
