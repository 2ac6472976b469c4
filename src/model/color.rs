use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA color with floating-point channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels.
    pub fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: f32::from(a) / 255.0,
        }
    }

    /// Build from 1 to 4 channel values. Omitted channels are full intensity.
    pub fn from_channels(channels: &[f32]) -> Option<Self> {
        match *channels {
            [r] => Some(Self::rgba(r, 1.0, 1.0, 1.0)),
            [r, g] => Some(Self::rgba(r, g, 1.0, 1.0)),
            [r, g, b] => Some(Self::rgba(r, g, b, 1.0)),
            [r, g, b, a] => Some(Self::rgba(r, g, b, a)),
            _ => None,
        }
    }

    /// Parse an HTML-style color string: `#RGB`, `#RGBA`, `#RRGGBB`,
    /// `#RRGGBBAA`, or one of the common color names. Case-insensitive.
    pub fn parse_html(text: &str) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();
        match text.strip_prefix('#') {
            Some(hex) => parse_hex(hex),
            None => named(&text),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGBA({:.3}, {:.3}, {:.3}, {:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| -> Option<u8> {
        let c = hex.get(i..=i)?;
        let v = u8::from_str_radix(c, 16).ok()?;
        Some(v * 17)
    };
    let pair = |i: usize| -> Option<u8> { u8::from_str_radix(hex.get(i..i + 2)?, 16).ok() };
    match hex.len() {
        3 => Some(Color::from_bytes(digit(0)?, digit(1)?, digit(2)?, 255)),
        4 => Some(Color::from_bytes(digit(0)?, digit(1)?, digit(2)?, digit(3)?)),
        6 => Some(Color::from_bytes(pair(0)?, pair(2)?, pair(4)?, 255)),
        8 => Some(Color::from_bytes(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
        _ => None,
    }
}

fn named(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "red" => (0xff, 0x00, 0x00),
        "cyan" | "aqua" => (0x00, 0xff, 0xff),
        "blue" => (0x00, 0x00, 0xff),
        "darkblue" => (0x00, 0x00, 0xa0),
        "lightblue" => (0xad, 0xd8, 0xe6),
        "purple" => (0x80, 0x00, 0x80),
        "yellow" => (0xff, 0xff, 0x00),
        "lime" => (0x00, 0xff, 0x00),
        "fuchsia" | "magenta" => (0xff, 0x00, 0xff),
        "white" => (0xff, 0xff, 0xff),
        "silver" => (0xc0, 0xc0, 0xc0),
        "grey" | "gray" => (0x80, 0x80, 0x80),
        "black" => (0x00, 0x00, 0x00),
        "orange" => (0xff, 0xa5, 0x00),
        "brown" => (0xa5, 0x2a, 0x2a),
        "maroon" => (0x80, 0x00, 0x00),
        "green" => (0x00, 0x80, 0x00),
        "olive" => (0x80, 0x80, 0x00),
        "navy" => (0x00, 0x00, 0x80),
        "teal" => (0x00, 0x80, 0x80),
        _ => return None,
    };
    Some(Color::from_bytes(r, g, b, 255))
}
