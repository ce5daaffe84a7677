// Simple color struct, created from an unsigned 32 representing RRGGBBAA
// or from a css hex string

use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    // Accepts #rgb, #rrggbb and #rrggbbaa, with or without the leading '#'
    pub fn from_hex(hex: &str) -> Result<Color, String> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid hex color '{}'", hex));
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| vec![c, c]).collect::<String>() + "ff",
            6 => format!("{}ff", digits),
            8 => digits.to_owned(),
            _ => return Err(format!("invalid hex color length '{}'", hex)),
        };
        u32::from_str_radix(&expanded, 16)
            .map(Color::from_u32)
            .map_err(|e| format!("invalid hex color '{}': {}", hex, e))
    }

    // Same color with alpha scaled by `opacity` (clamped to 0..=1)
    pub fn with_opacity(self, opacity: f64) -> Color {
        let opacity = opacity.max(0.0).min(1.0);
        Color {
            a: (self.a as f64 * opacity).round() as u8,
            ..self
        }
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    pub fn tint(&mut self, tint: Color) {
        let new_r = ((self.r as f64 + tint.r as f64) / 2.0) as u8;
        let new_g = ((self.g as f64 + tint.g as f64) / 2.0) as u8;
        let new_b = ((self.b as f64 + tint.b as f64) / 2.0) as u8;
        let new_a = ((self.a as f64 + tint.a as f64) / 2.0) as u8;

        self.r = new_r;
        self.g = new_g;
        self.b = new_b;
        self.a = new_a;
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

// CSS rgba() form, what the 2d context expects for fill/stroke styles and gradient stops
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.alpha())
    }
}

// Primary/secondary pair handed to the field at mount
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
}

impl Palette {
    pub const DEFAULT_PRIMARY: u32 = 0x3b82f6ff;
    pub const DEFAULT_SECONDARY: u32 = 0x8b5cf6ff;

    pub fn new(primary: Color, secondary: Color) -> Palette {
        Palette { primary, secondary }
    }

    // Malformed entries fall back to the default color for that slot
    pub fn from_hex(primary: &str, secondary: &str) -> Palette {
        let parse = |hex: &str, fallback: u32| {
            Color::from_hex(hex).unwrap_or_else(|err| {
                crate::warning!("{}, using default", err);
                Color::from_u32(fallback)
            })
        };
        Palette {
            primary: parse(primary, Palette::DEFAULT_PRIMARY),
            secondary: parse(secondary, Palette::DEFAULT_SECONDARY),
        }
    }

    // Midpoint of the two colors, used for the focal links
    pub fn blend(&self) -> Color {
        let mut color = self.primary;
        color.tint(self.secondary);
        color
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            primary: Color::from_u32(Palette::DEFAULT_PRIMARY),
            secondary: Color::from_u32(Palette::DEFAULT_SECONDARY),
        }
    }
}
