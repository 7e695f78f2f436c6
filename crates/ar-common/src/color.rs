//! RGBA colors, the usual end product of a transfer chain.

use crate::Aggregates;
use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const RED: Color = Color::new(255, 0, 0, 255);
    pub const BLUE: Color = Color::new(0, 0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA".
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();

        match s.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let lerp_u8 = |a: u8, b: u8| -> u8 { ((a as f64) * (1.0 - t) + (b as f64) * t).round() as u8 };

        Color::new(
            lerp_u8(self.r, other.r),
            lerp_u8(self.g, other.g),
            lerp_u8(self.b, other.b),
            lerp_u8(self.a, other.a),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::transparent()
    }
}

/// Flatten a color grid into RGBA bytes (4 bytes per pixel, row-major).
pub fn to_rgba(grid: &Aggregates<Color>) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(grid.len() * 4);
    for c in grid.values() {
        pixels.extend_from_slice(&[c.r, c.g, c.b, c.a]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("0000ff80"), Some(Color::BLUE.with_alpha(0x80)));
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = Color::new(0, 0, 0, 0);
        let b = Color::new(200, 100, 50, 255);

        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 2.0), b);
        assert_eq!(a.lerp(&b, 0.5), Color::new(100, 50, 25, 128));
    }

    #[test]
    fn test_to_rgba() {
        let mut grid = Aggregates::with_size(2, 1, Color::transparent());
        grid.set(1, 0, Color::RED);
        assert_eq!(to_rgba(&grid), vec![0, 0, 0, 0, 255, 0, 0, 255]);
    }
}
