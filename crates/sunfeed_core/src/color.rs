//! RGBA color type used by every color-bearing view property

use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Heart red shown on a liked post
    pub const LIKED: Color = Color::rgb(1.0, 0.2, 0.2);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => u32::from_str_radix(digits, 16).ok().map(Self::from_hex),
            8 => {
                let value = u32::from_str_radix(digits, 16).ok()?;
                let alpha = (value & 0xFF) as f32 / 255.0;
                Some(Self::from_hex(value >> 8).with_alpha(alpha))
            }
            _ => None,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse_hex("#FFFFFF"), Some(Color::WHITE));
        assert_eq!(Color::parse_hex("000000"), Some(Color::BLACK));

        let translucent = Color::parse_hex("#FF000080").unwrap();
        assert_eq!(translucent.r, 1.0);
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);

        assert_eq!(Color::parse_hex("#FFF"), None);
        assert_eq!(Color::parse_hex("zzzzzz"), None);
    }

    #[test]
    fn test_lerp_clamps() {
        let mid = Color::lerp(&Color::BLACK, &Color::WHITE, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);

        let past = Color::lerp(&Color::BLACK, &Color::WHITE, 2.0);
        assert_eq!(past, Color::WHITE);
    }
}
