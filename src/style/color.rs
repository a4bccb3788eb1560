//! Color values and the literal forms accepted in configuration.
//!
//! Literal forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `[r, g, b]`,
//! `[r, g, b, a]`, a basic color name, or `none` for transparent.

use std::fmt;

use serde_yaml::Value;

/// An RGBA color. Alpha 0 is fully transparent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the color is fully transparent.
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Parse a literal color from a YAML value. Returns `None` for anything
    /// that is not a recognized literal form (including token names).
    pub fn from_literal(value: &Value) -> Option<Color> {
        match value {
            Value::Null => Some(Color::TRANSPARENT),
            Value::String(s) => Color::parse_str(s),
            Value::Sequence(items) => {
                let channels = items
                    .iter()
                    .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                    .collect::<Option<Vec<u8>>>()?;
                match channels.as_slice() {
                    [r, g, b] => Some(Color::rgb(*r, *g, *b)),
                    [r, g, b, a] => Some(Color::rgba(*r, *g, *b, *a)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Parse a hex color or basic color name.
    pub fn parse_str(raw: &str) -> Option<Color> {
        let s = raw.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        named_color(&s.to_ascii_lowercase())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "none" | "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "red" => Color::rgb(255, 0, 0),
        "maroon" => Color::rgb(128, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "olive" => Color::rgb(128, 128, 0),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "blue" => Color::rgb(0, 0, 255),
        "navy" => Color::rgb(0, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "aqua" | "cyan" => Color::rgb(0, 255, 255),
        "purple" => Color::rgb(128, 0, 128),
        "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(Color::parse_str("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse_str("#f008"), Some(Color::rgba(255, 0, 0, 136)));
        assert_eq!(Color::parse_str("#2c6bb0"), Some(Color::rgb(44, 107, 176)));
        assert_eq!(Color::parse_str("#2c6bb080"), Some(Color::rgba(44, 107, 176, 128)));
        assert_eq!(Color::parse_str("#12345"), None);
        assert_eq!(Color::parse_str("#ggg"), None);
    }

    #[test]
    fn test_names_are_case_insensitive() {
        assert_eq!(Color::parse_str("Maroon"), Some(Color::rgb(128, 0, 0)));
        assert_eq!(Color::parse_str("GREY"), Some(Color::rgb(128, 128, 128)));
        assert_eq!(Color::parse_str("None"), Some(Color::TRANSPARENT));
        assert_eq!(Color::parse_str("inkboard-light"), None);
    }

    #[test]
    fn test_tuple_forms() {
        assert_eq!(Color::from_literal(&yaml("[19, 54, 91]")), Some(Color::rgb(19, 54, 91)));
        assert_eq!(
            Color::from_literal(&yaml("[19, 54, 91, 10]")),
            Some(Color::rgba(19, 54, 91, 10))
        );
        assert_eq!(Color::from_literal(&yaml("[19, 54]")), None);
        assert_eq!(Color::from_literal(&yaml("[300, 0, 0]")), None);
        assert_eq!(Color::from_literal(&yaml("[-1, 0, 0]")), None);
    }

    #[test]
    fn test_null_is_transparent() {
        assert_eq!(Color::from_literal(&Value::Null), Some(Color::TRANSPARENT));
        assert!(Color::TRANSPARENT.is_transparent());
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::rgb(44, 107, 176).to_string(), "#2c6bb0");
        assert_eq!(Color::rgba(0, 0, 0, 0).to_string(), "#00000000");
    }
}
