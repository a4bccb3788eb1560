//! Named style tokens: reusable colors and fonts.
//!
//! Tokens are resolved once when the configuration loads. After that every
//! color or font in the element tree is a concrete value.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::expr::size::raw_value;
use crate::style::color::Color;
use crate::style::StyleError;

/// Built-in color tokens.
const BUILTIN_COLORS: &[(&str, Color)] = &[
    ("inkboard", Color::rgb(19, 54, 91)),
    ("inkboard-light", Color::rgb(44, 107, 176)),
    ("inkboard-dark", Color::rgb(35, 31, 32)),
    ("inkboard-gray", Color::rgb(63, 59, 60)),
    ("inkboard-grey", Color::rgb(63, 59, 60)),
    ("inkboard-white", Color::rgb(255, 255, 255)),
];

/// Built-in font tokens, mapped to font file names.
const BUILTIN_FONTS: &[(&str, &str)] = &[
    ("default", "Merriweather-Regular.ttf"),
    ("default-regular", "Merriweather-Regular.ttf"),
    ("default-bold", "Merriweather-Bold.ttf"),
    ("header", "Merriweather-BoldItalic.ttf"),
    ("clock", "PoiretOne-Regular.ttf"),
    ("mdi", "materialdesignicons-webfont.ttf"),
];

/// Lookup table for color and font tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenTable {
    colors: BTreeMap<String, Color>,
    fonts: BTreeMap<String, String>,
}

impl TokenTable {
    /// An empty table with no tokens at all.
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
            fonts: BTreeMap::new(),
        }
    }

    /// The built-in inkBoard palette and fonts.
    pub fn builtin() -> Self {
        Self {
            colors: BUILTIN_COLORS
                .iter()
                .map(|(name, color)| (name.to_string(), *color))
                .collect(),
            fonts: BUILTIN_FONTS
                .iter()
                .map(|(name, file)| (name.to_string(), file.to_string()))
                .collect(),
        }
    }

    /// Define (or redefine) a color token. The value must be a literal.
    pub fn define_color(&mut self, name: &str, value: &Value) -> Result<(), StyleError> {
        let color = Color::from_literal(value).ok_or_else(|| StyleError::UnknownColor {
            raw: raw_value(value),
        })?;
        self.colors.insert(name.to_string(), color);
        Ok(())
    }

    /// Define (or redefine) a font token. The value must be a font file.
    pub fn define_font(&mut self, name: &str, file: &str) -> Result<(), StyleError> {
        if !is_font_file(file) {
            return Err(StyleError::UnknownFont { raw: file.to_string() });
        }
        self.fonts.insert(name.to_string(), file.to_string());
        Ok(())
    }

    /// Look up a color token by name.
    pub fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Look up a font token by name.
    pub fn font(&self, name: &str) -> Option<&str> {
        self.fonts.get(name).map(String::as_str)
    }

    /// Resolve a color value: a token name first, then a literal form.
    pub fn resolve_color(&self, value: &Value) -> Result<Color, StyleError> {
        if let Value::String(name) = value {
            if let Some(color) = self.color(name.trim()) {
                return Ok(color);
            }
        }
        Color::from_literal(value).ok_or_else(|| StyleError::UnknownColor {
            raw: raw_value(value),
        })
    }

    /// Resolve a font value: a token name, or a literal font file path.
    pub fn resolve_font(&self, raw: &str) -> Result<String, StyleError> {
        let raw = raw.trim();
        if let Some(file) = self.font(raw) {
            return Ok(file.to_string());
        }
        if is_font_file(raw) {
            return Ok(raw.to_string());
        }
        Err(StyleError::UnknownFont { raw: raw.to_string() })
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_font_file(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.ends_with(".ttf") || lower.ends_with(".otf")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_builtin_palette() {
        let t = TokenTable::builtin();
        assert_eq!(t.color("inkboard-light"), Some(Color::rgb(44, 107, 176)));
        assert_eq!(t.color("inkboard-grey"), t.color("inkboard-gray"));
        assert_eq!(t.font("default-bold"), Some("Merriweather-Bold.ttf"));
    }

    #[test]
    fn test_resolve_color_prefers_token() {
        let t = TokenTable::builtin();
        assert_eq!(
            t.resolve_color(&yaml("inkboard")).unwrap(),
            Color::rgb(19, 54, 91)
        );
        assert_eq!(t.resolve_color(&yaml("\"#000\"")).unwrap(), Color::BLACK);
        assert_eq!(t.resolve_color(&yaml("[1, 2, 3]")).unwrap(), Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_resolve_color_unknown_token() {
        let t = TokenTable::builtin();
        let err = t.resolve_color(&yaml("inkboard-purple")).unwrap_err();
        assert_eq!(err, StyleError::UnknownColor { raw: "inkboard-purple".into() });
    }

    #[test]
    fn test_user_tokens_override_builtin() {
        let mut t = TokenTable::builtin();
        t.define_color("inkboard", &yaml("red")).unwrap();
        t.define_color("accent", &yaml("\"#00ff00\"")).unwrap();
        assert_eq!(t.color("inkboard"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(t.resolve_color(&yaml("accent")).unwrap(), Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_define_color_rejects_token_reference() {
        let mut t = TokenTable::builtin();
        assert!(t.define_color("alias", &yaml("inkboard")).is_err());
    }

    #[test]
    fn test_fonts() {
        let mut t = TokenTable::builtin();
        assert_eq!(t.resolve_font("clock").unwrap(), "PoiretOne-Regular.ttf");
        assert_eq!(t.resolve_font("fonts/Custom.OTF").unwrap(), "fonts/Custom.OTF");
        assert!(t.resolve_font("comic-sans").is_err());
        t.define_font("title", "fonts/Title.ttf").unwrap();
        assert_eq!(t.resolve_font("title").unwrap(), "fonts/Title.ttf");
        assert!(t.define_font("bad", "not-a-font").is_err());
    }

    #[test]
    fn test_empty_table_has_no_tokens() {
        let t = TokenTable::empty();
        assert!(t.resolve_font("default").is_err());
        assert!(t.resolve_color(&yaml("inkboard")).is_err());
    }
}
