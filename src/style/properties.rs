//! Typed style properties and their parsing from configuration values.
//!
//! [`StyleProps`] has one `Option<T>` field per cascadable property. `None`
//! means "not set at this layer"; the cascade merges layers on top of each
//! other. Colors and fonts are resolved against the token table while
//! parsing, so a `StyleProps` never holds a token name.

use serde_yaml::{Mapping, Value};

use crate::expr::size::{raw_value, SizeSpec};
use crate::style::color::Color;
use crate::style::tokens::TokenTable;
use crate::style::StyleError;

/// Horizontal text alignment inside a button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Style keys every element type accepts.
pub const COMMON_STYLE_KEYS: &[&str] = &[
    "background_color",
    "foreground_color",
    "outline_color",
    "outline_width",
];

/// Style keys a `Button` accepts.
pub const BUTTON_STYLE_KEYS: &[&str] = &[
    "background_color",
    "foreground_color",
    "outline_color",
    "outline_width",
    "text",
    "font",
    "font_size",
    "font_color",
    "text_align",
];

/// Style keys an `Icon` accepts.
pub const ICON_STYLE_KEYS: &[&str] = &[
    "background_color",
    "foreground_color",
    "outline_color",
    "outline_width",
    "icon",
    "icon_color",
];

/// Every cascadable key.
pub const ALL_STYLE_KEYS: &[&str] = &[
    "background_color",
    "foreground_color",
    "outline_color",
    "outline_width",
    "text",
    "font",
    "font_size",
    "font_color",
    "text_align",
    "icon",
    "icon_color",
];

/// A style property that failed to parse, with the key that triggered it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("property '{property}': {source}")]
pub struct PropertyError {
    pub property: String,
    #[source]
    pub source: StyleError,
}

/// Cascadable properties for one layer of the cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleProps {
    // Box
    pub background_color: Option<Color>,
    pub foreground_color: Option<Color>,
    pub outline_color: Option<Color>,
    pub outline_width: Option<i32>,

    // Text
    pub text: Option<String>,
    pub font: Option<String>,
    pub font_size: Option<SizeSpec>,
    pub font_color: Option<Color>,
    pub text_align: Option<TextAlign>,

    // Icon
    pub icon: Option<String>,
    pub icon_color: Option<Color>,
}

impl StyleProps {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every entry of `map` as a style property.
    ///
    /// Keys outside `allowed` fail with [`StyleError::UnknownProperty`].
    pub fn from_mapping(
        map: &Mapping,
        tokens: &TokenTable,
        allowed: &[&str],
    ) -> Result<Self, PropertyError> {
        let mut props = StyleProps::new();
        for (key, value) in map {
            let name = key.as_str().ok_or_else(|| PropertyError {
                property: raw_value(key),
                source: StyleError::UnknownProperty,
            })?;
            if !allowed.contains(&name) {
                return Err(PropertyError {
                    property: name.to_string(),
                    source: StyleError::UnknownProperty,
                });
            }
            props.apply(name, value, tokens).map_err(|source| PropertyError {
                property: name.to_string(),
                source,
            })?;
        }
        Ok(props)
    }

    /// Parse and set a single property.
    pub fn apply(
        &mut self,
        name: &str,
        value: &Value,
        tokens: &TokenTable,
    ) -> Result<(), StyleError> {
        match name {
            "background_color" => self.background_color = Some(tokens.resolve_color(value)?),
            "foreground_color" => self.foreground_color = Some(tokens.resolve_color(value)?),
            "outline_color" => self.outline_color = Some(tokens.resolve_color(value)?),
            "outline_width" => {
                let width = value
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .filter(|n| *n >= 0)
                    .ok_or_else(|| invalid(value, "a non-negative pixel count"))?;
                self.outline_width = Some(width);
            }
            "text" => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(_) | Value::Bool(_) => raw_value(value),
                    _ => return Err(invalid(value, "text")),
                };
                self.text = Some(text);
            }
            "font" => {
                let raw = value.as_str().ok_or_else(|| invalid(value, "a font token or file"))?;
                self.font = Some(tokens.resolve_font(raw)?);
            }
            "font_size" => {
                let spec = SizeSpec::from_value(value).map_err(StyleError::Expression)?;
                self.font_size = Some(spec);
            }
            "font_color" => self.font_color = Some(tokens.resolve_color(value)?),
            "text_align" => {
                let align = match value.as_str().map(str::to_ascii_lowercase).as_deref() {
                    Some("left") => TextAlign::Left,
                    Some("center") => TextAlign::Center,
                    Some("right") => TextAlign::Right,
                    _ => return Err(invalid(value, "one of left, center, right")),
                };
                self.text_align = Some(align);
            }
            "icon" => {
                let icon = value.as_str().ok_or_else(|| invalid(value, "an icon reference"))?;
                self.icon = Some(icon.to_string());
            }
            "icon_color" => self.icon_color = Some(tokens.resolve_color(value)?),
            _ => return Err(StyleError::UnknownProperty),
        }
        Ok(())
    }

    /// Merge `other` on top of `self`: fields set in `other` win.
    pub fn merge(&self, other: &StyleProps) -> StyleProps {
        fn merge_opt<T: Clone>(base: &Option<T>, other: &Option<T>) -> Option<T> {
            if other.is_some() {
                other.clone()
            } else {
                base.clone()
            }
        }

        StyleProps {
            background_color: merge_opt(&self.background_color, &other.background_color),
            foreground_color: merge_opt(&self.foreground_color, &other.foreground_color),
            outline_color: merge_opt(&self.outline_color, &other.outline_color),
            outline_width: merge_opt(&self.outline_width, &other.outline_width),

            text: merge_opt(&self.text, &other.text),
            font: merge_opt(&self.font, &other.font),
            font_size: merge_opt(&self.font_size, &other.font_size),
            font_color: merge_opt(&self.font_color, &other.font_color),
            text_align: merge_opt(&self.text_align, &other.text_align),

            icon: merge_opt(&self.icon, &other.icon),
            icon_color: merge_opt(&self.icon_color, &other.icon_color),
        }
    }

    /// Names of the fields set in this layer.
    pub fn set_keys(&self) -> Vec<&'static str> {
        let flags = [
            ("background_color", self.background_color.is_some()),
            ("foreground_color", self.foreground_color.is_some()),
            ("outline_color", self.outline_color.is_some()),
            ("outline_width", self.outline_width.is_some()),
            ("text", self.text.is_some()),
            ("font", self.font.is_some()),
            ("font_size", self.font_size.is_some()),
            ("font_color", self.font_color.is_some()),
            ("text_align", self.text_align.is_some()),
            ("icon", self.icon.is_some()),
            ("icon_color", self.icon_color.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.set_keys().is_empty()
    }
}

fn invalid(value: &Value, expected: &'static str) -> StyleError {
    StyleError::InvalidValue {
        raw: raw_value(value),
        expected,
    }
}
