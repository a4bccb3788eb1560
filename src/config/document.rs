//! Typed top-level sections of a dashboard document.
//!
//! Element definitions stay as raw [`Value`]s: their schema depends on the
//! element type and on template expansion, so the loader validates them by
//! hand. Sections the engine does not consume (`inkBoard`, `device`,
//! `screen`, ...) are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::dom::NavLocation;

/// The sections of a configuration document the engine reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub styles: StylesSection,
    #[serde(default)]
    pub templates: Mapping,
    #[serde(default)]
    pub elements: Vec<Value>,
    #[serde(default)]
    pub layouts: Vec<Value>,
    #[serde(default)]
    pub popups: Vec<Value>,
    #[serde(default)]
    pub main_tabs: Option<MainTabsSection>,
}

/// `styles`: token definitions and default style properties.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylesSection {
    #[serde(default)]
    pub tokens: TokensSection,
    /// Style properties applied to every element below any other layer.
    #[serde(default)]
    pub defaults: Mapping,
}

/// `styles.tokens`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokensSection {
    /// Color name to color literal.
    #[serde(default)]
    pub colors: BTreeMap<String, Value>,
    /// Font name to font file.
    #[serde(default)]
    pub fonts: BTreeMap<String, String>,
}

/// `main_tabs`: the tabbed base layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MainTabsSection {
    pub tabs: Vec<TabEntry>,
    pub id: Option<String>,
    #[serde(default)]
    pub location: NavLocation,
    /// Bar thickness, an expression against the display.
    pub navigation_size: Option<Value>,
    #[serde(default)]
    pub hide_navigation_bar: bool,
    pub background_color: Option<Value>,
    pub foreground_color: Option<Value>,
    pub outline_color: Option<Value>,
    pub outline_width: Option<Value>,
    pub element_properties: Option<Mapping>,
    /// Applied to the navigation tile of the current tab.
    pub active_properties: Option<Mapping>,
    /// Applied to the navigation tiles of the other tabs.
    pub inactive_properties: Option<Mapping>,
}

impl MainTabsSection {
    /// The style properties set directly on the section.
    pub fn style_mapping(&self) -> Mapping {
        let mut map = Mapping::new();
        let entries = [
            ("background_color", &self.background_color),
            ("foreground_color", &self.foreground_color),
            ("outline_color", &self.outline_color),
            ("outline_width", &self.outline_width),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                map.insert(Value::from(key), value.clone());
            }
        }
        map
    }
}

/// One tab: the page element, its display name and icon.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabEntry {
    /// An element reference or an inline element.
    pub element: Value,
    pub name: String,
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_unconsumed_sections() {
        let doc: Document = serde_yaml::from_str(
            "inkBoard:\n  name: test\ndevice:\n  platform: desktop\nlayouts:\n  - type: Button\n",
        )
        .unwrap();
        assert_eq!(doc.layouts.len(), 1);
        assert!(doc.main_tabs.is_none());
    }

    #[test]
    fn main_tabs_defaults() {
        let doc: Document = serde_yaml::from_str(
            "main_tabs:\n  tabs:\n    - element: home\n      name: Home\n  background_color: white\n",
        )
        .unwrap();
        let tabs = doc.main_tabs.unwrap();
        assert_eq!(tabs.location, NavLocation::Bottom);
        assert!(!tabs.hide_navigation_bar);
        assert_eq!(tabs.tabs[0].name, "Home");
        assert_eq!(tabs.style_mapping().len(), 1);
    }

    #[test]
    fn main_tabs_rejects_unknown_keys() {
        let result: Result<Document, _> =
            serde_yaml::from_str("main_tabs:\n  tabs: []\n  rows: 2\n");
        assert!(result.is_err());
    }

    #[test]
    fn tokens_section() {
        let doc: Document = serde_yaml::from_str(
            "styles:\n  tokens:\n    colors:\n      accent: '#ff0000'\n    fonts:\n      title: Title.ttf\n",
        )
        .unwrap();
        assert!(doc.styles.tokens.colors.contains_key("accent"));
        assert_eq!(doc.styles.tokens.fonts["title"], "Title.ttf");
    }
}
