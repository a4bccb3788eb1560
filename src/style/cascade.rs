//! The style cascade: engine defaults, ancestor overrides, own properties,
//! then the selected state variant.
//!
//! Resolution is a pure function of the tree, the defaults layer, the
//! variant state and the element's own box. Nothing here mutates the tree.

use slotmap::SecondaryMap;

use crate::dom::{ElementTree, NodeId};
use crate::geometry::Size;
use crate::style::color::Color;
use crate::style::properties::{PropertyError, StyleProps, TextAlign};
use crate::style::tokens::TokenTable;
use crate::style::StyleError;

/// Font size used when no layer sets one, as a fraction of the element's
/// own height.
const DEFAULT_FONT_SCALE: f64 = 0.5;

/// Resolved style of every element that has been laid out.
pub type StyleMap = SecondaryMap<NodeId, ResolvedStyle>;

/// Which variant each stateful element currently has selected.
#[derive(Debug, Clone, Default)]
pub struct VariantState {
    active: SecondaryMap<NodeId, bool>,
}

impl VariantState {
    /// Empty state: every element inactive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state taken from each stateful element's `active` flag.
    pub fn from_tree(tree: &ElementTree) -> Self {
        let mut state = Self::new();
        for (node, data) in tree.iter() {
            if data.is_stateful() {
                state.active.insert(node, data.initially_active);
            }
        }
        state
    }

    /// Select a variant. Returns `true` if the selection changed.
    pub fn set(&mut self, node: NodeId, active: bool) -> bool {
        let previous = self.active.insert(node, active).unwrap_or(false);
        previous != active
    }

    /// Whether `node` has its active variant selected.
    pub fn is_active(&self, node: NodeId) -> bool {
        self.active.get(node).copied().unwrap_or(false)
    }
}

/// Concrete style values for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub background_color: Color,
    pub foreground_color: Color,
    pub outline_color: Color,
    pub outline_width: i32,
    pub text: Option<String>,
    /// Font file, if any font is known.
    pub font: Option<String>,
    /// Font size in pixels.
    pub font_size: i32,
    pub font_color: Color,
    pub text_align: TextAlign,
    pub icon: Option<String>,
    pub icon_color: Color,
}

/// Built-in defaults: the lowest layer of the cascade.
///
/// `font_color` and `icon_color` are left unset so they fall back to the
/// resolved `foreground_color`.
pub fn engine_defaults(tokens: &TokenTable) -> StyleProps {
    StyleProps {
        background_color: Some(Color::TRANSPARENT),
        foreground_color: Some(Color::BLACK),
        outline_color: Some(Color::TRANSPARENT),
        outline_width: Some(0),
        font: tokens.font("default").map(str::to_owned),
        text_align: Some(TextAlign::Center),
        ..StyleProps::default()
    }
}

/// Resolves styles for elements of one tree.
#[derive(Debug, Clone, Copy)]
pub struct Cascade<'a> {
    tree: &'a ElementTree,
    defaults: &'a StyleProps,
    variants: &'a VariantState,
}

impl<'a> Cascade<'a> {
    /// `defaults` is the engine defaults with `styles.defaults` merged on top.
    pub fn new(
        tree: &'a ElementTree,
        defaults: &'a StyleProps,
        variants: &'a VariantState,
    ) -> Self {
        Self {
            tree,
            defaults,
            variants,
        }
    }

    /// Merge every layer that applies to `node`, lowest priority first.
    pub fn layered(&self, node: NodeId) -> StyleProps {
        let Some(data) = self.tree.get(node) else {
            return self.defaults.clone();
        };
        // Closest ancestor first; layers are merged farthest first.
        let ancestors = self.tree.ancestors(node);
        let key = data.id.as_deref();
        let mut props = self.defaults.clone();

        if let Some(key) = key {
            for &ancestor in ancestors.iter().rev() {
                if let Some(layer) = self.tree.get(ancestor).and_then(|a| a.overrides.get(key)) {
                    props = props.merge(layer);
                }
            }
        }

        props = props.merge(&data.props);

        if let Some(key) = key {
            for &ancestor in ancestors.iter().rev() {
                let Some(variants) = self.tree.get(ancestor).and_then(|a| a.variants.as_ref())
                else {
                    continue;
                };
                let selected = variants.select(self.variants.is_active(ancestor));
                if let Some(layer) = selected.overrides.get(key) {
                    props = props.merge(layer);
                }
            }
        }

        if let Some(variants) = &data.variants {
            props = props.merge(&variants.select(self.variants.is_active(node)).props);
        }
        props
    }

    /// Resolve `node` to concrete values. Font sizes are evaluated against
    /// `own`, the element's resolved box.
    pub fn resolve(&self, node: NodeId, own: Size) -> Result<ResolvedStyle, PropertyError> {
        let props = self.layered(node);

        let font_size = match props.font_size.as_ref().filter(|spec| !spec.is_auto()) {
            Some(spec) => spec
                .pixels(own)
                .map_err(|e| PropertyError {
                    property: "font_size".into(),
                    source: StyleError::Expression(e),
                })?
                .unwrap_or(0),
            None => (own.height as f64 * DEFAULT_FONT_SCALE).round() as i32,
        };

        let foreground_color = props.foreground_color.unwrap_or(Color::BLACK);
        Ok(ResolvedStyle {
            background_color: props.background_color.unwrap_or(Color::TRANSPARENT),
            foreground_color,
            outline_color: props.outline_color.unwrap_or(Color::TRANSPARENT),
            outline_width: props.outline_width.unwrap_or(0),
            text: props.text,
            font: props.font,
            font_size,
            font_color: props.font_color.unwrap_or(foreground_color),
            text_align: props.text_align.unwrap_or_default(),
            icon: props.icon,
            icon_color: props.icon_color.unwrap_or(foreground_color),
        })
    }
}
