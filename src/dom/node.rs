//! Node types: NodeId, ElementData, state variants.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::dom::kind::ElementKind;
use crate::style::StyleProps;

new_key_type! {
    /// Unique identifier for an element in the arena. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Style properties keyed by descendant identifier (`element_properties`).
pub type Overrides = BTreeMap<String, StyleProps>;

/// One side of a state variant: properties for the element itself and for
/// its descendants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantProps {
    pub props: StyleProps,
    pub overrides: Overrides,
}

/// `active_properties` / `inactive_properties` of a stateful element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateVariants {
    pub active: VariantProps,
    pub inactive: VariantProps,
}

impl StateVariants {
    /// The variant in effect for the given state.
    pub fn select(&self, active: bool) -> &VariantProps {
        if active {
            &self.active
        } else {
            &self.inactive
        }
    }
}

/// Data associated with a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Type tag and layout properties.
    pub kind: ElementKind,
    /// Identifier. Unique across the configuration unless `scoped`.
    pub id: Option<String>,
    /// The identifier names a generated part (`icon`, `name`, `title`) and
    /// is only meaningful to `element_properties` of its ancestors.
    pub scoped: bool,
    /// Declared style properties.
    pub props: StyleProps,
    /// `element_properties` declared on this element.
    pub overrides: Overrides,
    /// State variants, if the element is stateful.
    pub variants: Option<StateVariants>,
    /// Variant selected when the dashboard starts.
    pub initially_active: bool,
}

impl ElementData {
    /// Create element data with no identifier or properties.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            scoped: false,
            props: StyleProps::new(),
            overrides: Overrides::new(),
            variants: None,
            initially_active: false,
        }
    }

    /// Set a global identifier (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self.scoped = false;
        self
    }

    /// Set a part identifier scoped to the parent (builder).
    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.id = Some(part.into());
        self.scoped = true;
        self
    }

    /// Set declared style properties (builder).
    pub fn with_props(mut self, props: StyleProps) -> Self {
        self.props = props;
        self
    }

    /// Add an `element_properties` entry (builder).
    pub fn with_override(mut self, key: impl Into<String>, props: StyleProps) -> Self {
        self.overrides.insert(key.into(), props);
        self
    }

    /// Set state variants (builder).
    pub fn with_variants(mut self, variants: StateVariants) -> Self {
        self.variants = Some(variants);
        self
    }

    /// Whether this element is addressable by global identifier.
    pub fn global_id(&self) -> Option<&str> {
        if self.scoped {
            None
        } else {
            self.id.as_deref()
        }
    }

    /// Whether this element carries state variants.
    pub fn is_stateful(&self) -> bool {
        self.variants.is_some()
    }
}
