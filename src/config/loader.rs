//! Building the element tree from a configuration document.
//!
//! Loading is all-or-nothing: any schema, style or expression problem aborts
//! the load with an error naming the element and the raw property.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::dom::{
    ElementData, ElementKind, ElementTree, Fit, NodeId, Orientation, Overrides, PictureSpec,
    PopupSpec, StateVariants, TabPagesSpec, TileSpec, VariantProps,
};
use crate::error::{Error, Result};
use crate::expr::size::raw_value;
use crate::expr::{Edges, ExpressionError, Gutter, SizeSpec};
use crate::geometry::Align;
use crate::layout::grid::MAX_TRACKS;
use crate::layout::GridSpec;
use crate::navigation::{DismissPolicy, PopupManager, Tab, TabController};
use crate::style::properties::{
    ALL_STYLE_KEYS, BUTTON_STYLE_KEYS, COMMON_STYLE_KEYS, ICON_STYLE_KEYS,
};
use crate::style::{engine_defaults, PropertyError, StyleError, StyleProps, TokenTable};
use crate::surface::{AssetInfo, AssetResolver};

use super::document::{Document, MainTabsSection, StylesSection};
use super::template::{TemplateRegistry, TEMPLATE_TYPE_PREFIX};
use super::ConfigError;

/// Nesting limit for templates that instantiate other templates.
const MAX_TEMPLATE_DEPTH: usize = 16;

const COMMON_KEYS: &[&str] = &[
    "id",
    "type",
    "background_color",
    "foreground_color",
    "outline_color",
    "outline_width",
    "active_properties",
    "inactive_properties",
    "active",
];
const GRID_KEYS: &[&str] = &[
    "rows",
    "columns",
    "row_sizes",
    "column_sizes",
    "outer_margins",
    "inner_margins",
    "elements",
    "element_properties",
];
const BUTTON_KEYS: &[&str] = &["text", "font", "font_size", "font_color", "text_align"];
const ICON_KEYS: &[&str] = &["icon", "icon_color"];
const PICTURE_KEYS: &[&str] = &["picture", "fit"];
const TILE_KEYS: &[&str] = &[
    "icon",
    "text",
    "orientation",
    "icon_size",
    "element_properties",
];
const POPUP_KEYS: &[&str] = &[
    "title",
    "title_height",
    "width",
    "height",
    "horizontal_position",
    "vertical_position",
    "close_on_background",
    "auto_close",
    "layout",
    "element_properties",
];

/// Element types that can be written in a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeTag {
    GridLayout,
    Button,
    Icon,
    Picture,
    Tile,
    PopupMenu,
}

impl TypeTag {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "GridLayout" => Some(TypeTag::GridLayout),
            "Button" => Some(TypeTag::Button),
            "Icon" => Some(TypeTag::Icon),
            "Picture" => Some(TypeTag::Picture),
            "Tile" => Some(TypeTag::Tile),
            "PopupMenu" => Some(TypeTag::PopupMenu),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            TypeTag::GridLayout => "GridLayout",
            TypeTag::Button => "Button",
            TypeTag::Icon => "Icon",
            TypeTag::Picture => "Picture",
            TypeTag::Tile => "Tile",
            TypeTag::PopupMenu => "PopupMenu",
        }
    }

    fn own_keys(self) -> &'static [&'static str] {
        match self {
            TypeTag::GridLayout => GRID_KEYS,
            TypeTag::Button => BUTTON_KEYS,
            TypeTag::Icon => ICON_KEYS,
            TypeTag::Picture => PICTURE_KEYS,
            TypeTag::Tile => TILE_KEYS,
            TypeTag::PopupMenu => POPUP_KEYS,
        }
    }

    fn allows(self, key: &str) -> bool {
        COMMON_KEYS.contains(&key) || self.own_keys().contains(&key)
    }

    fn is_container(self) -> bool {
        matches!(self, TypeTag::GridLayout | TypeTag::Tile | TypeTag::PopupMenu)
    }

    fn style_keys(self) -> &'static [&'static str] {
        match self {
            TypeTag::Button => BUTTON_STYLE_KEYS,
            TypeTag::Icon => ICON_STYLE_KEYS,
            _ => COMMON_STYLE_KEYS,
        }
    }
}

/// Style keys an element of `kind` accepts.
fn style_keys_for(kind: &ElementKind) -> &'static [&'static str] {
    match kind {
        ElementKind::Button => BUTTON_STYLE_KEYS,
        ElementKind::Icon => ICON_STYLE_KEYS,
        _ => COMMON_STYLE_KEYS,
    }
}

/// Everything the dashboard needs from a loaded configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub tree: ElementTree,
    pub tokens: TokenTable,
    /// Engine defaults with `styles.defaults` merged on top.
    pub defaults: StyleProps,
    pub tabs: TabController,
    pub popups: PopupManager,
    /// Every icon and picture reference, resolved.
    pub assets: BTreeMap<String, AssetInfo>,
}

/// Parse and load a YAML configuration document.
pub fn load(source: &str, assets: &dyn AssetResolver) -> Result<LoadedConfig> {
    let document: Document = serde_yaml::from_str(source).map_err(ConfigError::from)?;
    load_document(&document, assets)
}

/// Load an already parsed document.
pub fn load_document(document: &Document, assets: &dyn AssetResolver) -> Result<LoadedConfig> {
    let tokens = build_tokens(&document.styles)?;
    let templates = TemplateRegistry::from_section(&document.templates)?;
    debug!(templates = templates.len(), "templates parsed");

    let mut loader = Loader {
        tokens,
        templates,
        assets,
        resolved_assets: BTreeMap::new(),
        named: HashMap::new(),
        named_order: Vec::new(),
        placed: HashSet::new(),
        resolving: Vec::new(),
        template_stack: Vec::new(),
        tree: ElementTree::new(),
    };

    let defaults =
        StyleProps::from_mapping(&document.styles.defaults, &loader.tokens, ALL_STYLE_KEYS)
            .map_err(|e| Error::style("styles.defaults", e))?;
    if let Some(icon) = &defaults.icon {
        loader.resolve_asset("styles.defaults", "icon", icon)?;
    }
    let defaults = engine_defaults(&loader.tokens).merge(&defaults);

    for value in &document.elements {
        loader.register_named("elements", value, true)?;
    }
    for value in &document.layouts {
        loader.register_named("layouts", value, false)?;
    }

    let tabs = match &document.main_tabs {
        Some(section) => loader.build_main_tabs(section)?,
        None => loader.build_implicit_tab(&document.layouts)?,
    };

    let mut popups = PopupManager::new();
    for value in &document.popups {
        let (id, node, policy) = loader.build_popup(value)?;
        popups.register(id, node, policy);
    }

    loader.check_overrides()?;
    for id in &loader.named_order {
        if !loader.placed.contains(id) {
            warn!(element = %id, "element is defined but never placed");
        }
    }

    info!(
        elements = loader.tree.len(),
        tabs = tabs.len(),
        popups = popups.len(),
        "dashboard configuration loaded"
    );
    Ok(LoadedConfig {
        tree: loader.tree,
        tokens: loader.tokens,
        defaults,
        tabs: TabController::new(tabs),
        popups,
        assets: loader.resolved_assets,
    })
}

fn build_tokens(styles: &StylesSection) -> Result<TokenTable> {
    let mut tokens = TokenTable::builtin();
    for (name, value) in &styles.tokens.colors {
        tokens
            .define_color(name, value)
            .map_err(|source| Error::StyleResolution {
                element: "styles.tokens.colors".into(),
                property: name.clone(),
                source,
            })?;
    }
    for (name, file) in &styles.tokens.fonts {
        tokens
            .define_font(name, file)
            .map_err(|source| Error::StyleResolution {
                element: "styles.tokens.fonts".into(),
                property: name.clone(),
                source,
            })?;
    }
    Ok(tokens)
}

fn expression_error(element: &str, property: &str) -> impl FnOnce(ExpressionError) -> Error {
    let element = element.to_string();
    let property = property.to_string();
    move |source| Error::Expression {
        element,
        property,
        source,
    }
}

/// A size spec that is known to parse.
fn default_spec(raw: &str) -> SizeSpec {
    SizeSpec::parse(raw).unwrap_or(SizeSpec::Auto)
}

fn parse_align(raw: &str) -> Option<Align> {
    match raw.to_ascii_lowercase().as_str() {
        "start" | "left" | "top" => Some(Align::Start),
        "center" => Some(Align::Center),
        "end" | "right" | "bottom" => Some(Align::End),
        _ => None,
    }
}

struct Loader<'a> {
    tokens: TokenTable,
    templates: TemplateRegistry,
    assets: &'a dyn AssetResolver,
    resolved_assets: BTreeMap<String, AssetInfo>,
    /// Definitions from `elements` and identified `layouts`.
    named: HashMap<String, Value>,
    named_order: Vec<String>,
    placed: HashSet<String>,
    /// References currently being built, outermost first.
    resolving: Vec<String>,
    template_stack: Vec<String>,
    tree: ElementTree,
}

impl Loader<'_> {
    fn register_named(&mut self, section: &str, value: &Value, require_id: bool) -> Result<()> {
        let id = match value.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(Error::schema(
                    section,
                    "id",
                    format!("identifier '{}' must be a string", raw_value(other)),
                ))
            }
            None if require_id => {
                return Err(Error::schema(section, "id", "entries in this section need an id"))
            }
            None => return Ok(()),
        };
        if self.named.contains_key(&id) {
            return Err(Error::schema(&id, "id", "duplicate element identifier"));
        }
        self.named_order.push(id.clone());
        self.named.insert(id, value.clone());
        Ok(())
    }

    /// Name used in errors for an element not inserted yet.
    fn pending_name(&self, parent: Option<NodeId>, type_name: &str, id: Option<&str>) -> String {
        if let Some(id) = id {
            return format!("{type_name}#{id}");
        }
        match parent {
            Some(parent) => format!(
                "{} > {type_name}[{}]",
                self.tree.describe(parent),
                self.tree.children(parent).len()
            ),
            None => format!("{type_name}[root {}]", self.tree.roots().len()),
        }
    }

    fn resolve_asset(
        &mut self,
        element: &str,
        property: &str,
        reference: &str,
    ) -> Result<AssetInfo> {
        if let Some(info) = self.resolved_assets.get(reference) {
            return Ok(*info);
        }
        let info = self.assets.resolve(reference).ok_or_else(|| {
            Error::schema(element, property, format!("cannot resolve asset '{reference}'"))
        })?;
        self.resolved_assets.insert(reference.to_string(), info);
        Ok(info)
    }

    fn build(&mut self, parent: Option<NodeId>, value: &Value) -> Result<NodeId> {
        match value {
            Value::String(reference) => self.build_reference(parent, reference),
            Value::Mapping(map) => self.build_mapping(parent, map),
            other => Err(Error::schema(
                self.pending_name(parent, "element", None),
                "elements",
                format!(
                    "expected an element or an element reference, found '{}'",
                    raw_value(other)
                ),
            )),
        }
    }

    fn build_reference(&mut self, parent: Option<NodeId>, reference: &str) -> Result<NodeId> {
        if self.resolving.iter().any(|r| r == reference) {
            let mut chain = self.resolving.clone();
            chain.push(reference.to_string());
            return Err(Error::schema(
                reference,
                "elements",
                format!("reference cycle: {}", chain.join(" -> ")),
            ));
        }
        if self.placed.contains(reference) {
            return Err(Error::schema(reference, "elements", "element is placed more than once"));
        }
        let definition = self.named.get(reference).cloned().ok_or_else(|| {
            Error::schema(reference, "elements", "reference to an undefined element")
        })?;

        self.placed.insert(reference.to_string());
        self.resolving.push(reference.to_string());
        let result = self.build(parent, &definition);
        self.resolving.pop();
        result
    }

    fn build_template(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        map: &Mapping,
    ) -> Result<NodeId> {
        let element = format!("template:{name}");
        if self.template_stack.iter().any(|t| t == name)
            || self.template_stack.len() >= MAX_TEMPLATE_DEPTH
        {
            return Err(Error::schema(element, "type", "template instantiates itself"));
        }
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::schema(&element, "type", "unknown template"))?;
        let mut variables = map.clone();
        variables.remove("type");
        let body = template.instantiate(&variables)?;

        self.template_stack.push(name.to_string());
        let result = self.build(parent, &body);
        self.template_stack.pop();
        result
    }

    fn build_mapping(&mut self, parent: Option<NodeId>, map: &Mapping) -> Result<NodeId> {
        let Some(type_name) = map.get("type").and_then(Value::as_str) else {
            return Err(Error::schema(
                self.pending_name(parent, "element", map.get("id").and_then(Value::as_str)),
                "type",
                "missing element type",
            ));
        };
        if let Some(template) = type_name.strip_prefix(TEMPLATE_TYPE_PREFIX) {
            return self.build_template(parent, template.trim(), map);
        }
        let tag = TypeTag::parse(type_name).ok_or_else(|| {
            Error::schema(
                self.pending_name(parent, type_name, map.get("id").and_then(Value::as_str)),
                "type",
                format!("unknown element type '{type_name}'"),
            )
        })?;

        let id = match map.get("id") {
            None => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(other) => {
                return Err(Error::schema(
                    self.pending_name(parent, tag.name(), None),
                    "id",
                    format!("identifier '{}' must be a string", raw_value(other)),
                ))
            }
        };
        let element = self.pending_name(parent, tag.name(), id.as_deref());

        for key in map.keys() {
            match key.as_str() {
                Some(key) if tag.allows(key) => {}
                _ => {
                    return Err(Error::schema(
                        &element,
                        raw_value(key),
                        format!("'{}' is not a property of {}", raw_value(key), tag.name()),
                    ))
                }
            }
        }
        if tag == TypeTag::PopupMenu && parent.is_some() {
            return Err(Error::schema(
                &element,
                "type",
                "PopupMenu elements can only be defined under popups",
            ));
        }
        if let Some(id) = &id {
            if self.tree.lookup(id).is_some() {
                return Err(Error::schema(&element, "id", "duplicate element identifier"));
            }
        }

        let mut data = match tag {
            TypeTag::GridLayout => {
                let children = match map.get("elements") {
                    None | Some(Value::Null) => 0,
                    Some(Value::Sequence(items)) => items.len(),
                    Some(_) => {
                        return Err(Error::schema(&element, "elements", "elements must be a list"))
                    }
                };
                ElementData::new(ElementKind::GridLayout(self.grid_spec(&element, map, children)?))
            }
            TypeTag::Button => ElementData::new(ElementKind::Button),
            TypeTag::Icon => ElementData::new(ElementKind::Icon),
            TypeTag::Picture => {
                ElementData::new(ElementKind::Picture(self.picture_spec(&element, map)?))
            }
            TypeTag::Tile => ElementData::new(ElementKind::Tile(self.tile_spec(&element, map)?)),
            TypeTag::PopupMenu => {
                ElementData::new(ElementKind::PopupMenu(self.popup_spec(&element, map)?))
            }
        };
        data.id = id;

        for (key, value) in map {
            let Some(key) = key.as_str() else { continue };
            if tag.style_keys().contains(&key) {
                data.props.apply(key, value, &self.tokens).map_err(|source| {
                    Error::style(
                        &element,
                        PropertyError {
                            property: key.to_string(),
                            source,
                        },
                    )
                })?;
            }
        }
        if let Some(value) = map.get("element_properties") {
            data.overrides = self.overrides(&element, "element_properties", value)?;
        }
        let active = map.get("active_properties");
        let inactive = map.get("inactive_properties");
        if active.is_some() || inactive.is_some() {
            let keys = tag.style_keys();
            let container = tag.is_container();
            data.variants = Some(StateVariants {
                active: self.variant(&element, "active_properties", active, keys, container)?,
                inactive: self.variant(&element, "inactive_properties", inactive, keys, container)?,
            });
        }
        if let Some(value) = map.get("active") {
            data.initially_active = value
                .as_bool()
                .ok_or_else(|| Error::schema(&element, "active", "active must be true or false"))?;
        }
        self.check_icons(&element, &data)?;

        let node = match parent {
            Some(parent) => self.tree.insert_child(parent, data),
            None => self.tree.insert_root(data),
        };

        match tag {
            TypeTag::GridLayout => {
                if let Some(Value::Sequence(items)) = map.get("elements") {
                    for item in items {
                        self.build(Some(node), item)?;
                    }
                }
            }
            TypeTag::Tile => {
                self.build_tile_parts(&element, node, map.get("icon"), map.get("text"))?
            }
            TypeTag::PopupMenu => {
                if let Some(title) = map.get("title") {
                    let mut props = StyleProps::new();
                    props.apply("text", title, &self.tokens).map_err(|source| {
                        Error::style(
                            &element,
                            PropertyError {
                                property: "title".into(),
                                source,
                            },
                        )
                    })?;
                    self.tree.insert_child(
                        node,
                        ElementData::new(ElementKind::Button).with_part("title").with_props(props),
                    );
                }
                let layout = map
                    .get("layout")
                    .ok_or_else(|| Error::schema(&element, "layout", "a popup needs a layout"))?;
                self.build(Some(node), layout)?;
            }
            TypeTag::Button | TypeTag::Icon | TypeTag::Picture => {}
        }
        Ok(node)
    }

    fn grid_spec(&self, element: &str, map: &Mapping, children: usize) -> Result<GridSpec> {
        let count = |key: &str| -> Result<Option<usize>> {
            match map.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(value) => value
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .filter(|n| (1..=MAX_TRACKS).contains(n))
                    .map(Some)
                    .ok_or_else(|| {
                        Error::schema(
                            element,
                            key,
                            format!(
                                "'{}' is not an integer between 1 and {MAX_TRACKS}",
                                raw_value(value)
                            ),
                        )
                    }),
            }
        };
        let columns = count("columns")?.unwrap_or(1);
        let rows = count("rows")?.unwrap_or_else(|| children.div_ceil(columns).max(1));
        let mut spec = GridSpec::new(rows, columns);

        if let Some(value) = map.get("row_sizes") {
            spec.row_sizes = track_specs(element, "row_sizes", value, rows)?;
        }
        if let Some(value) = map.get("column_sizes") {
            spec.column_sizes = track_specs(element, "column_sizes", value, columns)?;
        }
        if let Some(value) = map.get("outer_margins") {
            spec.outer_margins =
                Edges::from_value(value).map_err(expression_error(element, "outer_margins"))?;
        }
        if let Some(value) = map.get("inner_margins") {
            spec.inner_margins =
                Gutter::from_value(value).map_err(expression_error(element, "inner_margins"))?;
        }
        if children > spec.capacity() {
            return Err(Error::schema(
                element,
                "elements",
                format!(
                    "{children} elements do not fit in {rows} rows of {columns} columns"
                ),
            ));
        }
        Ok(spec)
    }

    fn picture_spec(&mut self, element: &str, map: &Mapping) -> Result<PictureSpec> {
        let source = map
            .get("picture")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::schema(element, "picture", "a picture needs a picture reference")
            })?
            .to_string();
        let intrinsic = self.resolve_asset(element, "picture", &source)?.size();
        let fit = match map.get("fit") {
            None => Fit::default(),
            Some(value) => serde_yaml::from_value::<Fit>(value.clone()).map_err(|_| {
                Error::schema(
                    element,
                    "fit",
                    format!("'{}' is not one of contain, cover, stretch", raw_value(value)),
                )
            })?,
        };
        Ok(PictureSpec {
            source,
            intrinsic,
            fit,
        })
    }

    fn tile_spec(&self, element: &str, map: &Mapping) -> Result<TileSpec> {
        let orientation = match map.get("orientation") {
            None => Orientation::default(),
            Some(value) => serde_yaml::from_value::<Orientation>(value.clone()).map_err(|_| {
                Error::schema(
                    element,
                    "orientation",
                    format!("'{}' is not one of vertical, horizontal", raw_value(value)),
                )
            })?,
        };
        let icon_size = match map.get("icon_size") {
            Some(value) => {
                SizeSpec::from_value(value).map_err(expression_error(element, "icon_size"))?
            }
            None => match orientation {
                Orientation::Vertical => default_spec("h*0.6"),
                Orientation::Horizontal => default_spec("w*0.4"),
            },
        };
        Ok(TileSpec {
            orientation,
            icon_size,
        })
    }

    fn build_tile_parts(
        &mut self,
        element: &str,
        tile: NodeId,
        icon: Option<&Value>,
        text: Option<&Value>,
    ) -> Result<()> {
        let mut icon_props = StyleProps::new();
        let mut name_props = StyleProps::new();
        let parts = [("icon", icon, &mut icon_props), ("text", text, &mut name_props)];
        for (property, value, props) in parts {
            if let Some(value) = value {
                props.apply(property, value, &self.tokens).map_err(|source| {
                    Error::style(
                        element,
                        PropertyError {
                            property: property.into(),
                            source,
                        },
                    )
                })?;
            }
        }
        if let Some(reference) = &icon_props.icon {
            self.resolve_asset(element, "icon", reference)?;
        }
        self.tree.insert_child(
            tile,
            ElementData::new(ElementKind::Icon).with_part("icon").with_props(icon_props),
        );
        self.tree.insert_child(
            tile,
            ElementData::new(ElementKind::Button).with_part("name").with_props(name_props),
        );
        Ok(())
    }

    fn popup_spec(&self, element: &str, map: &Mapping) -> Result<PopupSpec> {
        let size = |key: &str, default: &str| -> Result<SizeSpec> {
            match map.get(key) {
                Some(value) => SizeSpec::from_value(value).map_err(expression_error(element, key)),
                None => Ok(default_spec(default)),
            }
        };
        let align = |key: &str| -> Result<Align> {
            match map.get(key) {
                None => Ok(Align::Center),
                Some(value) => value.as_str().and_then(parse_align).ok_or_else(|| {
                    Error::schema(
                        element,
                        key,
                        format!("'{}' is not one of start, center, end", raw_value(value)),
                    )
                }),
            }
        };
        let close_on_background = match map.get("close_on_background") {
            None => true,
            Some(value) => value.as_bool().ok_or_else(|| {
                Error::schema(
                    element,
                    "close_on_background",
                    "close_on_background must be true or false",
                )
            })?,
        };
        let auto_close = match map.get("auto_close") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let invalid = || {
                    Error::schema(
                        element,
                        "auto_close",
                        format!("'{}' is not a positive number of seconds", raw_value(value)),
                    )
                };
                let seconds = value.as_f64().filter(|s| *s > 0.0).ok_or_else(invalid)?;
                Some(Duration::try_from_secs_f64(seconds).map_err(|_| invalid())?)
            }
        };
        Ok(PopupSpec {
            width: size("width", "w*0.8")?,
            height: size("height", "h*0.6")?,
            horizontal: align("horizontal_position")?,
            vertical: align("vertical_position")?,
            title_height: size("title_height", "h*0.15")?,
            has_title: map.contains_key("title"),
            close_on_background,
            auto_close,
        })
    }

    fn overrides(&self, element: &str, property: &str, value: &Value) -> Result<Overrides> {
        let map = match value {
            Value::Null => return Ok(Overrides::new()),
            Value::Mapping(map) => map,
            other => {
                return Err(Error::schema(
                    element,
                    property,
                    format!("'{}' is not a mapping of identifiers to properties", raw_value(other)),
                ))
            }
        };
        let mut overrides = Overrides::new();
        for (target, props) in map {
            let Some(target) = target.as_str() else {
                return Err(Error::schema(
                    element,
                    property,
                    format!("'{}' is not an element identifier", raw_value(target)),
                ));
            };
            let parsed = match props {
                Value::Null => StyleProps::new(),
                Value::Mapping(props) => {
                    StyleProps::from_mapping(props, &self.tokens, ALL_STYLE_KEYS).map_err(|e| {
                        match e.source {
                            StyleError::UnknownProperty => Error::schema(
                                element,
                                format!("{property}.{target}.{}", e.property),
                                format!("'{}' is not a style property", e.property),
                            ),
                            source => Error::style(
                                element,
                                PropertyError {
                                    property: format!("{property}.{target}.{}", e.property),
                                    source,
                                },
                            ),
                        }
                    })?
                }
                other => {
                    return Err(Error::schema(
                        element,
                        format!("{property}.{target}"),
                        format!("'{}' is not a mapping of style properties", raw_value(other)),
                    ))
                }
            };
            overrides.insert(target.to_string(), parsed);
        }
        Ok(overrides)
    }

    fn variant(
        &self,
        element: &str,
        property: &str,
        value: Option<&Value>,
        style_keys: &[&str],
        allow_overrides: bool,
    ) -> Result<VariantProps> {
        let mut variant = VariantProps::default();
        let map = match value {
            None | Some(Value::Null) => return Ok(variant),
            Some(Value::Mapping(map)) => map,
            Some(other) => {
                return Err(Error::schema(
                    element,
                    property,
                    format!("'{}' is not a mapping of style properties", raw_value(other)),
                ))
            }
        };
        for (key, value) in map {
            let name = key.as_str().unwrap_or_default();
            if name == "element_properties" && allow_overrides {
                variant.overrides =
                    self.overrides(element, &format!("{property}.element_properties"), value)?;
                continue;
            }
            if !style_keys.contains(&name) {
                return Err(Error::schema(
                    element,
                    format!("{property}.{}", raw_value(key)),
                    "state variants may only hold style properties of the element",
                ));
            }
            variant.props.apply(name, value, &self.tokens).map_err(|source| {
                Error::style(
                    element,
                    PropertyError {
                        property: format!("{property}.{name}"),
                        source,
                    },
                )
            })?;
        }
        Ok(variant)
    }

    fn check_icons(&mut self, element: &str, data: &ElementData) -> Result<()> {
        let mut layers: Vec<&StyleProps> = vec![&data.props];
        layers.extend(data.overrides.values());
        if let Some(variants) = &data.variants {
            for variant in [&variants.active, &variants.inactive] {
                layers.push(&variant.props);
                layers.extend(variant.overrides.values());
            }
        }
        let references: Vec<String> = layers.iter().filter_map(|p| p.icon.clone()).collect();
        for reference in references {
            self.resolve_asset(element, "icon", &reference)?;
        }
        Ok(())
    }

    fn build_main_tabs(&mut self, section: &MainTabsSection) -> Result<Vec<Tab>> {
        let element = match &section.id {
            Some(id) => format!("TabPages#{id}"),
            None => "main_tabs".to_string(),
        };
        if section.tabs.is_empty() {
            return Err(Error::schema(&element, "tabs", "at least one tab is needed"));
        }
        let mut names = HashSet::new();
        for tab in &section.tabs {
            if !names.insert(tab.name.as_str()) {
                return Err(Error::schema(
                    &element,
                    "tabs",
                    format!("tab name '{}' is used more than once", tab.name),
                ));
            }
        }

        let navigation_size = match &section.navigation_size {
            Some(value) => {
                SizeSpec::from_value(value).map_err(expression_error(&element, "navigation_size"))?
            }
            None => SizeSpec::Auto,
        };
        let has_navigation = !section.hide_navigation_bar;
        let props =
            StyleProps::from_mapping(&section.style_mapping(), &self.tokens, COMMON_STYLE_KEYS)
                .map_err(|e| Error::style(&element, e))?;
        let overrides = match &section.element_properties {
            Some(map) => {
                let map = Value::Mapping(map.clone());
                self.overrides(&element, "element_properties", &map)?
            }
            None => Overrides::new(),
        };
        let active = section.active_properties.clone().map(Value::Mapping);
        let inactive = section.inactive_properties.clone().map(Value::Mapping);
        let tile_variants = StateVariants {
            active: self.variant(
                &element,
                "active_properties",
                active.as_ref(),
                COMMON_STYLE_KEYS,
                true,
            )?,
            inactive: self.variant(
                &element,
                "inactive_properties",
                inactive.as_ref(),
                COMMON_STYLE_KEYS,
                true,
            )?,
        };

        let mut root = ElementData::new(ElementKind::TabPages(TabPagesSpec {
            location: section.location,
            navigation_size,
            has_navigation,
        }))
        .with_props(props);
        root.overrides = overrides;
        if let Some(id) = &section.id {
            if self.named.contains_key(id) {
                return Err(Error::schema(&element, "id", "duplicate element identifier"));
            }
            root = root.with_id(id);
        }
        self.check_icons(&element, &root)?;
        let root = self.tree.insert_root(root);

        let count = section.tabs.len();
        if count > MAX_TRACKS {
            return Err(Error::schema(
                &element,
                "tabs",
                format!("{count} tabs exceed the limit of {MAX_TRACKS}"),
            ));
        }
        let mut tiles = vec![None; count];
        if has_navigation {
            let grid = if section.location.is_horizontal() {
                GridSpec::new(1, count)
            } else {
                GridSpec::new(count, 1)
            };
            let nav = self.tree.insert_child(
                root,
                ElementData::new(ElementKind::GridLayout(grid)).with_part("navigation"),
            );
            for (index, tab) in section.tabs.iter().enumerate() {
                let mut tile = ElementData::new(ElementKind::Tile(TileSpec {
                    orientation: Orientation::Vertical,
                    icon_size: default_spec("h*0.6"),
                }))
                .with_part("tab")
                .with_variants(tile_variants.clone());
                tile.initially_active = index == 0;
                self.check_icons(&element, &tile)?;
                let tile = self.tree.insert_child(nav, tile);
                let icon = tab.icon.clone().map(Value::String);
                let name = Value::String(tab.name.clone());
                self.build_tile_parts(&element, tile, icon.as_ref(), Some(&name))?;
                tiles[index] = Some(tile);
            }
        }

        let mut tabs = Vec::with_capacity(count);
        for (tab, tile) in section.tabs.iter().zip(tiles) {
            let page = self.build(Some(root), &tab.element)?;
            tabs.push(Tab {
                name: tab.name.clone(),
                page,
                tile,
            });
        }
        debug!(tabs = tabs.len(), has_navigation, "main tabs built");
        Ok(tabs)
    }

    fn build_implicit_tab(&mut self, layouts: &[Value]) -> Result<Vec<Tab>> {
        let first = layouts
            .first()
            .ok_or_else(|| Error::schema("<document>", "layouts", "no layouts are defined"))?;
        let root = self.tree.insert_root(ElementData::new(ElementKind::TabPages(TabPagesSpec {
            location: Default::default(),
            navigation_size: SizeSpec::Auto,
            has_navigation: false,
        })));
        let (name, page) = match first.get("id").and_then(Value::as_str) {
            Some(id) => (id.to_string(), self.build_reference(Some(root), id)?),
            None => ("main".to_string(), self.build(Some(root), first)?),
        };
        Ok(vec![Tab {
            name,
            page,
            tile: None,
        }])
    }

    fn build_popup(&mut self, value: &Value) -> Result<(String, NodeId, DismissPolicy)> {
        let mut value = value.clone();
        if let Value::Mapping(map) = &mut value {
            if !map.contains_key("type") {
                map.insert(Value::from("type"), Value::from("PopupMenu"));
            }
        }
        let node = self.build(None, &value)?;
        let element = self.tree.describe(node);
        let data = self
            .tree
            .get(node)
            .ok_or_else(|| Error::schema(&element, "popups", "popup was not built"))?;
        let ElementKind::PopupMenu(spec) = &data.kind else {
            return Err(Error::schema(
                &element,
                "type",
                "entries under popups must be PopupMenu elements",
            ));
        };
        let id = data
            .global_id()
            .ok_or_else(|| Error::schema(&element, "id", "a popup needs an id"))?
            .to_string();
        let policy = DismissPolicy {
            close_on_background: spec.close_on_background,
            auto_close: spec.auto_close,
        };
        Ok((id, node, policy))
    }

    /// Warn about `element_properties` entries that match nothing and reject
    /// entries setting properties their target does not have.
    fn check_overrides(&self) -> Result<()> {
        for (node, data) in self.tree.iter() {
            let mut layers: Vec<(&String, &StyleProps)> = data.overrides.iter().collect();
            if let Some(variants) = &data.variants {
                layers.extend(variants.active.overrides.iter());
                layers.extend(variants.inactive.overrides.iter());
            }
            if layers.is_empty() {
                continue;
            }
            let descendants = self.tree.walk_depth_first(node);
            for (key, props) in layers {
                let mut matched = false;
                for &target in descendants.iter().skip(1) {
                    let Some(target_data) = self.tree.get(target) else { continue };
                    if target_data.id.as_deref() != Some(key.as_str()) {
                        continue;
                    }
                    matched = true;
                    let allowed = style_keys_for(&target_data.kind);
                    if let Some(bad) = props.set_keys().into_iter().find(|k| !allowed.contains(k)) {
                        return Err(Error::schema(
                            self.tree.describe(node),
                            format!("element_properties.{key}.{bad}"),
                            format!(
                                "'{bad}' is not a style property of {}",
                                target_data.kind.name()
                            ),
                        ));
                    }
                }
                if !matched {
                    warn!(
                        element = %self.tree.describe(node),
                        target = %key,
                        "element_properties entry matches no descendant"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Per-track size specs: a scalar applies to every track, a list is padded
/// with unspecified tracks.
fn track_specs(
    element: &str,
    property: &str,
    value: &Value,
    count: usize,
) -> Result<Vec<SizeSpec>> {
    match value {
        Value::Sequence(items) => {
            if items.len() > count {
                return Err(Error::schema(
                    element,
                    property,
                    format!("{} sizes given for {count} tracks", items.len()),
                ));
            }
            let mut specs = items
                .iter()
                .map(SizeSpec::from_value)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(expression_error(element, property))?;
            specs.resize(count, SizeSpec::Auto);
            Ok(specs)
        }
        scalar => {
            let spec = SizeSpec::from_value(scalar).map_err(expression_error(element, property))?;
            Ok(vec![spec; count])
        }
    }
}
