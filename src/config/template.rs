//! Element templates.
//!
//! A template is an element body with holes in it:
//!
//! ```yaml
//! templates:
//!   labelled:
//!     defaults:
//!       color: black
//!     element:
//!       type: Button
//!       text: !tmp_var label
//!       font_color: !tmp_var color
//!       !tmp_extend extra: ~
//! ```
//!
//! `!tmp_var name` is replaced by a variable. `!tmp_extend name` merges a
//! mapping variable when used as a mapping key, and splices a sequence
//! variable when used as a sequence item. An element written as
//! `type: template:labelled` instantiates the template; its other keys are
//! the variables.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use super::ConfigError;

const VARIABLE_TAGS: &[&str] = &["tmp_var", "tmp_variable", "template_var", "template_variable"];
const EXTEND_TAGS: &[&str] = &["tmp_extend", "template_extend"];
const ALLOWED_ENTRIES: &[&str] = &["defaults", "element"];

/// Prefix of the `type` value that instantiates a template.
pub const TEMPLATE_TYPE_PREFIX: &str = "template:";

fn tag_name(tagged: &TaggedValue) -> String {
    tagged.tag.to_string().trim_start_matches('!').to_string()
}

fn is_variable(tagged: &TaggedValue) -> bool {
    VARIABLE_TAGS.contains(&tag_name(tagged).as_str())
}

fn is_extend(tagged: &TaggedValue) -> bool {
    EXTEND_TAGS.contains(&tag_name(tagged).as_str())
}

/// Variable named by an extension key: the tagged scalar, or the entry's
/// value when the scalar is empty (`!tmp_extend : name`).
fn extension_name(tagged: &TaggedValue, entry_value: Option<&Value>) -> Option<String> {
    match &tagged.value {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        _ => entry_value.and_then(Value::as_str).map(str::to_string),
    }
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    body: Value,
    defaults: Mapping,
    required: BTreeSet<String>,
    mapping_variables: BTreeSet<String>,
    sequence_variables: BTreeSet<String>,
}

#[derive(Default)]
struct Usage {
    variables: BTreeSet<String>,
    mapping: BTreeSet<String>,
    sequence: BTreeSet<String>,
}

impl Usage {
    fn scan(&mut self, value: &Value) {
        match value {
            Value::Tagged(tagged) if is_variable(tagged) => {
                if let Some(name) = tagged.value.as_str() {
                    self.variables.insert(name.to_string());
                }
            }
            Value::Tagged(tagged) => self.scan(&tagged.value),
            Value::Mapping(map) => {
                for (key, entry) in map {
                    match key {
                        Value::Tagged(tagged) if is_extend(tagged) => {
                            if let Some(name) = extension_name(tagged, Some(entry)) {
                                self.mapping.insert(name);
                            }
                        }
                        other => {
                            self.scan(other);
                            self.scan(entry);
                        }
                    }
                }
            }
            Value::Sequence(items) => {
                for item in items {
                    match item {
                        Value::Tagged(tagged) if is_extend(tagged) => {
                            if let Some(name) = extension_name(tagged, None) {
                                self.sequence.insert(name);
                            }
                        }
                        other => self.scan(other),
                    }
                }
            }
            _ => {}
        }
    }
}

impl Template {
    /// Parse the definition of template `name`.
    pub fn parse(name: &str, definition: &Value) -> Result<Self, ConfigError> {
        let error = |message: String| ConfigError::Template {
            template: name.to_string(),
            message,
        };
        let map = definition
            .as_mapping()
            .ok_or_else(|| error("a template must be a mapping".into()))?;

        let invalid: Vec<String> = map
            .keys()
            .filter_map(|k| match k.as_str() {
                Some(key) if ALLOWED_ENTRIES.contains(&key) => None,
                Some(key) => Some(key.to_string()),
                None => Some(format!("{k:?}")),
            })
            .collect();
        if !invalid.is_empty() {
            return Err(error(format!(
                "invalid entries {invalid:?}, only 'defaults' and 'element' are allowed"
            )));
        }

        let body = map
            .get("element")
            .cloned()
            .ok_or_else(|| error("a template must have an element entry".into()))?;
        let defaults = match map.get("defaults") {
            None | Some(Value::Null) => Mapping::new(),
            Some(Value::Mapping(defaults)) => defaults.clone(),
            Some(_) => return Err(error("defaults must be a mapping".into())),
        };

        let mut usage = Usage::default();
        usage.scan(&body);

        let both: Vec<&String> = usage.mapping.intersection(&usage.sequence).collect();
        if !both.is_empty() {
            return Err(error(format!(
                "variables {both:?} are used for both mapping and sequence extension"
            )));
        }

        for (key, value) in &defaults {
            let Some(key) = key.as_str() else {
                return Err(error("default variable names must be strings".into()));
            };
            if usage.mapping.contains(key) && !value.is_mapping() {
                return Err(error(format!(
                    "default for mapping variable '{key}' must be a mapping"
                )));
            }
            if usage.sequence.contains(key) && !value.is_sequence() {
                return Err(error(format!(
                    "default for sequence variable '{key}' must be a sequence"
                )));
            }
            if !usage.variables.contains(key)
                && !usage.mapping.contains(key)
                && !usage.sequence.contains(key)
            {
                warn!(template = name, variable = key, "default variable is not used in template");
            }
        }

        let required = usage
            .variables
            .iter()
            .filter(|v| !defaults.contains_key(v.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            name: name.to_string(),
            body,
            defaults,
            required,
            mapping_variables: usage.mapping,
            sequence_variables: usage.sequence,
        })
    }

    /// Template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variables an instance must provide.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Build the element body with `variables` filled in.
    pub fn instantiate(&self, variables: &Mapping) -> Result<Value, ConfigError> {
        let error = |message: String| ConfigError::Template {
            template: self.name.clone(),
            message,
        };

        let missing: Vec<&String> = self
            .required
            .iter()
            .filter(|v| !variables.contains_key(v.as_str()))
            .collect();
        if !missing.is_empty() {
            return Err(error(format!("missing required variables {missing:?}")));
        }
        for name in &self.mapping_variables {
            if variables.get(name.as_str()).is_some_and(|v| !v.is_mapping()) {
                return Err(error(format!("variable '{name}' must be a mapping")));
            }
        }
        for name in &self.sequence_variables {
            if variables.get(name.as_str()).is_some_and(|v| !v.is_sequence()) {
                return Err(error(format!("variable '{name}' must be a sequence")));
            }
        }

        let mut merged: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in self.defaults.iter().chain(variables.iter()) {
            if let Some(key) = key.as_str() {
                merged.insert(key.to_string(), value.clone());
            }
        }
        debug!(template = %self.name, variables = merged.len(), "instantiating template");
        substitute(&self.body, &merged).map_err(error)
    }
}

fn substitute(value: &Value, variables: &BTreeMap<String, Value>) -> Result<Value, String> {
    match value {
        Value::Tagged(tagged) if is_variable(tagged) => {
            let name = tagged
                .value
                .as_str()
                .ok_or_else(|| "a variable tag must name a variable".to_string())?;
            variables
                .get(name)
                .cloned()
                .ok_or_else(|| format!("variable '{name}' has no value"))
        }
        Value::Tagged(tagged) => Ok(Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: substitute(&tagged.value, variables)?,
        }))),
        Value::Mapping(map) => {
            let mut out = Mapping::new();
            for (key, entry) in map {
                match key {
                    Value::Tagged(tagged) if is_extend(tagged) => {
                        let Some(name) = extension_name(tagged, Some(entry)) else {
                            return Err("an extension tag must name a variable".into());
                        };
                        if let Some(Value::Mapping(extra)) = variables.get(&name) {
                            for (k, v) in extra {
                                out.insert(k.clone(), v.clone());
                            }
                        }
                    }
                    _ => {
                        out.insert(substitute(key, variables)?, substitute(entry, variables)?);
                    }
                }
            }
            Ok(Value::Mapping(out))
        }
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Tagged(tagged) if is_extend(tagged) => {
                        let Some(name) = extension_name(tagged, None) else {
                            return Err("an extension tag must name a variable".into());
                        };
                        if let Some(Value::Sequence(extra)) = variables.get(&name) {
                            out.extend(extra.iter().cloned());
                        }
                    }
                    other => out.push(substitute(other, variables)?),
                }
            }
            Ok(Value::Sequence(out))
        }
        other => Ok(other.clone()),
    }
}

/// All templates of a document, by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    /// Parse the `templates` section.
    pub fn from_section(section: &Mapping) -> Result<Self, ConfigError> {
        let mut templates = BTreeMap::new();
        for (name, definition) in section {
            let name = name.as_str().ok_or_else(|| ConfigError::Template {
                template: format!("{name:?}"),
                message: "template names must be strings".into(),
            })?;
            templates.insert(name.to_string(), Template::parse(name, definition)?);
        }
        Ok(Self { templates })
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no template is defined.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    fn mapping(src: &str) -> Mapping {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn substitutes_variables_with_defaults() {
        let template = Template::parse(
            "labelled",
            &yaml(
                "defaults:\n  color: black\nelement:\n  type: Button\n  text: !tmp_var label\n  font_color: !template_variable color\n",
            ),
        )
        .unwrap();
        assert_eq!(template.required().collect::<Vec<_>>(), vec!["label"]);

        let element = template.instantiate(&mapping("label: Hello")).unwrap();
        assert_eq!(element, yaml("type: Button\ntext: Hello\nfont_color: black\n"));

        let element = template.instantiate(&mapping("label: Hi\ncolor: red")).unwrap();
        assert_eq!(element, yaml("type: Button\ntext: Hi\nfont_color: red\n"));
    }

    #[test]
    fn mapping_extension_merges_in_place() {
        let template = Template::parse(
            "t",
            &yaml("element:\n  type: Button\n  text: base\n  !tmp_extend extra: ~\n  font: clock\n"),
        )
        .unwrap();
        let element = template
            .instantiate(&mapping("extra:\n  text: extended\n  font: header\n"))
            .unwrap();
        // Entries after the extension still override it.
        assert_eq!(element, yaml("type: Button\ntext: extended\nfont: clock\n"));

        let element = template.instantiate(&Mapping::new()).unwrap();
        assert_eq!(element, yaml("type: Button\ntext: base\nfont: clock\n"));
    }

    #[test]
    fn sequence_extension_splices() {
        let template = Template::parse(
            "row",
            &yaml("element:\n  type: GridLayout\n  elements:\n    - type: Icon\n    - !tmp_extend more\n"),
        )
        .unwrap();
        let element = template
            .instantiate(&mapping("more:\n  - type: Button\n  - type: Button\n"))
            .unwrap();
        let elements = element.get("elements").unwrap().as_sequence().unwrap();
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn missing_required_variable() {
        let template = Template::parse("t", &yaml("element:\n  text: !tmp_var label\n")).unwrap();
        let err = template.instantiate(&Mapping::new()).unwrap_err();
        assert!(err.to_string().contains("label"));
    }

    #[test]
    fn wrongly_typed_extension_variable() {
        let template = Template::parse("t", &yaml("element:\n  !tmp_extend extra: ~\n")).unwrap();
        assert!(template.instantiate(&mapping("extra: [1, 2]")).is_err());

        let template = Template::parse("t", &yaml("element:\n  - !tmp_extend items\n")).unwrap();
        assert!(template.instantiate(&mapping("items: {a: 1}")).is_err());
    }

    #[test]
    fn rejects_invalid_definitions() {
        assert!(Template::parse("t", &yaml("defaults: {}\n")).is_err());
        assert!(Template::parse("t", &yaml("element: {}\nextra: 1\n")).is_err());
        assert!(Template::parse(
            "t",
            &yaml("element:\n  !tmp_extend x: ~\n  list:\n    - !tmp_extend x\n")
        )
        .is_err());
        assert!(Template::parse(
            "t",
            &yaml("defaults:\n  x: 3\nelement:\n  !tmp_extend x: ~\n")
        )
        .is_err());
    }

    #[test]
    fn unused_default_is_accepted() {
        let template =
            Template::parse("t", &yaml("defaults:\n  unused: 1\nelement:\n  type: Icon\n"));
        assert!(template.is_ok());
    }

    #[test]
    fn registry_lookup() {
        let registry = TemplateRegistry::from_section(&mapping(
            "a:\n  element:\n    type: Icon\nb:\n  element:\n    type: Button\n",
        ))
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("b").unwrap().name(), "b");
        assert!(registry.get("c").is_none());
    }
}
