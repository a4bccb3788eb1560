//! Configuration loading: document sections, templates, tree building.

pub mod document;
pub mod loader;
pub mod template;

pub use document::{Document, MainTabsSection, StylesSection, TabEntry};
pub use loader::{load, load_document, LoadedConfig};
pub use template::{Template, TemplateRegistry};

/// Errors from reading the document or its templates.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration document: {0}")]
    Document(#[from] serde_yaml::Error),
    #[error("template '{template}': {message}")]
    Template { template: String, message: String },
}

impl ConfigError {
    /// The element and property the error is reported against.
    pub fn location(&self) -> (String, String) {
        match self {
            ConfigError::Document(_) => ("<document>".into(), String::new()),
            ConfigError::Template { template, .. } => {
                (format!("template:{template}"), "templates".into())
            }
        }
    }
}
