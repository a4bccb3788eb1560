//! Crate-level error type.
//!
//! Module errors ([`ExpressionError`], [`StyleError`], [`LayoutError`],
//! [`NavigationError`], [`ConfigError`]) are wrapped with the element they
//! concern (its identifier, or its tree path when anonymous) and the raw
//! property that triggered them.

use crate::config::ConfigError;
use crate::expr::ExpressionError;
use crate::layout::LayoutError;
use crate::navigation::NavigationError;
use crate::style::{PropertyError, StyleError};

/// Any failure the engine reports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{element}: bad size expression in '{property}': {source}")]
    Expression {
        element: String,
        property: String,
        #[source]
        source: ExpressionError,
    },

    #[error("{element}: cannot resolve style property '{property}': {source}")]
    StyleResolution {
        element: String,
        property: String,
        #[source]
        source: StyleError,
    },

    #[error("{element}: layout overflow in '{property}': {source}")]
    LayoutOverflow {
        element: String,
        property: String,
        #[source]
        source: LayoutError,
    },

    #[error("popup '{requested}' cannot open while popup '{active}' is active")]
    PopupConflict { active: String, requested: String },

    #[error("tab index {index} is out of range for {count} tabs")]
    InvalidTabIndex { index: usize, count: usize },

    #[error("{element}: {message}")]
    ConfigurationSchema {
        element: String,
        property: String,
        message: String,
    },
}

impl Error {
    /// A schema error for `element`, triggered by `property`.
    pub fn schema(
        element: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::ConfigurationSchema {
            element: element.into(),
            property: property.into(),
            message: message.into(),
        }
    }

    /// Wrap a layout failure. Expression failures keep their own category.
    pub fn layout(element: impl Into<String>, source: LayoutError) -> Self {
        let element = element.into();
        match source {
            LayoutError::Expression { property, source } => Error::Expression {
                element,
                property,
                source,
            },
            other => Error::LayoutOverflow {
                element,
                property: other.property(),
                source: other,
            },
        }
    }

    /// Wrap a style property failure. Expression failures keep their own
    /// category.
    pub fn style(element: impl Into<String>, error: PropertyError) -> Self {
        let element = element.into();
        match error.source {
            StyleError::Expression(source) => Error::Expression {
                element,
                property: error.property,
                source,
            },
            source => Error::StyleResolution {
                element,
                property: error.property,
                source,
            },
        }
    }

    /// The element the error concerns, if any.
    pub fn element(&self) -> Option<&str> {
        match self {
            Error::Expression { element, .. }
            | Error::StyleResolution { element, .. }
            | Error::LayoutOverflow { element, .. }
            | Error::ConfigurationSchema { element, .. } => Some(element),
            Error::PopupConflict { requested, .. } => Some(requested),
            Error::InvalidTabIndex { .. } => None,
        }
    }

    /// The raw property that triggered the error, if any.
    pub fn property(&self) -> Option<&str> {
        match self {
            Error::Expression { property, .. }
            | Error::StyleResolution { property, .. }
            | Error::LayoutOverflow { property, .. }
            | Error::ConfigurationSchema { property, .. } => Some(property),
            Error::PopupConflict { .. } | Error::InvalidTabIndex { .. } => None,
        }
    }
}

impl From<NavigationError> for Error {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::PopupConflict { active, requested } => {
                Error::PopupConflict { active, requested }
            }
            NavigationError::InvalidTabIndex { index, count } => {
                Error::InvalidTabIndex { index, count }
            }
            NavigationError::UnknownPopup { id } => {
                Error::schema(id, "popups", "no popup with this id is defined")
            }
            NavigationError::UnknownTab { name } => {
                Error::schema(name, "main_tabs", "no tab with this name is defined")
            }
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        let (element, property) = err.location();
        Error::schema(element, property, err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
