//! Style engine: colors, tokens, typed properties, cascade.

pub mod color;
pub mod tokens;
pub mod properties;
pub mod cascade;

pub use cascade::{engine_defaults, Cascade, ResolvedStyle, StyleMap, VariantState};
pub use color::Color;
pub use properties::{PropertyError, StyleProps, TextAlign};
pub use tokens::TokenTable;

use crate::expr::ExpressionError;

/// Errors from resolving a style value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    #[error("'{raw}' is neither a color token nor a color literal")]
    UnknownColor { raw: String },
    #[error("'{raw}' is neither a font token nor a font file")]
    UnknownFont { raw: String },
    #[error("unknown or disallowed property")]
    UnknownProperty,
    #[error("invalid value '{raw}': expected {expected}")]
    InvalidValue { raw: String, expected: &'static str },
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}
