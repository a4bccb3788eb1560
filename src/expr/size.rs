//! Size specs: the values found under `row_sizes`, `outer_margins`, `width`, ...
//!
//! A spec is either a fixed pixel count, an expression over the container
//! size, or unspecified (`?`, `auto`, `null`), meaning "share what is left".

use std::fmt;

use serde_yaml::Value;

use crate::expr::parser::{Expression, ExpressionError};
use crate::geometry::{Size, Spacing};

/// A single size value.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeSpec {
    /// Fixed pixel count.
    Pixels(i32),
    /// Expression over the container's `w` and `h`.
    Expr(Expression),
    /// Unspecified: takes an equal share of the remaining space.
    Auto,
}

impl SizeSpec {
    /// Parse a textual spec.
    pub fn parse(raw: &str) -> Result<Self, ExpressionError> {
        let trimmed = raw.trim();
        if trimmed == "?" || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(SizeSpec::Auto);
        }
        if let Ok(px) = trimmed.parse::<i32>() {
            return Ok(SizeSpec::Pixels(px));
        }
        Expression::parse(trimmed).map(SizeSpec::Expr)
    }

    /// Parse a spec from a YAML scalar.
    pub fn from_value(value: &Value) -> Result<Self, ExpressionError> {
        match value {
            Value::Null => Ok(SizeSpec::Auto),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i)
                        .map(SizeSpec::Pixels)
                        .map_err(|_| ExpressionError::InvalidValue { raw: n.to_string() })
                } else if let Some(f) = n.as_f64() {
                    Ok(SizeSpec::Expr(Expression::constant(f)))
                } else {
                    Err(ExpressionError::InvalidValue { raw: n.to_string() })
                }
            }
            Value::String(s) => SizeSpec::parse(s),
            other => Err(ExpressionError::InvalidValue {
                raw: raw_value(other),
            }),
        }
    }

    /// Whether this spec is [`SizeSpec::Auto`].
    pub fn is_auto(&self) -> bool {
        matches!(self, SizeSpec::Auto)
    }

    /// Exact value against `container`, or `None` for auto.
    pub fn eval(&self, container: Size) -> Result<Option<f64>, ExpressionError> {
        match self {
            SizeSpec::Pixels(px) => Ok(Some(*px as f64)),
            SizeSpec::Expr(e) => e.eval(container).map(Some),
            SizeSpec::Auto => Ok(None),
        }
    }

    /// Whole pixels against `container`, or `None` for auto.
    pub fn pixels(&self, container: Size) -> Result<Option<i32>, ExpressionError> {
        match self {
            SizeSpec::Pixels(px) => Ok(Some(*px)),
            SizeSpec::Expr(e) => e.pixels(container).map(Some),
            SizeSpec::Auto => Ok(None),
        }
    }

    /// Whole pixels against `container`, treating auto as zero.
    pub fn pixels_or_zero(&self, container: Size) -> Result<i32, ExpressionError> {
        Ok(self.pixels(container)?.unwrap_or(0))
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeSpec::Pixels(px) => write!(f, "{px}"),
            SizeSpec::Expr(e) => write!(f, "{e}"),
            SizeSpec::Auto => write!(f, "?"),
        }
    }
}

/// Render a YAML value compactly for error messages.
pub(crate) fn raw_value(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().replace('\n', " "))
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Four-sided size specs (top, right, bottom, left), like CSS margins.
#[derive(Debug, Clone, PartialEq)]
pub struct Edges {
    pub top: SizeSpec,
    pub right: SizeSpec,
    pub bottom: SizeSpec,
    pub left: SizeSpec,
}

impl Edges {
    /// The same spec on all four sides.
    pub fn all(v: SizeSpec) -> Self {
        Self {
            top: v.clone(),
            right: v.clone(),
            bottom: v.clone(),
            left: v,
        }
    }

    /// Zero on all sides.
    pub fn zero() -> Self {
        Self::all(SizeSpec::Pixels(0))
    }

    /// Parse a scalar or a 1-4 item list (CSS shorthand order).
    ///
    /// - 1 value: all sides
    /// - 2 values: vertical, horizontal
    /// - 3 values: top, horizontal, bottom
    /// - 4 values: top, right, bottom, left
    pub fn from_value(value: &Value) -> Result<Self, ExpressionError> {
        let Value::Sequence(items) = value else {
            return Ok(Self::all(SizeSpec::from_value(value)?));
        };
        let specs = items
            .iter()
            .map(SizeSpec::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        match specs.as_slice() {
            [a] => Ok(Self::all(a.clone())),
            [v, h] => Ok(Self {
                top: v.clone(),
                right: h.clone(),
                bottom: v.clone(),
                left: h.clone(),
            }),
            [t, h, b] => Ok(Self {
                top: t.clone(),
                right: h.clone(),
                bottom: b.clone(),
                left: h.clone(),
            }),
            [t, r, b, l] => Ok(Self {
                top: t.clone(),
                right: r.clone(),
                bottom: b.clone(),
                left: l.clone(),
            }),
            _ => Err(ExpressionError::InvalidValue {
                raw: raw_value(value),
            }),
        }
    }

    /// Resolve to pixel spacing against the container. Auto edges are zero.
    pub fn resolve(&self, container: Size) -> Result<Spacing, ExpressionError> {
        Ok(Spacing {
            top: self.top.pixels_or_zero(container)?,
            right: self.right.pixels_or_zero(container)?,
            bottom: self.bottom.pixels_or_zero(container)?,
            left: self.left.pixels_or_zero(container)?,
        })
    }
}

impl Default for Edges {
    fn default() -> Self {
        Self::zero()
    }
}

// ---------------------------------------------------------------------------
// Gutter
// ---------------------------------------------------------------------------

/// Inner margins between adjacent cells: one value, or `[rows, columns]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gutter {
    /// Space between adjacent rows.
    pub row: SizeSpec,
    /// Space between adjacent columns.
    pub column: SizeSpec,
}

impl Gutter {
    /// No gutter.
    pub fn zero() -> Self {
        Self {
            row: SizeSpec::Pixels(0),
            column: SizeSpec::Pixels(0),
        }
    }

    /// Parse a scalar or a `[row, column]` pair.
    pub fn from_value(value: &Value) -> Result<Self, ExpressionError> {
        match value {
            Value::Sequence(items) => match items.as_slice() {
                [both] => {
                    let spec = SizeSpec::from_value(both)?;
                    Ok(Self { row: spec.clone(), column: spec })
                }
                [row, column] => Ok(Self {
                    row: SizeSpec::from_value(row)?,
                    column: SizeSpec::from_value(column)?,
                }),
                _ => Err(ExpressionError::InvalidValue {
                    raw: raw_value(value),
                }),
            },
            scalar => {
                let spec = SizeSpec::from_value(scalar)?;
                Ok(Self { row: spec.clone(), column: spec })
            }
        }
    }
}

impl Default for Gutter {
    fn default() -> Self {
        Self::zero()
    }
}
