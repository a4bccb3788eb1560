//! Size expressions: tokenizer, parser, evaluator, size specs.
//!
//! Expressions are small arithmetic formulas over the container's width and
//! height, e.g. `w*0.4`, `(h - 20) / 2`. They are parsed once at load and
//! evaluated on every layout pass against the container they size.

pub mod tokenizer;
pub mod parser;
pub mod size;

pub use parser::{Expression, ExpressionError};
pub use size::{Edges, Gutter, SizeSpec};
