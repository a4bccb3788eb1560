//! Recursive descent parser and evaluator for size expressions.
//!
//! Grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('-' | '+') unary | atom
//! atom   := NUMBER | 'w' | 'h' | '(' expr ')'
//! ```

use std::fmt;

use crate::expr::tokenizer::{tokenize, Spanned, Token};
use crate::geometry::Size;

/// Errors from parsing or evaluating a size expression.
///
/// Every variant carries the raw expression so load errors can quote it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("empty size expression")]
    Empty,
    #[error("unexpected character at position {position} in '{expression}'")]
    UnexpectedCharacter { expression: String, position: usize },
    #[error("unexpected '{found}' at position {position} in '{expression}'")]
    UnexpectedToken {
        expression: String,
        position: usize,
        found: String,
    },
    #[error("unexpected end of expression '{expression}'")]
    UnexpectedEnd { expression: String },
    #[error("unknown identifier '{name}' in '{expression}' (only w and h are allowed)")]
    UnknownIdentifier { expression: String, name: String },
    #[error("division by zero in '{expression}'")]
    DivisionByZero { expression: String },
    #[error("'{raw}' is not a size: expected a pixel number or an expression")]
    InvalidValue { raw: String },
    #[error("'{expression}' evaluates to {value}, outside the pixel range")]
    OutOfRange { expression: String, value: f64 },
}

/// Container dimension an expression may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Number(f64),
    Var(Axis),
    Neg(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
}

/// A parsed size expression, keeping its source text for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parse an expression. Syntax errors and unknown identifiers are
    /// reported here, at load time.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(ExpressionError::Empty);
        }
        let tokens = tokenize(trimmed).map_err(|position| ExpressionError::UnexpectedCharacter {
            expression: trimmed.to_string(),
            position,
        })?;

        let mut parser = Parser {
            source: trimmed,
            tokens,
            cursor: 0,
        };
        let root = parser.parse_expr()?;
        if let Some(tok) = parser.peek() {
            return Err(parser.unexpected(tok));
        }

        Ok(Self {
            source: trimmed.to_string(),
            root,
        })
    }

    /// A constant expression. Used for numeric values that are not integers.
    pub fn constant(value: f64) -> Self {
        Self {
            source: value.to_string(),
            root: Node::Number(value),
        }
    }

    /// The source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the expression references the container size at all.
    pub fn is_constant(&self) -> bool {
        fn walk(node: &Node) -> bool {
            match node {
                Node::Number(_) => true,
                Node::Var(_) => false,
                Node::Neg(inner) => walk(inner),
                Node::Binary(_, l, r) => walk(l) && walk(r),
            }
        }
        walk(&self.root)
    }

    /// Evaluate against a container of the given size, returning the exact value.
    pub fn eval(&self, container: Size) -> Result<f64, ExpressionError> {
        self.eval_node(&self.root, container)
    }

    /// Evaluate and round to whole pixels (half away from zero).
    pub fn pixels(&self, container: Size) -> Result<i32, ExpressionError> {
        let value = self.eval(container)?.round();
        if !value.is_finite() || value.abs() > f64::from(i32::MAX) {
            return Err(ExpressionError::OutOfRange {
                expression: self.to_string(),
                value,
            });
        }
        Ok(value as i32)
    }

    fn eval_node(&self, node: &Node, container: Size) -> Result<f64, ExpressionError> {
        match node {
            Node::Number(n) => Ok(*n),
            Node::Var(Axis::Width) => Ok(container.width as f64),
            Node::Var(Axis::Height) => Ok(container.height as f64),
            Node::Neg(inner) => Ok(-self.eval_node(inner, container)?),
            Node::Binary(op, lhs, rhs) => {
                let l = self.eval_node(lhs, container)?;
                let r = self.eval_node(rhs, container)?;
                match op {
                    BinaryOp::Add => Ok(l + r),
                    BinaryOp::Sub => Ok(l - r),
                    BinaryOp::Mul => Ok(l * r),
                    BinaryOp::Div => {
                        if r == 0.0 {
                            Err(ExpressionError::DivisionByZero {
                                expression: self.source.clone(),
                            })
                        } else {
                            Ok(l / r)
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Recursive descent parser state.
struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    cursor: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn unexpected(&self, tok: &Spanned) -> ExpressionError {
        ExpressionError::UnexpectedToken {
            expression: self.source.to_string(),
            position: tok.span.start,
            found: tok.text.clone(),
        }
    }

    fn end(&self) -> ExpressionError {
        ExpressionError::UnexpectedEnd {
            expression: self.source.to_string(),
        }
    }

    fn parse_expr(&mut self) -> Result<Node, ExpressionError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek().map(|t| t.token) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.parse_term()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_term(&mut self) -> Result<Node, ExpressionError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().map(|t| t.token) {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.parse_unary()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Node, ExpressionError> {
        match self.peek().map(|t| t.token) {
            Some(Token::Minus) => {
                self.cursor += 1;
                Ok(Node::Neg(Box::new(self.parse_unary()?)))
            }
            Some(Token::Plus) => {
                self.cursor += 1;
                self.parse_unary()
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Node, ExpressionError> {
        let tok = self.advance().ok_or_else(|| self.end())?;
        match tok.token {
            Token::Number(n) => Ok(Node::Number(n)),
            Token::Ident => match tok.text.as_str() {
                "w" => Ok(Node::Var(Axis::Width)),
                "h" => Ok(Node::Var(Axis::Height)),
                other => Err(ExpressionError::UnknownIdentifier {
                    expression: self.source.to_string(),
                    name: other.to_string(),
                }),
            },
            Token::ParenOpen => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(close) if close.token == Token::ParenClose => Ok(inner),
                    Some(other) => Err(self.unexpected(&other)),
                    None => Err(self.end()),
                }
            }
            _ => Err(self.unexpected(&tok)),
        }
    }
}
