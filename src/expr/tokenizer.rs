//! logos-based tokenizer for size expressions.
//!
//! Unlike a lenient lexer, every byte of an expression must belong to a token:
//! an unrecognized character is reported with its byte position so the load
//! error can point at it.

use std::ops::Range;

use logos::Logos;

/// Expression token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    /// Integer or decimal literal: `40`, `0.4`, `.5`.
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// Identifier. Only `w` and `h` are meaningful; the parser rejects others.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,
}

/// A token together with its source slice and byte span.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub text: String,
    pub span: Range<usize>,
}

/// Tokenize an expression.
///
/// Returns the byte offset of the first character that does not start any
/// token as the error.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, usize> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                text: input[span.clone()].to_string(),
                span,
            }),
            Err(()) => return Err(span.start),
        }
    }
    Ok(tokens)
}
