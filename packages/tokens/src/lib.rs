//! Token stream consumed by the header parser (`hdrbind-parser`).
//!
//! This crate is deliberately thin: the real lexing work (handling comments,
//! raw string literals, line continuations, ...) is a conventional C/C++
//! tokenizer and isn't where this workspace's interesting logic lives. What
//! matters to the parser is the *interface* - peek/take/rewind over a lazy
//! token sequence - so that's what's modeled carefully here.

mod kind;
mod lexer;
mod stream;

pub use kind::TokenKind;
pub use lexer::tokenize;
pub use stream::{Checkpoint, TokenStream};

/// A single lexical token.
///
/// `leading_whitespace` preserves the exact inter-token whitespace so the C
/// writer can optionally round-trip spacing; most passes only care about
/// `kind` and `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub col: u32,
    pub leading_whitespace: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
            leading_whitespace: String::new(),
        }
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Newline
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?}) @ {}:{}", self.text, self.kind, self.line, self.col)
    }
}
