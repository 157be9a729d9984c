use crate::{Token, TokenKind};

/// An opaque rewind point, as described in spec §6.2 ("checkpoint/rewind-to-checkpoint").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// A lazy-feeling (but, here, eagerly-tokenized) sequence of tokens with
/// peek/take/rewind semantics.
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().expect("empty stream"))
    }

    /// Look `n` tokens ahead without consuming anything.
    pub fn peek_at(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .unwrap_or_else(|| self.tokens.last().expect("empty stream"))
    }

    /// Consume and return the next token.
    pub fn get(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    /// Consume the next token if it is one of `kinds`. If `skip_newlines` is
    /// set, newline tokens before the target are silently skipped (and not
    /// returned); this is how the parser tolerates free placement of
    /// newlines inside an otherwise single-line construct.
    pub fn get_token_of_type(&mut self, kinds: &[TokenKind], skip_newlines: bool) -> Option<Token> {
        let checkpoint = self.checkpoint();
        loop {
            let tok = self.peek().clone();
            if skip_newlines && tok.kind == TokenKind::Newline {
                self.get();
                continue;
            }
            if kinds.contains(&tok.kind) {
                self.get();
                return Some(tok);
            }
            self.rewind_to(checkpoint);
            return None;
        }
    }

    /// Push the last consumed token back onto the stream.
    pub fn rewind_one_token(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn rewind_to(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    pub fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Skip over any run of newline tokens, returning how many were skipped.
    /// Used by the parser's blank-line run-length encoding (spec §4.1).
    pub fn skip_blank_run(&mut self) -> u32 {
        let mut count = 0u32;
        let mut consecutive_newlines = 0u32;
        loop {
            match self.peek().kind {
                TokenKind::Newline => {
                    self.get();
                    consecutive_newlines += 1;
                    if consecutive_newlines >= 2 {
                        count += 1;
                    }
                }
                _ => break,
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    #[test]
    fn peek_does_not_consume() {
        let mut s = tokenize("int x;");
        assert_eq!(s.peek().text, "int");
        assert_eq!(s.peek().text, "int");
        let t = s.get();
        assert_eq!(t.text, "int");
        assert_eq!(s.peek().text, "x");
    }

    #[test]
    fn checkpoint_rewind_round_trips() {
        let mut s = tokenize("struct Foo { int x; };");
        let cp = s.checkpoint();
        let _ = s.get();
        let _ = s.get();
        assert_ne!(s.peek().text, "struct");
        s.rewind_to(cp);
        assert_eq!(s.peek().text, "struct");
    }

    #[test]
    fn get_token_of_type_skips_newlines() {
        let mut s = tokenize("int\n\nx;");
        let got = s.get_token_of_type(&[TokenKind::Thing], true);
        assert_eq!(got.map(|t| t.text), Some("x".to_string()));
    }
}
