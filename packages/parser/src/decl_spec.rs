use hast::NodeId;
use tokens::{Token, TokenKind};

use crate::parser::Parser;

/// The result of scanning decl-specifiers up to (and including) the
/// declarator name: a run of type tokens, the name itself if one was found,
/// and the handful of modifiers that change how the declaration is built
/// rather than what its type is.
pub(crate) struct DeclSpec {
    pub type_tokens: Vec<Token>,
    pub name: Option<String>,
    pub is_static: bool,
    /// A leading `~` before any type tokens: a destructor.
    pub leading_tilde: bool,
}

impl Parser {
    /// Scan decl-specifiers and the declarator name, stopping as soon as a
    /// plain identifier is followed by a token that can only start what
    /// comes *after* a name (`(`, `;`, `,`, `[`, `=`, `:`). Returns with
    /// `name: None` if it instead runs into a `( *` shape - the caller
    /// special-cases that as a function-pointer-typed declarator.
    pub(crate) fn collect_decl_spec_and_name(&mut self) -> DeclSpec {
        let mut type_tokens = Vec::new();
        let mut is_static = false;
        let mut leading_tilde = false;
        let mut angle_depth = 0i32;
        loop {
            if angle_depth == 0
                && self.stream.peek().kind == TokenKind::LParen
                && self.stream.peek_at(1).kind == TokenKind::Asterisk
            {
                return DeclSpec { type_tokens, name: None, is_static, leading_tilde };
            }
            let t = self.stream.peek().clone();
            match t.kind {
                TokenKind::Static => {
                    is_static = true;
                    self.stream.get();
                }
                TokenKind::Extern | TokenKind::Virtual | TokenKind::Constexpr => {
                    self.stream.get();
                }
                TokenKind::Tilde if type_tokens.is_empty() => {
                    leading_tilde = true;
                    self.stream.get();
                }
                TokenKind::LTriangle => {
                    angle_depth += 1;
                    type_tokens.push(t);
                    self.stream.get();
                }
                TokenKind::RTriangle if angle_depth > 0 => {
                    angle_depth -= 1;
                    type_tokens.push(t);
                    self.stream.get();
                }
                TokenKind::Thing => {
                    if angle_depth == 0 {
                        let next = self.stream.peek_at(1).kind;
                        if matches!(
                            next,
                            TokenKind::LParen
                                | TokenKind::Semicolon
                                | TokenKind::Comma
                                | TokenKind::LSquare
                                | TokenKind::Equal
                                | TokenKind::Colon
                        ) {
                            self.stream.get();
                            return DeclSpec {
                                type_tokens,
                                name: Some(t.text),
                                is_static,
                                leading_tilde,
                            };
                        }
                    }
                    type_tokens.push(t);
                    self.stream.get();
                }
                TokenKind::Const
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Asterisk
                | TokenKind::Ampersand
                | TokenKind::Caret
                | TokenKind::DoubleColon
                | TokenKind::Struct
                | TokenKind::Class
                | TokenKind::Enum
                | TokenKind::NumericLiteral
                | TokenKind::Comma => {
                    type_tokens.push(t);
                    self.stream.get();
                }
                _ => {
                    return DeclSpec { type_tokens, name: None, is_static, leading_tilde };
                }
            }
        }
    }

    pub(crate) fn make_type_node(&mut self, tokens: Vec<Token>) -> NodeId {
        let id = self.arena.alloc(hast::NodeKind::Type {
            tokens: tokens.clone(),
            was_reference: false,
            non_nullable: false,
        });
        self.arena.get_mut(id).raw_tokens = tokens;
        id
    }

    /// Consume a balanced `{ ... }` block (a function body we don't need to
    /// parse the contents of).
    pub(crate) fn skip_balanced_braces(&mut self) {
        let mut depth = 0i32;
        loop {
            match self.stream.peek().kind {
                TokenKind::Eof => break,
                TokenKind::LBrace => {
                    depth += 1;
                    self.stream.get();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    self.stream.get();
                    if depth <= 0 {
                        break;
                    }
                }
                _ => {
                    self.stream.get();
                }
            }
        }
    }

    /// Like [`Self::skip_balanced_braces`], but collects the verbatim text
    /// of the block (including the outer braces) instead of discarding it.
    pub(crate) fn capture_balanced_braces(&mut self) -> String {
        let mut depth = 0i32;
        let mut text = String::new();
        loop {
            match self.stream.peek().kind {
                TokenKind::Eof => break,
                TokenKind::LBrace => {
                    depth += 1;
                    text.push_str(&self.stream.get().text);
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    text.push_str(&self.stream.get().text);
                    if depth <= 0 {
                        break;
                    }
                }
                TokenKind::Newline => {
                    self.stream.get();
                    text.push('\n');
                }
                _ => {
                    let t = self.stream.get();
                    if !text.is_empty() && !text.ends_with(['\n', '{']) {
                        text.push(' ');
                    }
                    text.push_str(&t.text);
                }
            }
        }
        text
    }
}

/// If the last token is a bare identifier preceded by something type-like
/// (another identifier, a pointer marker, a closing bracket), pop it off as
/// the declarator's name. A lone identifier with nothing before it is just
/// the type (`int` with no name), not a name with an implicit type.
pub(crate) fn extract_trailing_identifier(tokens: &mut Vec<Token>) -> Option<String> {
    if tokens.len() < 2 {
        return None;
    }
    if tokens.last()?.kind != TokenKind::Thing {
        return None;
    }
    let prev_kind = tokens[tokens.len() - 2].kind;
    if matches!(
        prev_kind,
        TokenKind::Thing
            | TokenKind::Asterisk
            | TokenKind::Ampersand
            | TokenKind::Caret
            | TokenKind::RSquare
            | TokenKind::RParen
            | TokenKind::RTriangle
            | TokenKind::Const
    ) {
        let t = tokens.pop().unwrap();
        Some(t.text)
    } else {
        None
    }
}
