use hast::{Accessibility, NodeId};
use tokens::TokenKind;

use crate::parser::Parser;

impl Parser {
    /// The single production the declaration loop calls into: consume any
    /// leading access-specifiers, then dispatch on the next significant
    /// token. Returns `None` when nothing recognisable starts here, which
    /// sends the caller into error recovery (spec §7).
    pub(crate) fn parse_declaration(&mut self) -> Option<NodeId> {
        loop {
            match self.stream.peek().kind {
                TokenKind::Semicolon => {
                    self.stream.get();
                    continue;
                }
                TokenKind::Public => {
                    self.stream.get();
                    if self.stream.peek().kind == TokenKind::Colon {
                        self.stream.get();
                    }
                    self.current_accessibility = Accessibility::Public;
                    continue;
                }
                TokenKind::Private => {
                    self.stream.get();
                    if self.stream.peek().kind == TokenKind::Colon {
                        self.stream.get();
                    }
                    self.current_accessibility = Accessibility::Private;
                    continue;
                }
                TokenKind::Protected => {
                    self.stream.get();
                    if self.stream.peek().kind == TokenKind::Colon {
                        self.stream.get();
                    }
                    self.current_accessibility = Accessibility::Protected;
                    continue;
                }
                _ => break,
            }
        }

        match self.stream.peek().kind {
            TokenKind::Eof | TokenKind::RBrace => None,
            TokenKind::PpDefine => Some(self.parse_define()),
            TokenKind::PpUndef => Some(self.parse_undef()),
            TokenKind::PpIf | TokenKind::PpIfdef | TokenKind::PpIfndef => Some(self.parse_conditional()),
            TokenKind::PpInclude => Some(self.parse_include()),
            TokenKind::PpError => Some(self.parse_error_directive()),
            TokenKind::PpPragma => Some(self.parse_pragma()),
            TokenKind::Struct | TokenKind::Class | TokenKind::Union => Some(self.parse_class_struct_union()),
            TokenKind::Enum => Some(self.parse_enum()),
            TokenKind::Typedef => Some(self.parse_typedef()),
            TokenKind::Namespace => Some(self.parse_namespace()),
            TokenKind::Template => Some(self.parse_template()),
            TokenKind::Extern => self.try_parse_extern_c(),
            _ => self.parse_field_or_function(),
        }
    }
}
