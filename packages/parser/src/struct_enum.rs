use hast::{Accessibility, NodeId, NodeKind, StructKind};
use tokens::TokenKind;

use crate::parser::Parser;
use crate::scope::Scope;

impl Parser {
    pub(crate) fn parse_class_struct_union(&mut self) -> NodeId {
        let kind = match self.stream.get().kind {
            TokenKind::Struct => StructKind::Struct,
            TokenKind::Class => StructKind::Class,
            _ => StructKind::Union,
        };
        let name = if self.stream.peek().kind == TokenKind::Thing {
            Some(self.stream.get().text)
        } else {
            None
        };

        let mut base = None;
        if self.stream.peek().kind == TokenKind::Colon {
            self.stream.get();
            if matches!(
                self.stream.peek().kind,
                TokenKind::Public | TokenKind::Private | TokenKind::Protected
            ) {
                self.stream.get();
            }
            if self.stream.peek().kind == TokenKind::Thing {
                base = Some(self.stream.get().text);
            }
        }

        if self.stream.peek().kind != TokenKind::LBrace {
            if self.stream.peek().kind == TokenKind::Semicolon {
                self.stream.get();
            }
            return self.arena.alloc(NodeKind::ClassStructUnion {
                name,
                kind,
                is_forward_declaration: true,
                has_forward_declaration: false,
                by_value: false,
                keep_unmodified_name: false,
                base,
            });
        }
        self.stream.get(); // '{'
        let node = self.arena.alloc(NodeKind::ClassStructUnion {
            name: name.clone(),
            kind,
            is_forward_declaration: false,
            has_forward_declaration: false,
            by_value: false,
            keep_unmodified_name: false,
            base,
        });
        self.push_scope(Scope::ClassBody { class_name: name });
        let saved_accessibility = self.current_accessibility;
        self.current_accessibility =
            if kind == StructKind::Class { Accessibility::Private } else { Accessibility::Public };
        self.parse_scope_body(node, Some(TokenKind::RBrace));
        self.current_accessibility = saved_accessibility;
        self.pop_scope();
        if self.stream.peek().kind == TokenKind::Semicolon {
            self.stream.get();
        }
        node
    }

    pub(crate) fn parse_enum(&mut self) -> NodeId {
        self.stream.get(); // 'enum'
        if self.stream.peek().kind == TokenKind::Class {
            self.stream.get();
        }
        let name = if self.stream.peek().kind == TokenKind::Thing {
            Some(self.stream.get().text)
        } else {
            None
        };
        if self.stream.peek().kind == TokenKind::Colon {
            self.stream.get();
            while !matches!(self.stream.peek().kind, TokenKind::LBrace | TokenKind::Eof) {
                self.stream.get();
            }
        }
        if self.stream.peek().kind != TokenKind::LBrace {
            if self.stream.peek().kind == TokenKind::Semicolon {
                self.stream.get();
            }
            return self.arena.alloc(NodeKind::Enum { name, is_flags_enum: false });
        }
        self.stream.get(); // '{'
        let is_flags_enum = name.as_deref().map(|n| n.contains("Flags")).unwrap_or(false);
        let node = self.arena.alloc(NodeKind::Enum { name, is_flags_enum });
        loop {
            self.stream.skip_blank_run();
            while self.consume_comment_into(node) {}
            if self.stream.peek().kind == TokenKind::RBrace {
                self.stream.get();
                break;
            }
            if self.stream.at_eof() {
                break;
            }
            let elem_name = if self.stream.peek().kind == TokenKind::Thing {
                self.stream.get().text
            } else {
                self.stream.get();
                continue;
            };
            let mut value_expr = Vec::new();
            if self.stream.peek().kind == TokenKind::Equal {
                self.stream.get();
                let mut depth = 0i32;
                loop {
                    let t = self.stream.peek().clone();
                    match t.kind {
                        TokenKind::Comma | TokenKind::RBrace if depth == 0 => break,
                        TokenKind::Eof => break,
                        TokenKind::LParen => {
                            depth += 1;
                            value_expr.push(t);
                            self.stream.get();
                        }
                        TokenKind::RParen => {
                            depth -= 1;
                            value_expr.push(t);
                            self.stream.get();
                        }
                        _ => {
                            value_expr.push(t);
                            self.stream.get();
                        }
                    }
                }
            }
            let is_count = elem_name.ends_with("_COUNT") || elem_name.ends_with("Count");
            let is_internal = elem_name.contains("_Internal") || elem_name.contains("INTERNAL");
            let elem = self.arena.alloc(NodeKind::EnumElement {
                name: elem_name,
                value_expr,
                computed_value: None,
                is_count,
                is_internal,
            });
            self.arena.append_child(node, elem);
            if self.stream.peek().kind == TokenKind::Comma {
                self.stream.get();
            }
        }
        if self.stream.peek().kind == TokenKind::Semicolon {
            self.stream.get();
        }
        node
    }

    fn consume_comment_into(&mut self, parent: NodeId) -> bool {
        match self.stream.peek().kind {
            TokenKind::LineComment => {
                let t = self.stream.get();
                let c = self.arena.alloc(NodeKind::LineComment { text: t.text });
                self.arena.append_child(parent, c);
                true
            }
            TokenKind::BlockComment => {
                let t = self.stream.get();
                let c = self.arena.alloc(NodeKind::BlockComment { text: t.text });
                self.arena.append_child(parent, c);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn parse_typedef(&mut self) -> NodeId {
        self.stream.get(); // 'typedef'
        let target = if matches!(self.stream.peek().kind, TokenKind::Struct | TokenKind::Class | TokenKind::Union)
        {
            self.parse_class_struct_union()
        } else if self.stream.peek().kind == TokenKind::Enum {
            self.parse_enum()
        } else {
            let mut tokens = Vec::new();
            while !matches!(self.stream.peek().kind, TokenKind::Semicolon | TokenKind::Eof) {
                if self.stream.peek().kind == TokenKind::Thing
                    && self.stream.peek_at(1).kind == TokenKind::Semicolon
                {
                    break;
                }
                tokens.push(self.stream.get());
            }
            self.make_type_node(tokens)
        };
        let name = if self.stream.peek().kind == TokenKind::Thing {
            self.stream.get().text
        } else {
            String::new()
        };
        if self.stream.peek().kind == TokenKind::Semicolon {
            self.stream.get();
        }
        self.arena.alloc(NodeKind::Typedef { name, target })
    }

    pub(crate) fn parse_namespace(&mut self) -> NodeId {
        self.stream.get(); // 'namespace'
        let name = if self.stream.peek().kind == TokenKind::Thing {
            self.stream.get().text
        } else {
            String::new()
        };
        let node = self.arena.alloc(NodeKind::Namespace { name });
        if self.stream.peek().kind == TokenKind::LBrace {
            self.stream.get();
            self.push_scope(Scope::NamespaceBody);
            self.parse_scope_body(node, Some(TokenKind::RBrace));
            self.pop_scope();
        }
        node
    }

    pub(crate) fn parse_template(&mut self) -> NodeId {
        self.stream.get(); // 'template'
        let mut params = Vec::new();
        if self.stream.peek().kind == TokenKind::LTriangle {
            self.stream.get();
            loop {
                match self.stream.peek().kind {
                    TokenKind::RTriangle => {
                        self.stream.get();
                        break;
                    }
                    TokenKind::Eof => break,
                    TokenKind::Thing => {
                        let t = self.stream.get();
                        if t.text != "typename" {
                            params.push(t.text);
                        }
                    }
                    _ => {
                        self.stream.get();
                    }
                }
            }
        }
        let node = self.arena.alloc(NodeKind::Template { params });
        if let Some(inner) = self.parse_declaration() {
            self.arena.append_child(node, inner);
        }
        node
    }

    pub(crate) fn try_parse_extern_c(&mut self) -> Option<NodeId> {
        if self.stream.peek_at(1).kind == TokenKind::StringLiteral
            && self.stream.peek_at(1).text.trim_matches('"') == "C"
        {
            self.stream.get(); // 'extern'
            self.stream.get(); // "C"
            let node = self.arena.alloc(NodeKind::ExternC { has_cplusplus_guard: false });
            if self.stream.peek().kind == TokenKind::LBrace {
                self.stream.get();
                self.push_scope(Scope::ExternCBody);
                self.parse_scope_body(node, Some(TokenKind::RBrace));
                self.pop_scope();
            } else if let Some(inner) = self.parse_declaration() {
                self.arena.append_child(node, inner);
            }
            Some(node)
        } else {
            self.parse_field_or_function()
        }
    }
}
