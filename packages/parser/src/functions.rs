use hast::{FieldName, FunctionRole, NodeId, NodeKind};
use tokens::{Token, TokenKind};

use crate::decl_spec::extract_trailing_identifier;
use crate::parser::Parser;
use crate::scope::Scope;

impl Parser {
    /// The fallback production for anything that isn't a keyword-introduced
    /// declaration: a field, a free or member function, or a function
    /// pointer typed field (spec §4.1's "generic declarator" path).
    pub(crate) fn parse_field_or_function(&mut self) -> Option<NodeId> {
        let spec = self.collect_decl_spec_and_name();
        if spec.name.is_none() {
            if self.stream.peek().kind == TokenKind::LParen
                && self.stream.peek_at(1).kind == TokenKind::Asterisk
            {
                return Some(self.parse_function_pointer_field(spec.type_tokens));
            }
            return None;
        }
        let name = spec.name.unwrap();
        if self.stream.peek().kind == TokenKind::LParen {
            Some(self.parse_function_declaration(
                spec.type_tokens,
                name,
                spec.is_static,
                spec.leading_tilde,
            ))
        } else {
            Some(self.parse_field_declaration(spec.type_tokens, name, spec.is_static))
        }
    }

    fn parse_function_declaration(
        &mut self,
        return_tokens: Vec<Token>,
        name: String,
        is_static: bool,
        is_destructor: bool,
    ) -> NodeId {
        self.stream.get(); // consume '('
        let (arguments, is_variadic) = self.parse_argument_list();

        let mut is_const_method = false;
        if self.stream.peek().kind == TokenKind::Const {
            self.stream.get();
            is_const_method = true;
        }
        // `= 0` (pure virtual), `= default`, `= delete`.
        if self.stream.peek().kind == TokenKind::Equal {
            self.stream.get();
            self.stream.get();
        }
        let format_arg_index = self.try_parse_fmt_annotation();

        let (has_body, body_text) = if self.stream.peek().kind == TokenKind::LBrace {
            let text = self.capture_balanced_braces();
            (true, Some(text))
        } else {
            if self.stream.peek().kind == TokenKind::Semicolon {
                self.stream.get();
            }
            (false, None)
        };

        let class_name = match self.scope() {
            Scope::ClassBody { class_name } => class_name.clone(),
            _ => None,
        };
        let in_class = class_name.is_some();
        let role = if is_destructor {
            FunctionRole::Destructor
        } else if in_class && return_tokens.is_empty() && class_name.as_deref() == Some(name.as_str())
        {
            FunctionRole::Constructor
        } else if in_class {
            FunctionRole::Method
        } else {
            FunctionRole::Free
        };

        let return_type = self.make_type_node(return_tokens);
        let node = self.arena.alloc(NodeKind::FunctionDeclaration {
            name,
            return_type,
            arguments,
            role,
            is_static,
            is_const_method,
            has_body,
            original_class: None,
            export_macro: None,
            format_arg_index,
            is_variadic,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        });
        // Verbatim body text, in case a later pass wants to keep an inline
        // function's body for direct API emission (spec §4.2, "remove
        // function bodies (but keep inline functions...)"). Stashed as a
        // single raw token rather than re-tokenized; nothing downstream
        // needs to parse it structurally.
        if let Some(text) = body_text {
            self.arena.get_mut(node).raw_tokens =
                vec![Token::new(TokenKind::Thing, text, 0, 0)];
        }
        node
    }

    /// Recognises a trailing `IM_FMTARGS(n)`/`IM_FMTLIST(n)` annotation
    /// between the argument list and the terminating `;`/`{` (spec §4.2
    /// "Unformatted-function generation" depends on knowing which argument
    /// index holds the format string). Returns the 1-based index the
    /// annotation names, converted to 0-based.
    fn try_parse_fmt_annotation(&mut self) -> Option<usize> {
        let peek = self.stream.peek();
        if peek.kind != TokenKind::Thing || (peek.text != "IM_FMTARGS" && peek.text != "IM_FMTLIST") {
            return None;
        }
        self.stream.get();
        if self.stream.peek().kind != TokenKind::LParen {
            return None;
        }
        self.stream.get();
        let idx = if self.stream.peek().kind == TokenKind::NumericLiteral {
            self.stream.get().text.parse::<usize>().ok().map(|n| n.saturating_sub(1))
        } else {
            None
        };
        if self.stream.peek().kind == TokenKind::RParen {
            self.stream.get();
        }
        idx
    }

    /// Parse a comma-separated argument list up to and including the
    /// closing `)`. The bare `(void)` spelling is treated as zero
    /// arguments, as in C.
    pub(crate) fn parse_argument_list(&mut self) -> (Vec<NodeId>, bool) {
        let mut args = Vec::new();
        let mut variadic = false;
        if self.stream.peek().kind == TokenKind::RParen {
            self.stream.get();
            return (args, variadic);
        }
        if self.stream.peek().kind == TokenKind::Thing
            && self.stream.peek().text == "void"
            && self.stream.peek_at(1).kind == TokenKind::RParen
        {
            self.stream.get();
            self.stream.get();
            return (args, variadic);
        }
        loop {
            if self.stream.peek().kind == TokenKind::Ellipses {
                self.stream.get();
                variadic = true;
                break;
            }
            let arg = self.parse_one_argument();
            args.push(arg);
            match self.stream.peek().kind {
                TokenKind::Comma => {
                    self.stream.get();
                    continue;
                }
                _ => break,
            }
        }
        if self.stream.peek().kind == TokenKind::RParen {
            self.stream.get();
        }
        (args, variadic)
    }

    fn parse_one_argument(&mut self) -> NodeId {
        let mut tokens = Vec::new();
        let mut depth = 0i32;
        loop {
            let t = self.stream.peek().clone();
            match t.kind {
                TokenKind::Comma | TokenKind::RParen if depth == 0 => break,
                TokenKind::Equal if depth == 0 => break,
                TokenKind::Eof => break,
                TokenKind::LParen | TokenKind::LSquare => {
                    depth += 1;
                    tokens.push(t);
                    self.stream.get();
                }
                TokenKind::RParen | TokenKind::RSquare => {
                    depth -= 1;
                    tokens.push(t);
                    self.stream.get();
                }
                _ => {
                    tokens.push(t);
                    self.stream.get();
                }
            }
        }
        let name = extract_trailing_identifier(&mut tokens);
        let default_value = if self.stream.peek().kind == TokenKind::Equal {
            self.stream.get();
            Some(self.collect_default_value_tokens())
        } else {
            None
        };
        let ty = self.make_type_node(tokens);
        self.arena.alloc(NodeKind::FunctionArgument {
            name,
            ty,
            default_value,
            is_implicit_default: false,
            stub_call_value: None,
        })
    }

    fn collect_default_value_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut depth = 0i32;
        loop {
            let t = self.stream.peek().clone();
            match t.kind {
                TokenKind::Comma | TokenKind::RParen if depth == 0 => break,
                TokenKind::Eof => break,
                TokenKind::LParen => {
                    depth += 1;
                    tokens.push(t);
                    self.stream.get();
                }
                TokenKind::RParen => {
                    depth -= 1;
                    tokens.push(t);
                    self.stream.get();
                }
                _ => {
                    tokens.push(t);
                    self.stream.get();
                }
            }
        }
        tokens
    }

    fn parse_field_declaration(&mut self, type_tokens: Vec<Token>, first_name: String, is_static: bool) -> NodeId {
        let mut names = Vec::new();
        let mut current_name = first_name;
        loop {
            let array_bound = self.try_parse_array_bound();
            let bitfield_width = self.try_parse_bitfield_width();
            names.push(FieldName { name: current_name, array_bound, bitfield_width });
            match self.stream.peek().kind {
                TokenKind::Comma => {
                    self.stream.get();
                    while matches!(
                        self.stream.peek().kind,
                        TokenKind::Asterisk | TokenKind::Ampersand | TokenKind::Caret
                    ) {
                        self.stream.get();
                    }
                    if self.stream.peek().kind == TokenKind::Thing {
                        current_name = self.stream.get().text;
                        continue;
                    }
                    break;
                }
                _ => break,
            }
        }
        if self.stream.peek().kind == TokenKind::Semicolon {
            self.stream.get();
        }
        let ty = self.make_type_node(type_tokens);
        self.arena.alloc(NodeKind::FieldDeclaration {
            names,
            ty,
            accessibility: self.current_accessibility,
            is_static,
        })
    }

    fn try_parse_array_bound(&mut self) -> Option<u64> {
        if self.stream.peek().kind != TokenKind::LSquare {
            return None;
        }
        self.stream.get();
        let bound = if self.stream.peek().kind == TokenKind::NumericLiteral {
            let t = self.stream.get();
            t.text.parse().ok()
        } else {
            None
        };
        if self.stream.peek().kind == TokenKind::RSquare {
            self.stream.get();
        }
        Some(bound.unwrap_or(0))
    }

    fn try_parse_bitfield_width(&mut self) -> Option<u32> {
        if self.stream.peek().kind != TokenKind::Colon {
            return None;
        }
        self.stream.get();
        if self.stream.peek().kind == TokenKind::NumericLiteral {
            let t = self.stream.get();
            return t.text.parse().ok();
        }
        None
    }

    /// `RetType (*name)(args);` - a field (or free declaration) whose type
    /// is a function pointer, parsed as a structured `FunctionPointerType`
    /// rather than raw tokens.
    pub(crate) fn parse_function_pointer_field(&mut self, return_tokens: Vec<Token>) -> NodeId {
        self.stream.get(); // '('
        self.stream.get(); // '*'
        let name = if self.stream.peek().kind == TokenKind::Thing {
            Some(self.stream.get().text)
        } else {
            None
        };
        if self.stream.peek().kind == TokenKind::RParen {
            self.stream.get();
        }
        let (arguments, _variadic) = if self.stream.peek().kind == TokenKind::LParen {
            self.stream.get();
            self.parse_argument_list()
        } else {
            (Vec::new(), false)
        };
        if self.stream.peek().kind == TokenKind::Semicolon {
            self.stream.get();
        }
        let return_type = self.make_type_node(return_tokens);
        let fp = self.arena.alloc(NodeKind::FunctionPointerType { name: name.clone(), return_type, arguments });
        let field_name = FieldName { name: name.unwrap_or_default(), array_bound: None, bitfield_width: None };
        self.arena.alloc(NodeKind::FieldDeclaration {
            names: vec![field_name],
            ty: fp,
            accessibility: self.current_accessibility,
            is_static: false,
        })
    }
}
