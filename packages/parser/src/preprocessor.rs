use hast::{ConditionalKind, NodeId, NodeKind};
use tokens::TokenKind;

use crate::parser::Parser;

impl Parser {
    pub(crate) fn parse_define(&mut self) -> NodeId {
        let t = self.stream.get();
        let rest = t.text;
        let (name_and_params, value) = match rest.find(char::is_whitespace) {
            Some(idx) => (rest[..idx].to_string(), rest[idx..].trim().to_string()),
            None => (rest.clone(), String::new()),
        };
        let (name, params) = if let Some(open) = name_and_params.find('(') {
            let name = name_and_params[..open].to_string();
            let close = name_and_params.find(')').unwrap_or(name_and_params.len());
            let params: Vec<String> = name_and_params[open + 1..close]
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (name, Some(params))
        } else {
            (name_and_params, None)
        };
        self.arena.alloc(NodeKind::Define { name, params, value, exclude_from_metadata: false })
    }

    pub(crate) fn parse_undef(&mut self) -> NodeId {
        let t = self.stream.get();
        self.arena.alloc(NodeKind::Undef { name: t.text.trim().to_string() })
    }

    pub(crate) fn parse_include(&mut self) -> NodeId {
        let t = self.stream.get();
        let text = t.text.trim();
        let is_system = text.starts_with('<');
        let path = text.trim_start_matches(['<', '"']).trim_end_matches(['>', '"']).to_string();
        self.arena.alloc(NodeKind::Include { path, is_system })
    }

    pub(crate) fn parse_error_directive(&mut self) -> NodeId {
        let t = self.stream.get();
        self.arena.alloc(NodeKind::ErrorDirective { text: t.text })
    }

    pub(crate) fn parse_pragma(&mut self) -> NodeId {
        let t = self.stream.get();
        self.arena.alloc(NodeKind::Pragma { text: t.text })
    }

    pub(crate) fn parse_conditional(&mut self) -> NodeId {
        let kind_tok = self.stream.get();
        let kind = match kind_tok.kind {
            TokenKind::PpIf => ConditionalKind::If,
            TokenKind::PpIfdef => ConditionalKind::Ifdef,
            _ => ConditionalKind::Ifndef,
        };
        let node = self.arena.alloc(NodeKind::Conditional {
            kind,
            expression: kind_tok.text,
            else_children: Vec::new(),
            is_elif_converted: false,
        });
        self.parse_conditional_body(node);
        node
    }

    /// Fill `node`'s primary children (the then-branch) until whatever
    /// preprocessor directive closes it. `#endif` closes outright, `#else`
    /// switches to filling the else-branch, and `#elif` is rewritten as a
    /// nested `Conditional` placed as the sole element of the else-branch
    /// (spec §4.1) - which itself recurses through this same body parser.
    fn parse_conditional_body(&mut self, node: NodeId) {
        loop {
            match self.stream.peek().kind {
                TokenKind::PpEndif => {
                    self.stream.get();
                    return;
                }
                TokenKind::PpElse => {
                    self.stream.get();
                    self.parse_conditional_else(node);
                    return;
                }
                TokenKind::PpElif => {
                    let t = self.stream.get();
                    let nested = self.arena.alloc(NodeKind::Conditional {
                        kind: ConditionalKind::If,
                        expression: t.text,
                        else_children: Vec::new(),
                        is_elif_converted: true,
                    });
                    self.parse_conditional_body(nested);
                    self.append_to_else_children(node, nested);
                    return;
                }
                TokenKind::Eof => return,
                _ => {
                    if self.consume_blank_run(node) {
                        continue;
                    }
                    if self.consume_comment() {
                        continue;
                    }
                    match self.parse_declaration() {
                        Some(n) => {
                            self.attach_pending_comments(n);
                            self.arena.append_child(node, n);
                            self.last_element = Some(n);
                            self.consume_same_line_trailing_comment(n);
                        }
                        None => {
                            if self.stream.at_eof() {
                                return;
                            }
                            let n = self.recover_unparsable();
                            self.arena.append_child(node, n);
                            self.last_element = Some(n);
                        }
                    }
                }
            }
        }
    }

    fn parse_conditional_else(&mut self, node: NodeId) {
        loop {
            match self.stream.peek().kind {
                TokenKind::PpEndif => {
                    self.stream.get();
                    return;
                }
                TokenKind::Eof => return,
                _ => {
                    let count = self.stream.skip_blank_run();
                    if count > 0 {
                        let n = self.arena.alloc(NodeKind::BlankLines { count });
                        self.append_to_else_children(node, n);
                        self.last_element = None;
                        continue;
                    }
                    if self.consume_comment() {
                        continue;
                    }
                    match self.parse_declaration() {
                        Some(n) => {
                            self.attach_pending_comments(n);
                            self.append_to_else_children(node, n);
                            self.last_element = Some(n);
                            self.consume_same_line_trailing_comment(n);
                        }
                        None => {
                            if self.stream.at_eof() {
                                return;
                            }
                            let n = self.recover_unparsable();
                            self.append_to_else_children(node, n);
                            self.last_element = Some(n);
                        }
                    }
                }
            }
        }
    }

    fn append_to_else_children(&mut self, cond: NodeId, child: NodeId) {
        self.arena.detach(child);
        if let NodeKind::Conditional { else_children, .. } = &mut self.arena.get_mut(cond).kind {
            else_children.push(child);
        }
        self.arena.get_mut(child).parent = Some(cond);
    }
}
