use hast::{Accessibility, Arena, NodeId, NodeKind};
use tokens::{tokenize, TokenKind, TokenStream};

use crate::scope::Scope;

/// Recursive-descent parser state (spec §4.1): the token stream, the arena
/// it is building into, the scope stack that selects which productions are
/// legal, and the small amount of bookkeeping comment-association needs.
pub struct Parser {
    pub(crate) arena: Arena,
    pub(crate) stream: TokenStream,
    pub(crate) last_element: Option<NodeId>,
    pub(crate) pending_comments: Vec<NodeId>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) current_accessibility: Accessibility,
}

impl Parser {
    pub fn new(src: &str) -> Self {
        Self {
            arena: Arena::new(),
            stream: tokenize(src),
            last_element: None,
            pending_comments: Vec::new(),
            scopes: vec![Scope::TopLevel],
            current_accessibility: Accessibility::Public,
        }
    }

    pub fn finish(self) -> Arena {
        self.arena
    }

    /// Parses `src` as one more `HeaderFile` appended under an existing
    /// `HeaderFileSet` root, reusing its arena. Used by the driver to fold
    /// prerequisite `--include` headers and a backend header into the same
    /// tree as the main input so cross-header type references resolve
    /// (spec §6.1 `--include`).
    pub fn parse_additional_file(arena: Arena, root: NodeId, src: &str, filename: &str) -> (Arena, NodeId) {
        let mut parser = Self {
            arena,
            stream: tokenize(src),
            last_element: None,
            pending_comments: Vec::new(),
            scopes: vec![Scope::TopLevel],
            current_accessibility: Accessibility::Public,
        };
        let file = parser.arena.alloc(NodeKind::HeaderFile { filename: filename.to_string() });
        parser.arena.append_child(root, file);
        parser.parse_scope_body(file, None);
        (parser.finish(), file)
    }

    pub(crate) fn scope(&self) -> &Scope {
        self.scopes.last().expect("scope stack is never empty")
    }

    pub(crate) fn push_scope(&mut self, s: Scope) {
        self.scopes.push(s);
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Parse the whole input into a `HeaderFileSet > HeaderFile` pair,
    /// returning the set's root id.
    pub fn parse_header_file_set(&mut self, filename: &str) -> NodeId {
        let root = self.arena.alloc(NodeKind::HeaderFileSet);
        let file = self.arena.alloc(NodeKind::HeaderFile { filename: filename.to_string() });
        self.arena.append_child(root, file);
        self.parse_scope_body(file, None);
        root
    }

    /// Parse declarations into `parent` until `terminator` is consumed, or
    /// EOF if no terminator is given.
    pub(crate) fn parse_scope_body(&mut self, parent: NodeId, terminator: Option<TokenKind>) {
        loop {
            if let Some(t) = terminator {
                if self.stream.peek().kind == t {
                    self.stream.get();
                    break;
                }
            }
            if self.stream.at_eof() {
                break;
            }
            if self.consume_blank_run(parent) {
                continue;
            }
            if self.consume_comment() {
                continue;
            }
            match self.parse_declaration() {
                Some(node) => {
                    self.attach_pending_comments(node);
                    self.arena.append_child(parent, node);
                    self.last_element = Some(node);
                    self.consume_same_line_trailing_comment(node);
                }
                None => {
                    if self.stream.at_eof() {
                        break;
                    }
                    let node = self.recover_unparsable();
                    self.arena.append_child(parent, node);
                    self.last_element = Some(node);
                }
            }
        }
        self.flush_pending_comments_into(parent);
    }

    pub(crate) fn consume_blank_run(&mut self, parent: NodeId) -> bool {
        let count = self.stream.skip_blank_run();
        if count > 0 {
            let node = self.arena.alloc(NodeKind::BlankLines { count });
            self.arena.append_child(parent, node);
            self.last_element = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn consume_comment(&mut self) -> bool {
        match self.stream.peek().kind {
            TokenKind::LineComment => {
                let t = self.stream.get();
                let node = self.arena.alloc(NodeKind::LineComment { text: t.text });
                self.pending_comments.push(node);
                true
            }
            TokenKind::BlockComment => {
                let t = self.stream.get();
                let node = self.arena.alloc(NodeKind::BlockComment { text: t.text });
                self.pending_comments.push(node);
                true
            }
            _ => false,
        }
    }

    /// A line-comment immediately following a declaration with no
    /// intervening newline token becomes that declaration's attached
    /// trailing comment (spec §4.1), rather than a preceding comment of
    /// whatever comes next.
    pub(crate) fn consume_same_line_trailing_comment(&mut self, node: NodeId) {
        if self.stream.peek().kind == TokenKind::LineComment {
            let t = self.stream.get();
            let comment = self.arena.alloc(NodeKind::LineComment { text: t.text });
            hast::attach_trailing_comment(&mut self.arena, node, comment);
        }
    }

    pub(crate) fn attach_pending_comments(&mut self, node: NodeId) {
        if !self.pending_comments.is_empty() {
            let comments = std::mem::take(&mut self.pending_comments);
            hast::attach_preceding_comments(&mut self.arena, node, comments);
        }
    }

    fn flush_pending_comments_into(&mut self, parent: NodeId) {
        for c in std::mem::take(&mut self.pending_comments) {
            self.arena.append_child(parent, c);
        }
    }

    /// Consume tokens up to and including the next top-level `;` (or a
    /// balanced `{...}` block) and stuff them into a catch-all node so
    /// parsing can continue after something the grammar subset doesn't
    /// recognise (spec §4.1, §7).
    pub(crate) fn recover_unparsable(&mut self) -> NodeId {
        let mut text = String::new();
        let mut depth = 0i32;
        loop {
            let t = self.stream.peek().clone();
            match t.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon if depth == 0 => {
                    self.stream.get();
                    text.push(';');
                    break;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    text.push_str(&t.text);
                    self.stream.get();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    text.push_str(&t.text);
                    self.stream.get();
                    if depth <= 0 {
                        break;
                    }
                }
                TokenKind::Newline => {
                    self.stream.get();
                }
                _ => {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&t.text);
                    self.stream.get();
                }
            }
        }
        self.arena.alloc(NodeKind::UnparsableThing { text })
    }
}

pub fn parse(src: &str, filename: &str) -> cu::Result<(Arena, NodeId)> {
    let mut parser = Parser::new(src);
    let root = parser.parse_header_file_set(filename);
    Ok((parser.finish(), root))
}

/// Folds one more header's source into an already-parsed tree, returning
/// the arena (now owning the new `HeaderFile` too) and that file's id.
pub fn parse_additional(arena: Arena, root: NodeId, src: &str, filename: &str) -> cu::Result<(Arena, NodeId)> {
    Ok(Parser::parse_additional_file(arena, root, src, filename))
}
