use hast::{Arena, NodeId, NodeKind};
use tokens::{Token, TokenKind};

/// Join a token run back into readable source text. Not meant to be exact
/// round-trip output - just good enough for comment text and disambiguation
/// suffix synthesis, mirroring dear_bindings's `collapse_tokens_to_string`.
pub fn collapse_tokens_to_string(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, t) in tokens.iter().enumerate() {
        if i > 0 && needs_space_before(&out, &t.text) {
            out.push(' ');
        }
        out.push_str(&t.text);
    }
    out
}

fn needs_space_before(prev: &str, next: &str) -> bool {
    match (prev.chars().last(), next.chars().next()) {
        (Some(a), Some(b)) => {
            let glued = matches!(b, ')' | ']' | ',' | ';') || matches!(a, '(' | '[' | '*' | '&' | '^');
            !glued
        }
        _ => true,
    }
}

pub fn make_token(text: impl Into<String>) -> Token {
    Token::new(TokenKind::Thing, text, 0, 0)
}

/// The C-style declaration string for a `Type`/`FunctionPointerType` node,
/// used by the disambiguator and cast synthesis as a cheap type-equality
/// key. Doesn't need to be pretty, just stable and distinguishing.
pub fn type_key(arena: &Arena, ty: NodeId) -> String {
    match &arena.get(ty).kind {
        NodeKind::Type { tokens, .. } => collapse_tokens_to_string(tokens),
        NodeKind::FunctionPointerType { return_type, arguments, .. } => {
            let ret = type_key(arena, *return_type);
            let args: Vec<String> = arguments
                .iter()
                .map(|&a| match &arena.get(a).kind {
                    NodeKind::FunctionArgument { ty, .. } => type_key(arena, *ty),
                    _ => String::new(),
                })
                .collect();
            format!("{ret} (*)({})", args.join(", "))
        }
        _ => String::new(),
    }
}

/// The "primary" type name used as a disambiguation-suffix fallback: the
/// last identifier-like token in the type's spelling (`const char*` ->
/// `char`, `ImVec2` -> `ImVec2`).
pub fn primary_type_name(arena: &Arena, ty: NodeId) -> String {
    match &arena.get(ty).kind {
        NodeKind::Type { tokens, .. } => tokens
            .iter()
            .rev()
            .find(|t| t.kind == TokenKind::Thing)
            .map(|t| t.text.clone())
            .unwrap_or_else(|| "Value".to_string()),
        NodeKind::FunctionPointerType { .. } => "Callback".to_string(),
        _ => "Value".to_string(),
    }
}

pub fn is_pointer_type(arena: &Arena, ty: NodeId) -> bool {
    matches!(&arena.get(ty).kind, NodeKind::Type { tokens, .. } if tokens.last().map(|t| t.kind) == Some(TokenKind::Asterisk))
}

/// Strip characters that can't appear in a C identifier (disambiguation
/// suffixes sometimes pick up `&`/`*`/spaces from a type's spelling).
pub fn sanitise_name_for_identifier(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect()
}

pub fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn find_all_functions(arena: &Arena, root: NodeId) -> Vec<NodeId> {
    hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::FunctionDeclaration { .. }))
}

pub fn find_all_structs(arena: &Arena, root: NodeId) -> Vec<NodeId> {
    hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::ClassStructUnion { .. }))
}
