use hast::{Arena, NodeId, NodeKind};
use tokens::{Token, TokenKind};

/// Join a token run back into C source text, honouring the writer-side
/// annotations a modifier pass may have set: a reference-turned-pointer
/// renders back as `&`, and a non-nullable pointer renders as `^` so the
/// type comprehender (and downstream TDP parse) can tell it apart from an
/// ordinary nullable pointer (spec §4.3/§4.6, grounded on
/// `gen_metadata.py`'s `WriteContext.mark_non_nullable_pointers` /
/// `emit_converted_references_as_references`).
pub fn render_type(arena: &Arena, ty: NodeId) -> String {
    match &arena.get(ty).kind {
        NodeKind::Type { tokens, was_reference, non_nullable } => {
            collapse_with_pointer_annotations(tokens, *was_reference, *non_nullable)
        }
        NodeKind::FunctionPointerType { name, return_type, arguments } => {
            let ret = render_type(arena, *return_type);
            let args: Vec<String> = arguments.iter().map(|&a| render_argument(arena, a)).collect();
            format!("{ret} (*{})({})", name.clone().unwrap_or_default(), args.join(", "))
        }
        _ => String::new(),
    }
}

fn collapse_with_pointer_annotations(tokens: &[Token], was_reference: bool, non_nullable: bool) -> String {
    let mut out = String::new();
    for (i, t) in tokens.iter().enumerate() {
        let text: &str = if i + 1 == tokens.len() && t.kind == TokenKind::Asterisk {
            if was_reference {
                "&"
            } else if non_nullable {
                "^"
            } else {
                "*"
            }
        } else {
            t.text.as_str()
        };
        if i > 0 && needs_space_before(&out, text) {
            out.push(' ');
        }
        out.push_str(text);
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

pub fn render_argument(arena: &Arena, arg: NodeId) -> String {
    match &arena.get(arg).kind {
        NodeKind::FunctionArgument { name, ty, .. } => {
            let ty_str = render_type(arena, *ty);
            match name {
                Some(n) => format!("{ty_str} {n}"),
                None => ty_str,
            }
        }
        _ => String::new(),
    }
}

/// A node's name before any rename/disambiguation/namespace-prefix pass
/// touched it, read off its unmodified twin; falls back to the current
/// name for nodes with no twin (synthetic nodes a pass generated outright).
pub fn original_name(arena: &Arena, node: NodeId, fallback: &str) -> String {
    match arena.get(node).twin {
        Some(twin) => arena.get(twin).own_name().unwrap_or(fallback).to_string(),
        None => fallback.to_string(),
    }
}

pub fn render_declared_argument_list(arena: &Arena, arguments: &[NodeId], is_variadic: bool) -> String {
    let mut parts: Vec<String> = arguments
        .iter()
        .filter(|&&a| !matches!(&arena.get(a).kind, NodeKind::FunctionArgument { is_implicit_default: true, .. }))
        .map(|&a| render_argument(arena, a))
        .collect();
    if is_variadic {
        parts.push("...".to_string());
    }
    if parts.is_empty() {
        "void".to_string()
    } else {
        parts.join(", ")
    }
}
