use std::collections::HashMap;

use hast::{Arena, NodeId, NodeKind};
use tokens::TokenKind;

use crate::config::PipelineConfig;

/// Re-derive preceding-comment attachment for any comment left as an
/// ordinary sibling rather than already folded into `preceding_comments`
/// (spec §4.1/§4.2: "attach preceding comments" is the very first
/// structural-normalisation pass, run before any name rewrite). The parser
/// already attaches comments as it goes, so in practice this is a
/// normalising pass over trees a later clone or synthetic insertion might
/// have left comments loose in.
pub fn attach_preceding_comments(arena: &mut Arena, root: NodeId) {
    let children_lists: Vec<NodeId> = hast::find_all(arena, root, |_, _| true);
    for parent in children_lists {
        let kids = arena.get(parent).children.clone();
        let mut pending: Vec<NodeId> = Vec::new();
        for &kid in &kids {
            if arena.get(kid).kind.is_comment() {
                pending.push(kid);
                continue;
            }
            if matches!(arena.get(kid).kind, NodeKind::BlankLines { .. }) {
                pending.clear();
                continue;
            }
            if !pending.is_empty() {
                let comments = std::mem::take(&mut pending);
                hast::attach_preceding_comments(arena, kid, comments);
            }
        }
    }
}

/// Clears any captured body text and converts a `static` free function into
/// a regular exported declaration (spec §4.2: "remove function bodies...").
/// A C struct can't host the body itself, so whatever the body did is
/// assumed to already be reachable through the thunk that calls the
/// original C++ entity.
pub fn remove_function_bodies(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    for f in crate::util::find_all_functions(arena, root) {
        let node = arena.get_mut(f);
        node.raw_tokens.clear();
        if let NodeKind::FunctionDeclaration { is_static, export_macro, .. } = &mut node.kind {
            if *is_static {
                *is_static = false;
                if export_macro.is_none() {
                    *export_macro = config.api_export_macro.clone();
                }
            }
        }
    }
}

/// Drops `static`/`extern`/`constexpr` data members: they have no
/// representation as an instance field of a C struct (spec §4.2).
pub fn remove_static_fields(arena: &mut Arena, root: NodeId) {
    let fields = hast::find_all(arena, root, |a, id| {
        matches!(&a.get(id).kind, NodeKind::FieldDeclaration { is_static, .. } if *is_static)
    });
    for f in fields {
        arena.detach(f);
    }
}

/// Inlines a typedef's target type directly, for typedefs nested inside a
/// struct/class body (a C struct field can't reference a nested typedef by
/// its original scoped name once the struct is lifted to file scope) -
/// they're promoted to file scope instead, immediately after their owning
/// struct, rather than truly removed, so downstream references still
/// resolve (spec §4.2: "remove nested typedefs").
pub fn hoist_nested_typedefs(arena: &mut Arena, root: NodeId) -> cu::Result<()> {
    let typedefs = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Typedef { .. }));
    for t in typedefs {
        let Some(parent) = arena.get(t).parent else { continue };
        if !matches!(arena.get(parent).kind, NodeKind::ClassStructUnion { .. }) {
            continue;
        }
        arena.insert_after(parent, t)?;
    }
    Ok(())
}

/// Assigns stable, scope-derived synthetic names to anonymous
/// structs/unions/enums (spec §4.2), so every later pass that keys off a
/// struct's name has one to use. Must run before anything that inspects
/// struct names.
pub fn assign_anonymous_names(arena: &mut Arena, root: NodeId) {
    let mut counters: HashMap<NodeId, usize> = HashMap::new();
    let containers = hast::find_all(arena, root, |a, id| {
        matches!(a.get(id).kind, NodeKind::ClassStructUnion { .. } | NodeKind::HeaderFile { .. })
    });
    for container in containers {
        let children = arena.get(container).children.clone();
        for child in children {
            let scope_name = container_name(arena, container).unwrap_or_else(|| "Anon".to_string());
            match &mut arena.get_mut(child).kind {
                NodeKind::ClassStructUnion { name, .. } if name.is_none() => {
                    let n = counters.entry(container).or_insert(0);
                    *n += 1;
                    *name = Some(format!("{scope_name}_Anon{n}"));
                }
                NodeKind::Enum { name, .. } if name.is_none() => {
                    let n = counters.entry(container).or_insert(0);
                    *n += 1;
                    *name = Some(format!("{scope_name}_AnonEnum{n}"));
                }
                _ => {}
            }
        }
    }
}

fn container_name(arena: &Arena, container: NodeId) -> Option<String> {
    match &arena.get(container).kind {
        NodeKind::ClassStructUnion { name, .. } => name.clone(),
        NodeKind::HeaderFile { filename } => Some(
            filename
                .rsplit('/')
                .next()
                .unwrap_or(filename)
                .trim_end_matches(".h")
                .to_string(),
        ),
        _ => None,
    }
}

/// Evaluates each enum's value expressions in source order, seeding the
/// symbol table with only the enum values computed so far (spec §4.2,
/// §9 "Preprocessor evaluation safety"): no general expression evaluator,
/// just integer literals, previously-bound enum members of the same enum,
/// and `+ - | & ^ << >> ~` operators. An identifier that isn't a
/// previously computed sibling aborts the pass for that enum (its members
/// are left with `computed_value: None`) rather than guessing.
pub fn compute_enum_values(arena: &mut Arena, root: NodeId) {
    let enums = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Enum { .. }));
    for e in enums {
        let mut next_value: i64 = 0;
        let mut scope: HashMap<String, i64> = HashMap::new();
        let elements = arena.get(e).children.clone();
        for el in elements {
            let (name, expr) = match &arena.get(el).kind {
                NodeKind::EnumElement { name, value_expr, .. } => (name.clone(), value_expr.clone()),
                _ => continue,
            };
            let value = if expr.is_empty() {
                Some(next_value)
            } else {
                eval_enum_expr(&expr, &scope)
            };
            if let Some(v) = value {
                next_value = v + 1;
                scope.insert(name.clone(), v);
            }
            if let NodeKind::EnumElement { computed_value, .. } = &mut arena.get_mut(el).kind {
                *computed_value = value;
            }
        }
    }
}

/// A tiny shunting-yard-free evaluator: handles `a | b`, `a << n`, unary
/// `~`/`-`, integer literals (decimal or `0x`), and identifiers resolved
/// only against `scope` (spec §9: restricted symbol table, no free-form
/// identifiers).
fn eval_enum_expr(tokens: &[tokens::Token], scope: &HashMap<String, i64>) -> Option<i64> {
    // Flatten to a token-text stream and recursive-descent over a tiny
    // grammar: expr := term (('|'|'&'|'^'|'<<'|'>>'|'+'|'-') term)*
    let toks: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    let mut pos = 0usize;
    let v = eval_expr(&toks, &mut pos, scope)?;
    Some(v)
}

fn eval_expr(toks: &[&str], pos: &mut usize, scope: &HashMap<String, i64>) -> Option<i64> {
    let mut lhs = eval_unary(toks, pos, scope)?;
    loop {
        match toks.get(*pos).copied() {
            Some("|") => {
                *pos += 1;
                lhs |= eval_unary(toks, pos, scope)?;
            }
            Some("&") => {
                *pos += 1;
                lhs &= eval_unary(toks, pos, scope)?;
            }
            Some("^") => {
                *pos += 1;
                lhs ^= eval_unary(toks, pos, scope)?;
            }
            Some("+") => {
                *pos += 1;
                lhs += eval_unary(toks, pos, scope)?;
            }
            Some("-") => {
                *pos += 1;
                lhs -= eval_unary(toks, pos, scope)?;
            }
            Some("<<") => {
                *pos += 1;
                lhs <<= eval_unary(toks, pos, scope)?;
            }
            Some(">>") => {
                *pos += 1;
                lhs >>= eval_unary(toks, pos, scope)?;
            }
            _ => break,
        }
    }
    Some(lhs)
}

fn eval_unary(toks: &[&str], pos: &mut usize, scope: &HashMap<String, i64>) -> Option<i64> {
    match toks.get(*pos).copied() {
        Some("~") => {
            *pos += 1;
            Some(!eval_unary(toks, pos, scope)?)
        }
        Some("-") => {
            *pos += 1;
            Some(-eval_unary(toks, pos, scope)?)
        }
        Some("(") => {
            *pos += 1;
            let v = eval_expr(toks, pos, scope)?;
            if toks.get(*pos).copied() == Some(")") {
                *pos += 1;
            }
            Some(v)
        }
        Some(lit) => {
            *pos += 1;
            parse_int_literal(lit).or_else(|| scope.get(lit).copied())
        }
        None => None,
    }
}

fn parse_int_literal(s: &str) -> Option<i64> {
    let s = s.trim_end_matches(['u', 'U', 'l', 'L']);
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokens::Token;

    fn enum_element(arena: &mut Arena, name: &str, expr: &[&str]) -> NodeId {
        let value_expr = expr.iter().map(|t| Token::new(TokenKind::Thing, *t, 1, 0)).collect();
        arena.alloc(NodeKind::EnumElement {
            name: name.to_string(),
            value_expr,
            computed_value: None,
            is_count: false,
            is_internal: false,
        })
    }

    #[test]
    fn enum_values_default_to_sequential() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let e = arena.alloc(NodeKind::Enum { name: Some("Color".into()), is_flags_enum: false });
        arena.append_child(root, e);
        let a = enum_element(&mut arena, "Color_Red", &[]);
        let b = enum_element(&mut arena, "Color_Green", &[]);
        arena.append_child(e, a);
        arena.append_child(e, b);

        compute_enum_values(&mut arena, root);

        match &arena.get(a).kind {
            NodeKind::EnumElement { computed_value, .. } => assert_eq!(*computed_value, Some(0)),
            _ => unreachable!(),
        }
        match &arena.get(b).kind {
            NodeKind::EnumElement { computed_value, .. } => assert_eq!(*computed_value, Some(1)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn enum_values_resolve_bitshift_and_sibling_reference() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let e = arena.alloc(NodeKind::Enum { name: Some("Flags".into()), is_flags_enum: false });
        arena.append_child(root, e);
        let one = enum_element(&mut arena, "Flags_One", &["1", "<<", "0"]);
        let two = enum_element(&mut arena, "Flags_Two", &["1", "<<", "1"]);
        let both = enum_element(&mut arena, "Flags_Both", &["Flags_One", "|", "Flags_Two"]);
        arena.append_child(e, one);
        arena.append_child(e, two);
        arena.append_child(e, both);

        compute_enum_values(&mut arena, root);

        match &arena.get(both).kind {
            NodeKind::EnumElement { computed_value, .. } => assert_eq!(*computed_value, Some(3)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn unresolved_identifier_leaves_only_that_element_unresolved() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let e = arena.alloc(NodeKind::Enum { name: Some("Mixed".into()), is_flags_enum: false });
        arena.append_child(root, e);
        let bad = enum_element(&mut arena, "Mixed_Bad", &["SOME_MACRO"]);
        let good = enum_element(&mut arena, "Mixed_Good", &[]);
        arena.append_child(e, bad);
        arena.append_child(e, good);

        compute_enum_values(&mut arena, root);

        match &arena.get(bad).kind {
            NodeKind::EnumElement { computed_value, .. } => assert_eq!(*computed_value, None),
            _ => unreachable!(),
        }
        match &arena.get(good).kind {
            NodeKind::EnumElement { computed_value, .. } => assert_eq!(*computed_value, Some(0)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn flags_enum_and_count_marker_detected_by_suffix() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let e = arena.alloc(NodeKind::Enum { name: Some("ImGuiWindowFlags_".into()), is_flags_enum: false });
        arena.append_child(root, e);
        let count = enum_element(&mut arena, "ImGuiWindowFlags_COUNT", &[]);
        arena.append_child(e, count);

        mark_flags_and_special_enum_values(&mut arena, root);

        match &arena.get(e).kind {
            NodeKind::Enum { is_flags_enum, .. } => assert!(is_flags_enum),
            _ => unreachable!(),
        }
        match &arena.get(count).kind {
            NodeKind::EnumElement { is_count, .. } => assert!(is_count),
            _ => unreachable!(),
        }
    }

    #[test]
    fn static_field_is_removed() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let s = arena.alloc(NodeKind::ClassStructUnion {
            name: Some("Foo".into()),
            kind: hast::StructKind::Struct,
            is_forward_declaration: false,
            has_forward_declaration: false,
            by_value: false,
            keep_unmodified_name: false,
            base: None,
        });
        arena.append_child(file, s);
        let ty = arena.alloc(NodeKind::Type { tokens: vec![], was_reference: false, non_nullable: false });
        let field = arena.alloc(NodeKind::FieldDeclaration {
            names: vec![hast::FieldName { name: "x".into(), array_bound: None, bitfield_width: None }],
            ty,
            accessibility: hast::Accessibility::Public,
            is_static: true,
        });
        arena.append_child(s, field);

        remove_static_fields(&mut arena, root);

        assert!(arena.get(s).children.is_empty());
    }

    #[test]
    fn anonymous_struct_gets_scope_derived_name() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "test.h".into() });
        arena.append_child(root, file);
        let s = arena.alloc(NodeKind::ClassStructUnion {
            name: None,
            kind: hast::StructKind::Struct,
            is_forward_declaration: false,
            has_forward_declaration: false,
            by_value: false,
            keep_unmodified_name: false,
            base: None,
        });
        arena.append_child(file, s);

        assign_anonymous_names(&mut arena, root);

        match &arena.get(s).kind {
            NodeKind::ClassStructUnion { name: Some(name), .. } => assert_eq!(name, "test_Anon1"),
            other => panic!("expected named struct, got {other:?}"),
        }
    }
}

/// Marks an enum `is_flags_enum` when its name ends in `Flags_` (the
/// suffix heuristic spec §4.2 calls for), and marks individual elements
/// `is_count`/`is_internal` by the same suffix-based convention dear_bindings
/// uses: a trailing `_COUNT` member is the count sentinel, a trailing
/// `_Internal`/leading underscore marks an implementation-detail value.
pub fn mark_flags_and_special_enum_values(arena: &mut Arena, root: NodeId) {
    let enums = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Enum { .. }));
    for e in enums {
        let is_flags = match &arena.get(e).kind {
            NodeKind::Enum { name: Some(name), .. } => name.contains("Flags"),
            _ => false,
        };
        if is_flags {
            if let NodeKind::Enum { is_flags_enum, .. } = &mut arena.get_mut(e).kind {
                *is_flags_enum = true;
            }
        }
        let elements = arena.get(e).children.clone();
        for el in elements {
            if let NodeKind::EnumElement { name, is_count, is_internal, .. } = &mut arena.get_mut(el).kind {
                if name.ends_with("_COUNT") || name.ends_with("_Count") {
                    *is_count = true;
                }
                if name.contains("_Internal") || name.ends_with('_') {
                    *is_internal = true;
                }
            }
        }
    }
}

/// `mod_remove_structs`/`mod_remove_functions` (SPEC_FULL "Supplemented
/// features"): deletes named declarations outright before the rest of the
/// pipeline runs, used upstream to drop templated helper types that have
/// no C representation.
pub fn remove_named_declarations(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if !config.remove_structs.is_empty() {
        for s in crate::util::find_all_structs(arena, root) {
            let name = match &arena.get(s).kind {
                NodeKind::ClassStructUnion { name: Some(n), .. } => n.clone(),
                _ => continue,
            };
            if config.remove_structs.contains(&name) {
                arena.detach(s);
            }
        }
    }
    if !config.remove_functions.is_empty() {
        for f in crate::util::find_all_functions(arena, root) {
            let name = match &arena.get(f).kind {
                NodeKind::FunctionDeclaration { name, .. } => name.clone(),
                _ => continue,
            };
            if config.remove_functions.contains(&name) {
                arena.detach(f);
            }
        }
    }
}

/// Stamps each struct's `by_value`/`keep_unmodified_name` HAST flags from
/// the matching config sets (spec §4.3: both change how the C writer
/// renders the struct and how the thunk generator casts it at the
/// boundary), so downstream passes only need to look at the node itself.
pub fn apply_struct_config_flags(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    for s in crate::util::find_all_structs(arena, root) {
        let name = match &arena.get(s).kind {
            NodeKind::ClassStructUnion { name: Some(n), .. } => n.clone(),
            _ => continue,
        };
        if let NodeKind::ClassStructUnion { by_value, keep_unmodified_name, .. } = &mut arena.get_mut(s).kind {
            *by_value = config.by_value_structs.contains(&name);
            *keep_unmodified_name = config.keep_unmodified_name_structs.contains(&name);
        }
    }
}

/// Strips leftover qualifiers the lexer/parser passed through verbatim in
/// a type's token run (e.g. a stray `inline` that slipped into decl-spec
/// scanning for an in-class method). Cosmetic, but keeps generated C
/// declarations free of C++-only noise words.
pub fn strip_cpp_only_type_tokens(arena: &mut Arena, root: NodeId) {
    const NOISE: &[&str] = &["inline", "virtual", "friend", "explicit"];
    let types = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Type { .. }));
    for t in types {
        if let NodeKind::Type { tokens, .. } = &mut arena.get_mut(t).kind {
            tokens.retain(|tok| !(tok.kind == TokenKind::Thing && NOISE.contains(&tok.text.as_str())));
        }
    }
}
