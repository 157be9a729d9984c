use std::collections::HashMap;

use hast::{Arena, NodeId, NodeKind};

use crate::config::PipelineConfig;

/// C has no overloading, so every set of same-name free functions
/// (produced either directly or by flattening members) needs distinct
/// names. Grounded on dear_bindings's `mod_disambiguate_functions`:
///
/// - functions that are mutually exclusive under `#if`/`#ifdef` (spec §3.4,
///   `hast::are_mutually_exclusive`) never collide and are left alone;
/// - each colliding function after the first gets a suffix: the
///   configured `name_suffix_remap` entry for its distinguishing argument's
///   full type spelling if one exists, else that argument's primary type
///   name, picking the shortest argument-index suffix that makes every
///   member of the group unique;
/// - a remaining tie (identical suffix) is broken with a trailing `_Const`
///   on the `const`-qualified overload of an otherwise-identical pair.
pub fn disambiguate_functions(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    let functions = crate::util::find_all_functions(arena, root);
    let mut by_name: HashMap<String, Vec<NodeId>> = HashMap::new();
    for f in functions {
        let name = match &arena.get(f).kind {
            NodeKind::FunctionDeclaration { name, .. } => name.clone(),
            _ => continue,
        };
        if config.disambiguation_exclude.contains(&name) {
            continue;
        }
        by_name.entry(name).or_default().push(f);
    }

    for (_, group) in by_name {
        if group.len() < 2 {
            continue;
        }
        disambiguate_group(arena, &group, config);
    }
}

fn disambiguate_group(arena: &mut Arena, group: &[NodeId], config: &PipelineConfig) {
    // Partition into clusters of functions that can actually collide at
    // link/call time; members of different clusters keep the bare name.
    let mut clusters: Vec<Vec<NodeId>> = Vec::new();
    'outer: for &f in group {
        for cluster in clusters.iter_mut() {
            if cluster.iter().any(|&g| !hast::are_mutually_exclusive(arena, f, g)) {
                cluster.push(f);
                continue 'outer;
            }
        }
        clusters.push(vec![f]);
    }

    for cluster in clusters {
        if cluster.len() < 2 {
            continue;
        }
        assign_suffixes(arena, &cluster, config);
    }
}

fn arg_count(arena: &Arena, f: NodeId) -> usize {
    match &arena.get(f).kind {
        NodeKind::FunctionDeclaration { arguments, .. } => arguments.len(),
        _ => 0,
    }
}

fn arg_ty_at(arena: &Arena, f: NodeId, idx: usize) -> Option<NodeId> {
    match &arena.get(f).kind {
        NodeKind::FunctionDeclaration { arguments, .. } => arguments.get(idx).and_then(|&a| match &arena.get(a).kind {
            NodeKind::FunctionArgument { ty, .. } => Some(*ty),
            _ => None,
        }),
        _ => None,
    }
}

fn suffix_for(arena: &Arena, ty: NodeId, config: &PipelineConfig) -> String {
    let key = crate::util::type_key(arena, ty);
    if let Some(s) = config.name_suffix_remap.get(&key) {
        return s.clone();
    }
    crate::util::capitalise(&crate::util::sanitise_name_for_identifier(&crate::util::primary_type_name(arena, ty)))
}

/// Finds the smallest argument index at which suffixing every member of
/// `cluster` by that argument's type yields distinct names, then renames
/// all but the first (dear_bindings keeps the lexically-first overload's
/// bare name; first-in-source-order here is a reasonable stand-in since
/// HAST preserves source order).
fn assign_suffixes(arena: &mut Arena, cluster: &[NodeId], config: &PipelineConfig) {
    let max_args = cluster.iter().map(|&f| arg_count(arena, f)).max().unwrap_or(0);
    let mut chosen: Option<(usize, Vec<String>)> = None;

    for idx in 0..max_args {
        let suffixes: Vec<String> = cluster
            .iter()
            .map(|&f| match arg_ty_at(arena, f, idx) {
                Some(ty) => suffix_for(arena, ty, config),
                None => String::new(),
            })
            .collect();
        let mut unique = suffixes.clone();
        unique.sort();
        unique.dedup();
        if unique.len() == cluster.len() {
            chosen = Some((idx, suffixes));
            break;
        }
    }

    let Some((_, suffixes)) = chosen else {
        // No argument index disambiguates the whole cluster; fall back to a
        // running counter plus break remaining const/non-const ties below.
        for (i, &f) in cluster.iter().enumerate().skip(1) {
            rename_with_suffix(arena, f, &format!("_{i}"));
        }
        break_const_ties(arena, cluster);
        return;
    };

    for (i, &f) in cluster.iter().enumerate().skip(1) {
        rename_with_suffix(arena, f, &format!("_{}", suffixes[i]));
    }
    break_const_ties(arena, cluster);
}

/// After suffixing, a `const`/non-`const` pair with otherwise identical
/// signatures still collides; append `_Const` to the const-qualified one.
fn break_const_ties(arena: &mut Arena, cluster: &[NodeId]) {
    let names: HashMap<NodeId, String> = cluster
        .iter()
        .map(|&f| {
            let n = match &arena.get(f).kind {
                NodeKind::FunctionDeclaration { name, .. } => name.clone(),
                _ => String::new(),
            };
            (f, n)
        })
        .collect();
    for &f in cluster {
        let is_const = matches!(&arena.get(f).kind, NodeKind::FunctionDeclaration { is_const_method: true, .. });
        if !is_const {
            continue;
        }
        let dup = cluster.iter().any(|&g| g != f && names.get(&g) == names.get(&f));
        if dup {
            rename_with_suffix(arena, f, "_Const");
        }
    }
}

fn rename_with_suffix(arena: &mut Arena, f: NodeId, suffix: &str) {
    if let NodeKind::FunctionDeclaration { name, .. } = &mut arena.get_mut(f).kind {
        name.push_str(suffix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokens::{Token, TokenKind};

    fn ty(arena: &mut Arena, text: &str) -> NodeId {
        arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(TokenKind::Thing, text, 1, 0)],
            was_reference: false,
            non_nullable: false,
        })
    }

    fn func_with_arg_type(arena: &mut Arena, name: &str, arg_ty_text: &str) -> NodeId {
        let ret = ty(arena, "void");
        let arg_ty = ty(arena, arg_ty_text);
        let arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("v".into()),
            ty: arg_ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        arena.alloc(NodeKind::FunctionDeclaration {
            name: name.to_string(),
            return_type: ret,
            arguments: vec![arg],
            role: hast::FunctionRole::Free,
            is_static: false,
            is_const_method: false,
            has_body: false,
            original_class: None,
            export_macro: None,
            format_arg_index: None,
            is_variadic: false,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        })
    }

    #[test]
    fn overloads_are_suffixed_by_distinguishing_argument_type() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let a = func_with_arg_type(&mut arena, "Foo_Push", "int");
        let b = func_with_arg_type(&mut arena, "Foo_Push", "float");
        arena.append_child(root, a);
        arena.append_child(root, b);
        let config = PipelineConfig::default();

        disambiguate_functions(&mut arena, root, &config);

        let name_a = match &arena.get(a).kind {
            NodeKind::FunctionDeclaration { name, .. } => name.clone(),
            _ => unreachable!(),
        };
        let name_b = match &arena.get(b).kind {
            NodeKind::FunctionDeclaration { name, .. } => name.clone(),
            _ => unreachable!(),
        };
        assert_eq!(name_a, "Foo_Push");
        assert_eq!(name_b, "Foo_Push_Float");
    }

    #[test]
    fn excluded_name_is_left_untouched_even_when_colliding() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let a = func_with_arg_type(&mut arena, "Foo_Push", "int");
        let b = func_with_arg_type(&mut arena, "Foo_Push", "float");
        arena.append_child(root, a);
        arena.append_child(root, b);
        let mut config = PipelineConfig::default();
        config.disambiguation_exclude.insert("Foo_Push".to_string());

        disambiguate_functions(&mut arena, root, &config);

        match &arena.get(b).kind {
            NodeKind::FunctionDeclaration { name, .. } => assert_eq!(name, "Foo_Push"),
            _ => unreachable!(),
        }
    }
}
