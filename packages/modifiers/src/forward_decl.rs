use hast::{Arena, NodeId, NodeKind};

/// Forward-declares every named, file-scope struct/class/union at the top
/// of its home header (spec §4.2 "Helpers and markers"; tested property
/// P7): a consumer that only needs an opaque pointer to `Foo` shouldn't
/// have to drag in `Foo`'s full field list, and the original C++ library
/// already relies on this pattern (windowing/renderer backend handles in
/// particular).
///
/// Runs after namespace/template/member flattening so every struct worth
/// forward-declaring is already at file scope under its final name, and
/// after anonymous-name assignment so "named" can be read off `own_name`
/// directly. A struct whose unmodified twin was itself anonymous is
/// skipped - forward-declaring a synthetic `Foo_Anon1` name serves no
/// caller, since nothing outside the header could spell that name anyway.
pub fn generate_forward_declarations(arena: &mut Arena, root: NodeId) {
    let files = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::HeaderFile { .. }));
    for file in files {
        add_forward_decls_for_file(arena, file);
    }
}

fn add_forward_decls_for_file(arena: &mut Arena, file: NodeId) {
    let existing_forward_names: std::collections::HashSet<String> = arena
        .get(file)
        .children
        .iter()
        .filter_map(|&c| match &arena.get(c).kind {
            NodeKind::ClassStructUnion { name: Some(n), is_forward_declaration: true, .. } => Some(n.clone()),
            _ => None,
        })
        .collect();

    let definitions: Vec<NodeId> = arena
        .get(file)
        .children
        .iter()
        .copied()
        .filter(|&c| matches!(&arena.get(c).kind, NodeKind::ClassStructUnion { name: Some(_), is_forward_declaration: false, .. }))
        .filter(|&c| !was_originally_anonymous(arena, c))
        .collect();

    let Some(first_child) = arena.get(file).children.first().copied() else { return };
    let mut anchor: Option<NodeId> = None;
    for def in definitions {
        let (name, kind, keep_unmodified_name) = match &arena.get(def).kind {
            NodeKind::ClassStructUnion { name: Some(n), kind, keep_unmodified_name, .. } => {
                (n.clone(), *kind, *keep_unmodified_name)
            }
            _ => continue,
        };
        if existing_forward_names.contains(&name) {
            if let NodeKind::ClassStructUnion { has_forward_declaration, .. } = &mut arena.get_mut(def).kind {
                *has_forward_declaration = true;
            }
            continue;
        }
        let fwd = arena.alloc(NodeKind::ClassStructUnion {
            name: Some(name),
            kind,
            is_forward_declaration: true,
            has_forward_declaration: false,
            by_value: false,
            keep_unmodified_name,
            base: None,
        });
        match anchor {
            Some(a) => {
                arena.insert_after(a, fwd).ok();
            }
            None => {
                arena.insert_before(first_child, fwd).ok();
            }
        }
        anchor = Some(fwd);
        if let NodeKind::ClassStructUnion { has_forward_declaration, .. } = &mut arena.get_mut(def).kind {
            *has_forward_declaration = true;
        }
    }
}

fn was_originally_anonymous(arena: &Arena, node: NodeId) -> bool {
    match arena.get(node).twin {
        Some(twin) => arena.get(twin).own_name().is_none(),
        None => false,
    }
}
