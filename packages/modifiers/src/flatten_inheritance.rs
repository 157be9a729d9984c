use hast::{Accessibility, Arena, NodeId, NodeKind};

/// Splices a struct's single base class's fields to the front of its own
/// field list (spec §4.2 "Inheritance flattening"): C has no inheritance,
/// so `struct Derived : Base { ... }` becomes a `Derived` whose first
/// fields are clones of `Base`'s fields, keeping memory layout compatible
/// with the original C++ type.
pub fn flatten_inheritance(arena: &mut Arena, root: NodeId) {
    loop {
        let structs = crate::util::find_all_structs(arena, root);
        let pending = structs.into_iter().find(|&s| matches!(&arena.get(s).kind, NodeKind::ClassStructUnion { base: Some(_), .. }));
        let Some(derived) = pending else { break };
        flatten_one(arena, root, derived);
    }
}

fn flatten_one(arena: &mut Arena, root: NodeId, derived: NodeId) {
    let base_name = match &arena.get(derived).kind {
        NodeKind::ClassStructUnion { base: Some(b), .. } => b.clone(),
        _ => return,
    };
    let base_node = crate::util::find_all_structs(arena, root)
        .into_iter()
        .find(|&s| matches!(&arena.get(s).kind, NodeKind::ClassStructUnion { name: Some(n), .. } if *n == base_name));

    if let NodeKind::ClassStructUnion { base, .. } = &mut arena.get_mut(derived).kind {
        *base = None;
    }

    let Some(base_node) = base_node else { return };
    let base_fields: Vec<NodeId> = arena
        .get(base_node)
        .children
        .iter()
        .copied()
        .filter(|&c| matches!(&arena.get(c).kind, NodeKind::FieldDeclaration { accessibility: Accessibility::Public, .. }))
        .collect();

    let cloned: Vec<NodeId> = base_fields.iter().map(|&f| hast::deep_clone(arena, f)).collect();
    let existing = arena.get(derived).children.clone();
    // Rebuild the child list with the inherited fields first, preserving
    // everything else's relative order (comments, nested types, ...).
    for &c in &existing {
        arena.detach(c);
    }
    for &c in &cloned {
        arena.append_child(derived, c);
    }
    for &c in &existing {
        arena.append_child(derived, c);
    }
}
