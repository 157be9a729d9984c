use hast::{Arena, NodeId, NodeKind};

use crate::config::PipelineConfig;

/// Flattens every `namespace X { ... }` block into its enclosing scope,
/// prefixing each direct declaration's name with the resolved namespace
/// prefix (spec §4.2 "Namespace flattening"; `PipelineConfig::namespace_prefix`
/// for the naming rule). Namespaces may nest, so this runs to a fixpoint:
/// an inner namespace is flattened into its (still-namespaced) parent
/// first, picking up the parent's own prefix when that parent is itself
/// flattened on a later pass.
pub fn flatten_namespaces(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    loop {
        let namespaces = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Namespace { .. }));
        let Some(&ns) = namespaces.last() else { break };
        flatten_one_namespace(arena, ns, config);
    }
}

fn flatten_one_namespace(arena: &mut Arena, ns: NodeId, config: &PipelineConfig) {
    let name = match &arena.get(ns).kind {
        NodeKind::Namespace { name } => name.clone(),
        _ => return,
    };
    let prefix = config.namespace_prefix(&name);
    let Some(parent) = arena.get(ns).parent else { return };

    let children = arena.get(ns).children.clone();
    for child in &children {
        prefix_declaration_name(arena, *child, &prefix);
    }
    // Splice the namespace's children into its parent, replacing the
    // namespace node itself, preserving order.
    let mut anchor = ns;
    for &child in &children {
        arena.detach(child);
        arena.insert_after(anchor, child).ok();
        anchor = child;
    }
    arena.detach(ns);
    let _ = parent;
}

fn prefix_declaration_name(arena: &mut Arena, node: NodeId, prefix: &str) {
    match &mut arena.get_mut(node).kind {
        NodeKind::ClassStructUnion { name: Some(name), .. } => *name = format!("{prefix}{name}"),
        NodeKind::Enum { name: Some(name), .. } => *name = format!("{prefix}{name}"),
        NodeKind::Typedef { name, .. } => *name = format!("{prefix}{name}"),
        NodeKind::FunctionDeclaration { name, .. } => *name = format!("{prefix}{name}"),
        NodeKind::Define { name, .. } => *name = format!("{prefix}{name}"),
        _ => {}
    }
    // Enum elements conventionally keep the enum's own prefix, applied when
    // the enum itself is renamed above; nothing more to do for nested
    // struct/enum members here since the rename walk above already touched
    // the declaration node, not its internals.
    let _ = node;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn void_type(arena: &mut Arena) -> NodeId {
        arena.alloc(NodeKind::Type { tokens: vec![], was_reference: false, non_nullable: false })
    }

    #[test]
    fn namespace_members_are_prefixed_and_spliced_into_parent() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let ns = arena.alloc(NodeKind::Namespace { name: "ImGui".into() });
        arena.append_child(file, ns);
        let ret = void_type(&mut arena);
        let func = arena.alloc(NodeKind::FunctionDeclaration {
            name: "Foo".into(),
            return_type: ret,
            arguments: vec![],
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
        });
        arena.append_child(ns, func);

        let config = PipelineConfig::default();
        flatten_namespaces(&mut arena, root, &config);

        let children = arena.get(file).children.clone();
        assert_eq!(children, vec![func], "namespace node should be replaced by its member");
        match &arena.get(func).kind {
            NodeKind::FunctionDeclaration { name, .. } => assert_eq!(name, "ImGui_Foo"),
            other => panic!("expected FunctionDeclaration, got {other:?}"),
        }
    }

    #[test]
    fn per_namespace_prefix_override_takes_priority() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let ns = arena.alloc(NodeKind::Namespace { name: "ImGui".into() });
        arena.append_child(file, ns);
        let target_ty = void_type(&mut arena);
        let target = arena.alloc(NodeKind::Typedef { name: "Id".into(), target: target_ty });
        arena.append_child(ns, target);

        let mut config = PipelineConfig::default();
        config.namespace_prefix_overrides.insert("ImGui".to_string(), "ig".to_string());
        flatten_namespaces(&mut arena, root, &config);

        match &arena.get(target).kind {
            NodeKind::Typedef { name, .. } => assert_eq!(name, "igId"),
            other => panic!("expected Typedef, got {other:?}"),
        }
    }
}
