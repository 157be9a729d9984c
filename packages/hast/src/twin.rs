use crate::{Arena, Node, NodeId, NodeKind};

/// Deep-clone the subtree rooted at `node`, returning a fully detached
/// clone (its `parent` is `None`; the caller attaches it wherever it's
/// needed).
///
/// Per spec §3.5/§9 and tested property P3: the unmodified-twin pointer is
/// *never* re-cloned - the clone's twin is set to the exact same id the
/// source's twin already pointed at (which may be `None` if `node` has no
/// twin yet, e.g. while building the very first shadow tree).
pub fn deep_clone(arena: &mut Arena, node: NodeId) -> NodeId {
    let original = arena.get(node).clone_shallow_fields();
    let new_children: Vec<NodeId> = original
        .children
        .iter()
        .map(|&c| deep_clone(arena, c))
        .collect();
    let new_preceding: Vec<NodeId> = original
        .preceding_comments
        .iter()
        .map(|&c| deep_clone(arena, c))
        .collect();
    let new_attached = original.attached_comment.map(|c| deep_clone(arena, c));
    let new_kind = clone_kind(arena, &original.kind);

    let new_id = arena.alloc(new_kind);
    {
        let n = arena.get_mut(new_id);
        n.raw_tokens = original.raw_tokens.clone();
        n.name_override = original.name_override.clone();
        // Invariant I3 / property P3: twin is shared with the source, not cloned.
        n.twin = original.twin;
    }
    for &c in &new_children {
        arena.append_child(new_id, c);
    }
    {
        let n = arena.get_mut(new_id);
        n.preceding_comments = new_preceding;
        n.attached_comment = new_attached;
    }
    for &c in arena.get(new_id).preceding_comments.clone().iter() {
        arena.get_mut(c).parent = Some(new_id);
    }
    if let Some(c) = arena.get(new_id).attached_comment {
        arena.get_mut(c).parent = Some(new_id);
    }
    new_id
}

/// Clone a `NodeKind`, recursively deep-cloning any `NodeId` it embeds
/// outside the generic primary-children list (the type child of a field,
/// a function's argument list, ...). This is what the "multi-shape
/// children" design note calls a writable, variant-specific child list.
fn clone_kind(arena: &mut Arena, kind: &NodeKind) -> NodeKind {
    match kind {
        NodeKind::Typedef { name, target } => NodeKind::Typedef {
            name: name.clone(),
            target: deep_clone(arena, *target),
        },
        NodeKind::FieldDeclaration { names, ty, accessibility, is_static } => NodeKind::FieldDeclaration {
            names: names.clone(),
            ty: deep_clone(arena, *ty),
            accessibility: *accessibility,
            is_static: *is_static,
        },
        NodeKind::FunctionDeclaration {
            name,
            return_type,
            arguments,
            role,
            is_static,
            is_const_method,
            has_body,
            original_class,
            export_macro,
            format_arg_index,
            is_variadic,
            is_default_argument_helper,
            is_manual_helper,
            is_imstr_helper,
            is_unformatted_helper,
        } => NodeKind::FunctionDeclaration {
            name: name.clone(),
            return_type: deep_clone(arena, *return_type),
            arguments: arguments.iter().map(|&a| deep_clone(arena, a)).collect(),
            role: *role,
            is_static: *is_static,
            is_const_method: *is_const_method,
            has_body: *has_body,
            original_class: original_class.clone(),
            export_macro: export_macro.clone(),
            format_arg_index: *format_arg_index,
            is_variadic: *is_variadic,
            is_default_argument_helper: *is_default_argument_helper,
            is_manual_helper: *is_manual_helper,
            is_imstr_helper: *is_imstr_helper,
            is_unformatted_helper: *is_unformatted_helper,
        },
        NodeKind::FunctionArgument { name, ty, default_value, is_implicit_default, stub_call_value } => {
            NodeKind::FunctionArgument {
                name: name.clone(),
                ty: deep_clone(arena, *ty),
                default_value: default_value.clone(),
                is_implicit_default: *is_implicit_default,
                stub_call_value: stub_call_value.clone(),
            }
        }
        NodeKind::FunctionPointerType { name, return_type, arguments } => NodeKind::FunctionPointerType {
            name: name.clone(),
            return_type: deep_clone(arena, *return_type),
            arguments: arguments.iter().map(|&a| deep_clone(arena, a)).collect(),
        },
        NodeKind::Conditional { kind, expression, else_children, is_elif_converted } => NodeKind::Conditional {
            kind: *kind,
            expression: expression.clone(),
            else_children: else_children.iter().map(|&c| deep_clone(arena, c)).collect(),
            is_elif_converted: *is_elif_converted,
        },
        // Every other variant owns no extra NodeIds beyond the generic lists.
        other => other.clone(),
    }
}

impl Node {
    /// Shallow copy of everything except the variant-specific NodeId
    /// references inside `kind`, which `clone_kind` remaps separately.
    fn clone_shallow_fields(&self) -> Node {
        self.clone()
    }
}

/// Snapshot the whole live tree rooted at `root` into a detached shadow
/// copy, then point every live node in `root`'s subtree at its shadow
/// counterpart via `Node::twin`. Call this once, before the first modifier
/// runs (spec §3.5, §6.4).
pub fn save_unmodified_twins(arena: &mut Arena, root: NodeId) {
    let shadow_root = deep_clone(arena, root);
    link_twins(arena, root, shadow_root);
}

fn link_twins(arena: &mut Arena, live: NodeId, shadow: NodeId) {
    arena.get_mut(live).twin = Some(shadow);
    let live_children = arena.get(live).children.clone();
    let shadow_children = arena.get(shadow).children.clone();
    for (l, s) in live_children.iter().zip(shadow_children.iter()) {
        link_twins(arena, *l, *s);
    }
    let live_arguments = extra_ids(arena, live);
    let shadow_arguments = extra_ids(arena, shadow);
    for (l, s) in live_arguments.iter().zip(shadow_arguments.iter()) {
        link_twins(arena, *l, *s);
    }
}

/// The "extra" (non-primary-child) NodeIds a variant embeds: the ones
/// `clone_kind` walks. Used to keep live/shadow trees in lockstep when
/// linking twins.
fn extra_ids(arena: &Arena, node: NodeId) -> Vec<NodeId> {
    match &arena.get(node).kind {
        NodeKind::Typedef { target, .. } => vec![*target],
        NodeKind::FieldDeclaration { ty, .. } => vec![*ty],
        NodeKind::FunctionDeclaration { return_type, arguments, .. } => {
            let mut v = vec![*return_type];
            v.extend(arguments.iter().copied());
            v
        }
        NodeKind::FunctionArgument { ty, .. } => vec![*ty],
        NodeKind::FunctionPointerType { return_type, arguments, .. } => {
            let mut v = vec![*return_type];
            v.extend(arguments.iter().copied());
            v
        }
        NodeKind::Conditional { else_children, .. } => else_children.clone(),
        _ => Vec::new(),
    }
}
