use crate::{Arena, NodeId};

/// Pre-order depth-first walk over `root`'s primary children (and, for
/// conditionals, both branches), visiting `root` itself first.
///
/// Most modifiers only need to touch primary-child structure, so this is
/// the workhorse traversal; passes that specifically need comments or
/// arguments use `Arena::all_child_lists` directly.
pub fn walk(arena: &Arena, root: NodeId, visit: &mut impl FnMut(&Arena, NodeId)) {
    visit(arena, root);
    for &child in &arena.get(root).children {
        walk(arena, child, visit);
    }
    if let crate::NodeKind::Conditional { else_children, .. } = &arena.get(root).kind {
        for &child in else_children {
            walk(arena, child, visit);
        }
    }
}

/// Same as [`walk`] but lets the callback signal early termination by
/// returning `false` for "stop descending into this subtree".
pub fn walk_prunable(arena: &Arena, root: NodeId, visit: &mut impl FnMut(&Arena, NodeId) -> bool) {
    if !visit(arena, root) {
        return;
    }
    for &child in &arena.get(root).children {
        walk_prunable(arena, child, visit);
    }
    if let crate::NodeKind::Conditional { else_children, .. } = &arena.get(root).kind {
        for &child in else_children {
            walk_prunable(arena, child, visit);
        }
    }
}

/// Collect every node id in `root`'s subtree (including `root`) matching
/// `pred`, in pre-order.
pub fn find_all(arena: &Arena, root: NodeId, pred: impl Fn(&Arena, NodeId) -> bool) -> Vec<NodeId> {
    let mut out = Vec::new();
    walk(arena, root, &mut |arena, id| {
        if pred(arena, id) {
            out.push(id);
        }
    });
    out
}

/// Walk up from `node` to the root, returning ancestors from nearest to
/// farthest (not including `node` itself).
pub fn ancestors(arena: &Arena, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = arena.get(node).parent;
    while let Some(id) = cur {
        out.push(id);
        cur = arena.get(id).parent;
    }
    out
}
