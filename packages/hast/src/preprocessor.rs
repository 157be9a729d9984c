use crate::{Arena, ConditionalKind, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Then,
    Else,
}

/// A node's enclosing conditionals, outermost to innermost, together with
/// which branch it sits in (spec §3.4).
pub fn conditional_context(arena: &Arena, node: NodeId) -> Vec<(NodeId, Branch)> {
    let mut ctx = Vec::new();
    let mut cur = node;
    while let Some(parent) = arena.get(cur).parent {
        if let NodeKind::Conditional { else_children, .. } = &arena.get(parent).kind {
            let branch = if else_children.contains(&cur) { Branch::Else } else { Branch::Then };
            ctx.push((parent, branch));
        }
        cur = parent;
    }
    ctx.reverse();
    ctx
}

/// Whether `a` and `b` can never both be compiled in (spec §3.4, tested
/// properties §8): either they sit in opposite branches of the same
/// conditional, or one is in the `then`-branch of `#ifdef X` and the other
/// in the `then`-branch of `#ifndef X` for the same `X`.
pub fn are_mutually_exclusive(arena: &Arena, a: NodeId, b: NodeId) -> bool {
    let ctx_a = conditional_context(arena, a);
    let ctx_b = conditional_context(arena, b);

    for &(ca, ba) in &ctx_a {
        for &(cb, bb) in &ctx_b {
            if ca == cb {
                if ba != bb {
                    return true;
                }
                continue;
            }
            let (Some(info_a), Some(info_b)) = (conditional_info(arena, ca), conditional_info(arena, cb)) else {
                continue;
            };
            if info_a.1 != info_b.1 {
                continue; // different expressions, can't reason about exclusivity
            }
            let opposite_sense = matches!(
                (info_a.0, info_b.0),
                (ConditionalKind::Ifdef, ConditionalKind::Ifndef)
                    | (ConditionalKind::Ifndef, ConditionalKind::Ifdef)
            );
            if opposite_sense && ba == Branch::Then && bb == Branch::Then {
                return true;
            }
        }
    }
    false
}

fn conditional_info(arena: &Arena, node: NodeId) -> Option<(ConditionalKind, &str)> {
    match &arena.get(node).kind {
        NodeKind::Conditional { kind, expression, .. } => Some((*kind, expression.as_str())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arena;

    fn leaf(arena: &mut Arena) -> NodeId {
        arena.alloc(NodeKind::BlankLines { count: 1 })
    }

    #[test]
    fn then_else_of_same_conditional_are_exclusive() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let cond = arena.alloc(NodeKind::Conditional {
            kind: ConditionalKind::If,
            expression: "FOO".into(),
            else_children: Vec::new(),
            is_elif_converted: false,
        });
        arena.append_child(root, cond);
        let a = leaf(&mut arena);
        let b = leaf(&mut arena);
        arena.append_child(cond, a);
        if let NodeKind::Conditional { else_children, .. } = &mut arena.get_mut(cond).kind {
            else_children.push(b);
        }
        arena.get_mut(b).parent = Some(cond);

        assert!(are_mutually_exclusive(&arena, a, b));
    }

    #[test]
    fn ifdef_vs_ifndef_same_symbol_are_exclusive() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let cond_ifdef = arena.alloc(NodeKind::Conditional {
            kind: ConditionalKind::Ifdef,
            expression: "FOO".into(),
            else_children: Vec::new(),
            is_elif_converted: false,
        });
        let cond_ifndef = arena.alloc(NodeKind::Conditional {
            kind: ConditionalKind::Ifndef,
            expression: "FOO".into(),
            else_children: Vec::new(),
            is_elif_converted: false,
        });
        arena.append_child(root, cond_ifdef);
        arena.append_child(root, cond_ifndef);
        let a = leaf(&mut arena);
        let b = leaf(&mut arena);
        arena.append_child(cond_ifdef, a);
        arena.append_child(cond_ifndef, b);

        assert!(are_mutually_exclusive(&arena, a, b));
    }

    #[test]
    fn unrelated_nodes_are_not_exclusive() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let a = leaf(&mut arena);
        let b = leaf(&mut arena);
        arena.append_child(root, a);
        arena.append_child(root, b);
        assert!(!are_mutually_exclusive(&arena, a, b));
    }
}
