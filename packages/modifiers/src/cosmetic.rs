use hast::{Arena, NodeId, NodeKind};

/// Cosmetic alignment passes that run last (spec §4.2): nothing here
/// changes semantics, only how later passes/writers will see whitespace
/// that survived verbatim from the original token stream. Collapses
/// runs of more than two consecutive blank lines down to two, matching
/// the convention the rest of the generated header uses as paragraph
/// spacing.
pub fn collapse_excess_blank_lines(arena: &mut Arena, root: NodeId) {
    let blanks = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::BlankLines { .. }));
    for b in blanks {
        if let NodeKind::BlankLines { count } = &mut arena.get_mut(b).kind {
            if *count > 2 {
                *count = 2;
            }
        }
    }
}
