use crate::{Arena, NodeId};

/// Attach `comment` as `element`'s same-line trailing comment (spec §4.1:
/// "a line-comment taken immediately after a non-comment, non-blank element
/// on the same logical line becomes that element's attached comment and is
/// not added separately to the parent's children").
pub fn attach_trailing_comment(arena: &mut Arena, element: NodeId, comment: NodeId) {
    arena.detach(comment);
    arena.get_mut(element).attached_comment = Some(comment);
    arena.get_mut(comment).parent = Some(element);
}

/// Attach a run of comment nodes as `element`'s preceding comments, in
/// source order. Used both by the parser and by the "attach preceding
/// comments" structural-normalisation pass (spec §4.2), which re-derives
/// this from comment nodes left as ordinary siblings.
pub fn attach_preceding_comments(arena: &mut Arena, element: NodeId, comments: Vec<NodeId>) {
    for &c in &comments {
        arena.detach(c);
    }
    for &c in &comments {
        arena.get_mut(c).parent = Some(element);
    }
    arena.get_mut(element).preceding_comments = comments;
}
