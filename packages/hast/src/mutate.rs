use crate::{Arena, NodeId};

/// Declarative tree-mutation helpers (spec §3.1, design note in §9).
///
/// These are the only operations permitted to change parent/child
/// relationships; modifiers must not splice `children` Vecs by hand, or the
/// parent-back-reference invariant (I1/I2, tested properties P1/P2) can
/// silently break.
impl Arena {
    /// Attach `child` as the last primary child of `parent`. If `child`
    /// already has a parent it is detached first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.get_mut(parent).children.push(child);
        self.get_mut(child).parent = Some(parent);
    }

    /// Insert `child` immediately before `anchor` in `anchor`'s parent's
    /// child list.
    pub fn insert_before(&mut self, anchor: NodeId, child: NodeId) -> cu::Result<()> {
        let parent = cu::check!(self.get(anchor).parent, "insert_before: {anchor} has no parent")?;
        self.detach(child);
        let siblings = &mut self.get_mut(parent).children;
        let idx = cu::check!(
            siblings.iter().position(|&x| x == anchor),
            "insert_before: {anchor} not found in parent {parent}'s children"
        )?;
        siblings.insert(idx, child);
        self.get_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Insert `child` immediately after `anchor` in `anchor`'s parent's
    /// child list.
    pub fn insert_after(&mut self, anchor: NodeId, child: NodeId) -> cu::Result<()> {
        let parent = cu::check!(self.get(anchor).parent, "insert_after: {anchor} has no parent")?;
        self.detach(child);
        let siblings = &mut self.get_mut(parent).children;
        let idx = cu::check!(
            siblings.iter().position(|&x| x == anchor),
            "insert_after: {anchor} not found in parent {parent}'s children"
        )?;
        siblings.insert(idx + 1, child);
        self.get_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Replace `old` with `new` in `old`'s parent's child list. `old` is
    /// left detached (parent cleared) afterwards.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> cu::Result<()> {
        let parent = cu::check!(self.get(old).parent, "replace_child: {old} has no parent")?;
        self.detach(new);
        let siblings = &mut self.get_mut(parent).children;
        let idx = cu::check!(
            siblings.iter().position(|&x| x == old),
            "replace_child: {old} not found in parent {parent}'s children"
        )?;
        siblings[idx] = new;
        self.get_mut(new).parent = Some(parent);
        self.get_mut(old).parent = None;
        Ok(())
    }

    /// Detach `node` from its parent's child list (primary, preceding
    /// comments, or attached-comment slot - whichever it's actually in) and
    /// clear its `parent` field. A no-op if `node` has no parent.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).parent else {
            return;
        };
        let p = self.get_mut(parent);
        p.children.retain(|&x| x != node);
        p.preceding_comments.retain(|&x| x != node);
        if p.attached_comment == Some(node) {
            p.attached_comment = None;
        }
        if let crate::NodeKind::Conditional { else_children, .. } = &mut p.kind {
            else_children.retain(|&x| x != node);
        }
        self.get_mut(node).parent = None;
    }

    /// Remove `node` and detach it; equivalent to `detach` but named to
    /// match spec §3.1's "Nodes are removed by detaching from their
    /// parent's child list".
    pub fn remove_child(&mut self, node: NodeId) {
        self.detach(node);
    }

    /// Enumerate every child list reachable from `node`, read-only,
    /// including synthesised views (e.g. `Some(attached_comment)` as a
    /// one-element list). Design note §9: "enumerate-all-child-lists".
    pub fn all_child_lists(&self, node: NodeId) -> Vec<Vec<NodeId>> {
        let n = self.get(node);
        let mut lists = vec![n.preceding_comments.clone(), n.children.clone()];
        if let Some(c) = n.attached_comment {
            lists.push(vec![c]);
        }
        match &n.kind {
            crate::NodeKind::Conditional { else_children, .. } => {
                lists.push(else_children.clone());
            }
            crate::NodeKind::FunctionDeclaration { arguments, .. } => {
                lists.push(arguments.clone());
            }
            crate::NodeKind::FunctionPointerType { arguments, .. } => {
                lists.push(arguments.clone());
            }
            _ => {}
        }
        lists
    }

    /// Enumerate only the child lists a mutator is allowed to splice
    /// directly (primary children and, for conditionals, the else-branch).
    /// Preceding comments and the attached comment are managed through
    /// dedicated accessors instead, to keep "a trailing comment is on the
    /// same source line" from being violated by a generic insert.
    pub fn writable_child_lists_mut(&mut self, node: NodeId) -> Vec<&mut Vec<NodeId>> {
        let n = self.get_mut(node);
        let mut lists = vec![&mut n.children];
        match &mut n.kind {
            crate::NodeKind::Conditional { else_children, .. } => lists.push(else_children),
            crate::NodeKind::FunctionDeclaration { arguments, .. } => lists.push(arguments),
            crate::NodeKind::FunctionPointerType { arguments, .. } => lists.push(arguments),
            _ => {}
        }
        lists
    }

    /// Check invariants I1/I2 (spec §3.1, tested properties P1/P2):
    /// every node in a child list has that node as its parent, and every
    /// node id appears in at most one parent's lists.
    pub fn validate_hierarchy(&self) -> cu::Result<()> {
        let mut owner: std::collections::HashMap<NodeId, NodeId> = std::collections::HashMap::new();
        for id in self.ids() {
            for list in self.all_child_lists(id) {
                for child in list {
                    if let Some(prev) = owner.insert(child, id) {
                        cu::bail!(
                            "hierarchy violation: {child} is a child of both {prev} and {id}"
                        );
                    }
                    let actual_parent = self.get(child).parent;
                    cu::ensure!(
                        actual_parent == Some(id),
                        "hierarchy violation: {child} is listed under {id} but parent field is {actual_parent:?}"
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;

    fn leaf(arena: &mut Arena, name: &str) -> NodeId {
        arena.alloc(NodeKind::Namespace { name: name.into() })
    }

    #[test]
    fn append_and_detach_round_trip() {
        let mut arena = Arena::new();
        let parent = arena.alloc(NodeKind::HeaderFileSet);
        let child = leaf(&mut arena, "a");
        arena.append_child(parent, child);
        assert_eq!(arena.get(child).parent, Some(parent));
        assert_eq!(arena.get(parent).children, vec![child]);
        arena.validate_hierarchy().unwrap();

        arena.detach(child);
        assert_eq!(arena.get(child).parent, None);
        assert!(arena.get(parent).children.is_empty());
    }

    #[test]
    fn insert_before_and_after() {
        let mut arena = Arena::new();
        let parent = arena.alloc(NodeKind::HeaderFileSet);
        let a = leaf(&mut arena, "a");
        let b = leaf(&mut arena, "b");
        arena.append_child(parent, a);
        arena.append_child(parent, b);

        let x = leaf(&mut arena, "x");
        arena.insert_before(b, x).unwrap();
        assert_eq!(arena.get(parent).children, vec![a, x, b]);

        let y = leaf(&mut arena, "y");
        arena.insert_after(a, y).unwrap();
        assert_eq!(arena.get(parent).children, vec![a, y, x, b]);
        arena.validate_hierarchy().unwrap();
    }

    #[test]
    fn replace_child_detaches_old() {
        let mut arena = Arena::new();
        let parent = arena.alloc(NodeKind::HeaderFileSet);
        let a = leaf(&mut arena, "a");
        arena.append_child(parent, a);
        let b = leaf(&mut arena, "b");
        arena.replace_child(a, b).unwrap();
        assert_eq!(arena.get(parent).children, vec![b]);
        assert_eq!(arena.get(a).parent, None);
    }

    #[test]
    fn validate_hierarchy_catches_dual_parent() {
        let mut arena = Arena::new();
        let p1 = arena.alloc(NodeKind::HeaderFileSet);
        let p2 = arena.alloc(NodeKind::HeaderFileSet);
        let child = leaf(&mut arena, "a");
        arena.get_mut(p1).children.push(child);
        arena.get_mut(p2).children.push(child);
        arena.get_mut(child).parent = Some(p1);
        assert!(arena.validate_hierarchy().is_err());
    }
}
