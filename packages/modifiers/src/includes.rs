use hast::{Arena, NodeId, NodeKind};

use crate::config::PipelineConfig;

/// Rewrites the header's `#include` list per config (spec §4.2 "Include
/// rewriting"): drops includes the C side can't satisfy (a C++-only STL
/// header pulled in for a type that's been flattened away) and adds the
/// ones the generated C needs instead (`<stdint.h>`, the backend's own
/// public header when `--backend` is set, ...).
pub fn rewrite_includes(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    let files = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::HeaderFile { .. }));
    for file in files {
        let includes: Vec<NodeId> = arena
            .get(file)
            .children
            .iter()
            .copied()
            .filter(|&c| matches!(&arena.get(c).kind, NodeKind::Include { .. }))
            .collect();
        for inc in includes {
            if let NodeKind::Include { path, .. } = &arena.get(inc).kind {
                if config.removed_includes.contains(path) {
                    arena.detach(inc);
                }
            }
        }
        let mut anchor = None;
        for path in &config.added_includes {
            let (path, is_system) = split_include_spec(path);
            let node = arena.alloc(NodeKind::Include { path: path.to_string(), is_system });
            match anchor {
                Some(a) => {
                    arena.insert_after(a, node).ok();
                }
                None => {
                    let first_child = arena.get(file).children.first().copied();
                    match first_child {
                        Some(fc) => {
                            arena.insert_before(fc, node).ok();
                        }
                        None => arena.append_child(file, node),
                    }
                }
            }
            anchor = Some(node);
        }
    }
}

fn split_include_spec(spec: &str) -> (&str, bool) {
    if let Some(inner) = spec.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        (inner, true)
    } else {
        (spec.trim_matches('"'), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_removed_includes_and_appends_added_ones() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let vector_inc = arena.alloc(NodeKind::Include { path: "vector".into(), is_system: true });
        arena.append_child(file, vector_inc);

        let mut config = PipelineConfig::default();
        config.removed_includes.insert("vector".to_string());
        config.added_includes.push("<stdint.h>".to_string());

        rewrite_includes(&mut arena, root, &config);

        let remaining: Vec<NodeId> = arena.get(file).children.clone();
        assert_eq!(remaining.len(), 1);
        match &arena.get(remaining[0]).kind {
            NodeKind::Include { path, is_system } => {
                assert_eq!(path, "stdint.h");
                assert!(is_system);
            }
            _ => unreachable!(),
        }
    }
}
