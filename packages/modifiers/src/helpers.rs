use hast::{Arena, NodeId, NodeKind};

/// Marks ImStr-style string-view constructor helpers (spec §4.2 "manual
/// helper functions") so the thunk generator treats their marshalling as
/// the built-in string-conversion special case rather than going through
/// the generic cast machinery (dear_bindings's `is_imstr_helper` flag on
/// `mod_generate_default_argument_functions`'s exemption list). A function
/// is recognised as one of these by name: `ImStr::ImStr`-derived
/// constructors flattened to `ImStr_ImStr*`.
pub fn mark_imstr_helpers(arena: &mut Arena, root: NodeId) {
    let functions = crate::util::find_all_functions(arena, root);
    for f in functions {
        if let NodeKind::FunctionDeclaration { name, is_imstr_helper, .. } = &mut arena.get_mut(f).kind {
            if name.starts_with("ImStr_ImStr") {
                *is_imstr_helper = true;
            }
        }
    }
}

/// Wraps the whole header body in `extern "C" { ... }` guarded by
/// `#ifdef __cplusplus` (spec §4.3 "extern C wrapping"), the standard way
/// a C-callable header stays includable from both C and C++ translation
/// units.
pub fn wrap_extern_c(arena: &mut Arena, root: NodeId) {
    let files = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::HeaderFile { .. }));
    for file in files {
        if arena
            .get(file)
            .children
            .iter()
            .any(|&c| matches!(arena.get(c).kind, NodeKind::ExternC { .. }))
        {
            continue;
        }
        let wrapper = arena.alloc(NodeKind::ExternC { has_cplusplus_guard: true });
        let children = arena.get(file).children.clone();
        for &c in &children {
            arena.detach(c);
            arena.append_child(wrapper, c);
        }
        arena.append_child(file, wrapper);
    }
}
