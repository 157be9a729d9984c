use hast::{Arena, NodeId, NodeKind};

use crate::config::PipelineConfig;

/// `mod_add_function_comment` (SPEC_FULL "function-level manual comment
/// injection"): appends a configured trailing note to a function's
/// preceding comments, used to annotate generated bindings with caveats
/// the original doc comment doesn't carry (threading/ownership notes for
/// the C caller, mostly).
pub fn add_function_comments(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if config.function_comments.is_empty() {
        return;
    }
    for f in crate::util::find_all_functions(arena, root) {
        let name = match &arena.get(f).kind {
            NodeKind::FunctionDeclaration { name, .. } => name.clone(),
            _ => continue,
        };
        let Some(note) = config.function_comments.get(&name) else { continue };
        let comment = arena.alloc(NodeKind::LineComment { text: note.clone() });
        let mut preceding = arena.get(f).preceding_comments.clone();
        preceding.push(comment);
        hast::attach_preceding_comments(arena, f, preceding);
    }
}
