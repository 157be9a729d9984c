use hast::{Arena, NodeId, NodeKind};

use crate::config::PipelineConfig;

/// `--replace-prefix OLD=NEW` and the explicit `rename_defines` table
/// (SPEC_FULL "API-export-macro rewriting"): applied to `#define` names
/// only, the one place callers commonly need to retarget a whole family of
/// macros (`IMGUI_` -> a custom project prefix) without touching every
/// struct/function name.
pub fn rename_defines(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    let defines = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Define { .. }));
    for d in defines {
        if let NodeKind::Define { name, .. } = &mut arena.get_mut(d).kind {
            if let Some(new_name) = config.rename_defines.get(name) {
                *name = new_name.clone();
                continue;
            }
            for (old, new) in &config.replace_prefixes {
                if let Some(rest) = name.strip_prefix(old.as_str()) {
                    *name = format!("{new}{rest}");
                    break;
                }
            }
        }
    }
}

/// Installs the export macro on every free function produced by the
/// pipeline (`mod_make_all_functions_use_imgui_api`, SPEC_FULL): the
/// backend target (a shared library boundary, typically) needs every
/// emitted symbol to carry a consistent dllexport/visibility macro.
pub fn apply_export_macro(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    let Some(macro_name) = &config.api_export_macro else { return };
    for f in crate::util::find_all_functions(arena, root) {
        if let NodeKind::FunctionDeclaration { export_macro, .. } = &mut arena.get_mut(f).kind {
            if export_macro.is_none() {
                *export_macro = Some(macro_name.clone());
            }
        }
    }
}

/// `--replace-prefix OLD=NEW` applied to every other named declaration
/// (functions, structs, enums, typedefs) - spec §4.2 "rename entire prefix
/// (e.g. every `ImGui_…` → `xyz…`)". Defines are handled separately by
/// [`rename_defines`], which also consults the explicit rename table.
pub fn rename_entire_prefix(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if config.replace_prefixes.is_empty() {
        return;
    }
    let nodes = hast::find_all(arena, root, |a, id| {
        matches!(
            a.get(id).kind,
            NodeKind::FunctionDeclaration { .. }
                | NodeKind::ClassStructUnion { .. }
                | NodeKind::Enum { .. }
                | NodeKind::Typedef { .. }
        )
    });
    for n in nodes {
        let name_slot: Option<&mut String> = match &mut arena.get_mut(n).kind {
            NodeKind::FunctionDeclaration { name, .. } => Some(name),
            NodeKind::ClassStructUnion { name: Some(name), .. } => Some(name),
            NodeKind::Enum { name: Some(name), .. } => Some(name),
            NodeKind::Typedef { name, .. } => Some(name),
            _ => None,
        };
        let Some(name) = name_slot else { continue };
        for (old, new) in &config.replace_prefixes {
            if let Some(rest) = name.strip_prefix(old.as_str()) {
                *name = format!("{new}{rest}");
                break;
            }
        }
    }
}

/// §4.2 "rename by signature": a flattened function keeps its name unless
/// one of its arguments carries a configured name, in which case it's
/// renamed outright - a hand-authored escape hatch for overloads that
/// differ only by an argument's name rather than its type, which the
/// type-driven disambiguator (`disambiguate_functions`) cannot tell apart.
pub fn rename_by_signature(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if config.rename_by_signature.is_empty() {
        return;
    }
    for f in crate::util::find_all_functions(arena, root) {
        let (name, arguments) = match &arena.get(f).kind {
            NodeKind::FunctionDeclaration { name, arguments, .. } => (name.clone(), arguments.clone()),
            _ => continue,
        };
        for rule in &config.rename_by_signature {
            if rule.function_name != name {
                continue;
            }
            let has_arg = arguments.iter().any(|&a| {
                matches!(&arena.get(a).kind, NodeKind::FunctionArgument { name: Some(n), .. } if n == &rule.argument_name)
            });
            if has_arg {
                if let NodeKind::FunctionDeclaration { name, .. } = &mut arena.get_mut(f).kind {
                    *name = rule.new_name.clone();
                }
                break;
            }
        }
    }
}

/// §4.2 "rewrite the nearest enclosing preprocessor conditional around a
/// specific function to a new expression": looks up the function by its
/// current (already-flattened) name and overwrites the `#if`/`#ifdef`
/// expression text of the innermost conditional it sits under, leaving the
/// conditional's kind and branch structure untouched.
pub fn rewrite_function_conditionals(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if config.rewrite_function_conditionals.is_empty() {
        return;
    }
    for f in crate::util::find_all_functions(arena, root) {
        let name = match &arena.get(f).kind {
            NodeKind::FunctionDeclaration { name, .. } => name.clone(),
            _ => continue,
        };
        let Some(new_expr) = config.rewrite_function_conditionals.get(&name) else { continue };
        let Some(&(cond, _)) = hast::conditional_context(arena, f).last() else { continue };
        if let NodeKind::Conditional { expression, .. } = &mut arena.get_mut(cond).kind {
            *expression = new_expr.clone();
        }
    }
}
