use hast::{Arena, NodeId, NodeKind};

use crate::config::PipelineConfig;

/// Generates the "skip the trailing defaulted arguments" convenience thunk
/// (spec §4.2 "Default-argument handling"). Grounded on dear_bindings's
/// `mod_generate_default_argument_functions`:
///
/// For a function with N trailing arguments that have default values, the
/// original declaration is renamed with an `Ex` suffix (keeping its full
/// argument list), and a *clone* is inserted right after it that keeps the
/// original, undecorated name; on the clone, each trailing defaulted
/// argument is marked `is_implicit_default` with `stub_call_value` set to
/// its default-value spelling, so the writer omits it from the emitted
/// declaration while the thunk generator still knows what to pass through.
pub fn generate_default_argument_functions(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if !config.generate_default_argument_functions {
        return;
    }
    let functions = crate::util::find_all_functions(arena, root);
    for f in functions {
        let (name, arguments, trailing_defaults) = match &arena.get(f).kind {
            NodeKind::FunctionDeclaration { name, arguments, is_default_argument_helper: false, .. } => {
                (name.clone(), arguments.clone(), count_trailing_defaults(arena, arguments))
            }
            _ => continue,
        };
        if trailing_defaults == 0 || config.default_argument_exclude.contains(&name) {
            continue;
        }
        if is_sole_trivial_flags_default(arena, &arguments, trailing_defaults) {
            continue;
        }
        generate_for(arena, f, trailing_defaults);
    }
}

/// Spec §4.2: "skip functions whose sole default argument is a trivial
/// flags value of 0" — an `Ex`/bare pair is pointless when the only
/// defaulted argument is a `...Flags flags = 0` parameter, since callers
/// never need to spell out the zero value. Grounded on dear_bindings's
/// `mod_generate_default_argument_functions.apply`, which skips generation
/// entirely when there is nothing useful to produce.
fn is_sole_trivial_flags_default(arena: &Arena, arguments: &[NodeId], trailing_defaults: usize) -> bool {
    if trailing_defaults != 1 {
        return false;
    }
    let Some(&arg) = arguments.last() else { return false };
    let (ty, default_value) = match &arena.get(arg).kind {
        NodeKind::FunctionArgument { ty, default_value: Some(toks), .. } => (*ty, toks),
        _ => return false,
    };
    if crate::util::collapse_tokens_to_string(default_value) != "0" {
        return false;
    }
    match &arena.get(ty).kind {
        NodeKind::Type { tokens, .. } => crate::util::collapse_tokens_to_string(tokens).contains("Flags"),
        _ => false,
    }
}

fn count_trailing_defaults(arena: &Arena, arguments: &[NodeId]) -> usize {
    let mut n = 0;
    for &a in arguments.iter().rev() {
        match &arena.get(a).kind {
            NodeKind::FunctionArgument { default_value: Some(_), .. } => n += 1,
            _ => break,
        }
    }
    n
}

fn generate_for(arena: &mut Arena, f: NodeId, trailing_defaults: usize) {
    let base_name = match &arena.get(f).kind {
        NodeKind::FunctionDeclaration { name, .. } => name.clone(),
        _ => return,
    };

    let clone = hast::deep_clone(arena, f);
    if let NodeKind::FunctionDeclaration { name, is_default_argument_helper, .. } = &mut arena.get_mut(clone).kind {
        *name = base_name.clone();
        *is_default_argument_helper = true;
    }

    let arg_count = match &arena.get(clone).kind {
        NodeKind::FunctionDeclaration { arguments, .. } => arguments.len(),
        _ => 0,
    };
    let clone_args = match &arena.get(clone).kind {
        NodeKind::FunctionDeclaration { arguments, .. } => arguments.clone(),
        _ => Vec::new(),
    };
    for idx in (arg_count - trailing_defaults)..arg_count {
        let arg = clone_args[idx];
        let default_text = match &arena.get(arg).kind {
            NodeKind::FunctionArgument { default_value: Some(toks), .. } => {
                crate::util::collapse_tokens_to_string(toks)
            }
            _ => String::new(),
        };
        if let NodeKind::FunctionArgument { is_implicit_default, stub_call_value, .. } = &mut arena.get_mut(arg).kind {
            *is_implicit_default = true;
            *stub_call_value = Some(default_text);
        }
    }

    if let NodeKind::FunctionDeclaration { name, .. } = &mut arena.get_mut(f).kind {
        *name = format!("{base_name}Ex");
    }

    arena.insert_after(f, clone).ok();
}
