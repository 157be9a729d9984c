use hast::{Arena, NodeId, NodeKind};

use crate::config::PipelineConfig;

/// For each printf-style variadic function (one the parser recognised an
/// `IM_FMTARGS`/`IM_FMTLIST` annotation on, spec §4.2 "Unformatted-function
/// generation"), synthesises a sibling named with an `Unformatted` suffix
/// that collapses the format string and the varargs tail into a single
/// `const char* text` argument - the thunk generator then forwards it as
/// `Name("%s", text)`. Controlled by `--generateunformattedfunctions`.
pub fn generate_unformatted_functions(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if !config.generate_unformatted_functions {
        return;
    }
    let functions = crate::util::find_all_functions(arena, root);
    for f in functions {
        let (is_variadic, format_arg_index, name) = match &arena.get(f).kind {
            NodeKind::FunctionDeclaration { is_variadic, format_arg_index, name, is_unformatted_helper: false, .. } => {
                (*is_variadic, *format_arg_index, name.clone())
            }
            _ => continue,
        };
        let Some(fmt_idx) = format_arg_index else { continue };
        if !is_variadic {
            continue;
        }
        generate_one(arena, f, &name, fmt_idx);
    }
}

fn generate_one(arena: &mut Arena, f: NodeId, base_name: &str, fmt_idx: usize) {
    let text_ty = arena.alloc(NodeKind::Type {
        tokens: vec![
            crate::util::make_token("const"),
            crate::util::make_token("char"),
            crate::util::make_token("*"),
        ],
        was_reference: false,
        non_nullable: false,
    });
    let text_arg = arena.alloc(NodeKind::FunctionArgument {
        name: Some("text".to_string()),
        ty: text_ty,
        default_value: None,
        is_implicit_default: false,
        stub_call_value: None,
    });

    let clone = hast::deep_clone(arena, f);
    if let NodeKind::FunctionDeclaration {
        name,
        arguments,
        is_variadic,
        is_unformatted_helper,
        format_arg_index,
        ..
    } = &mut arena.get_mut(clone).kind
    {
        *name = format!("{base_name}Unformatted");
        arguments.truncate(fmt_idx);
        arguments.push(text_arg);
        *is_variadic = false;
        *is_unformatted_helper = true;
        *format_arg_index = None;
    }
    arena.insert_after(f, clone).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokens::{Token, TokenKind};

    fn ty(arena: &mut Arena, text: &str) -> NodeId {
        arena.alloc(NodeKind::Type { tokens: vec![Token::new(TokenKind::Thing, text, 1, 0)], was_reference: false, non_nullable: false })
    }

    fn variadic_fmt_fn(arena: &mut Arena, name: &str) -> NodeId {
        let ret = ty(arena, "void");
        let fmt_ty = ty(arena, "const char*");
        let fmt_arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("fmt".into()),
            ty: fmt_ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        arena.alloc(NodeKind::FunctionDeclaration {
            name: name.to_string(),
            return_type: ret,
            arguments: vec![fmt_arg],
            role: hast::FunctionRole::Free,
            is_static: false,
            is_const_method: false,
            has_body: false,
            original_class: None,
            export_macro: None,
            format_arg_index: Some(0),
            is_variadic: true,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        })
    }

    #[test]
    fn generates_unformatted_sibling_with_single_text_argument() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let h = variadic_fmt_fn(&mut arena, "h");
        arena.append_child(root, h);
        let mut config = PipelineConfig::default();
        config.generate_unformatted_functions = true;

        generate_unformatted_functions(&mut arena, root, &config);

        let siblings: Vec<NodeId> = arena.get(root).children.clone();
        assert_eq!(siblings.len(), 2);
        let clone = siblings[1];
        match &arena.get(clone).kind {
            NodeKind::FunctionDeclaration { name, arguments, is_variadic, is_unformatted_helper, .. } => {
                assert_eq!(name, "hUnformatted");
                assert!(!is_variadic);
                assert!(is_unformatted_helper);
                assert_eq!(arguments.len(), 1);
                match &arena.get(arguments[0]).kind {
                    NodeKind::FunctionArgument { name: Some(n), .. } => assert_eq!(n, "text"),
                    _ => unreachable!(),
                }
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn disabled_by_default() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let h = variadic_fmt_fn(&mut arena, "h");
        arena.append_child(root, h);
        let config = PipelineConfig::default();

        generate_unformatted_functions(&mut arena, root, &config);

        assert_eq!(arena.get(root).children.len(), 1);
    }

    #[test]
    fn skips_functions_without_a_format_annotation() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let h = variadic_fmt_fn(&mut arena, "h");
        if let NodeKind::FunctionDeclaration { format_arg_index, .. } = &mut arena.get_mut(h).kind {
            *format_arg_index = None;
        }
        arena.append_child(root, h);
        let mut config = PipelineConfig::default();
        config.generate_unformatted_functions = true;

        generate_unformatted_functions(&mut arena, root, &config);

        assert_eq!(arena.get(root).children.len(), 1);
    }
}
