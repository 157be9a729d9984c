use std::collections::HashSet;

use hast::{Branch, ConditionalKind, FunctionRole, NodeId, NodeKind, OriginalClassRef};

use crate::config::EmitConfig;
use crate::text::{collapse_tokens_to_string, original_name, render_declared_argument_list, render_type};

/// Generates the `.cpp` file of call-through thunks (spec §4.4): one
/// function per transformed declaration that isn't itself a manual helper,
/// each re-emitting the C signature and forwarding to the real C++ API,
/// casting across whatever the modifier pipeline changed (references to
/// pointers, by-value structs to pointers, enums kept distinct types).
pub fn write_thunks(arena: &hast::Arena, header_file: NodeId, config: &EmitConfig, header_name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("#include \"{header_name}\"\n\n"));

    let enum_names = collect_enum_names(arena, header_file);
    let functions = hast::find_all(arena, header_file, |a, id| {
        matches!(a.get(id).kind, NodeKind::FunctionDeclaration { is_manual_helper: false, .. })
    });

    let mut gen = ConditionalGenerator::default();
    for f in functions {
        let ctx: Vec<(ConditionalKind, String, Branch)> = hast::conditional_context(arena, f)
            .into_iter()
            .filter_map(|(cond, branch)| match &arena.get(cond).kind {
                NodeKind::Conditional { kind, expression, .. } => Some((*kind, expression.clone(), branch)),
                _ => None,
            })
            .collect();
        gen.advance_to(&ctx, &mut out);
        write_comments_cpp(arena, f, &mut out);
        out.push_str(&write_one_thunk(arena, f, config, &enum_names));
        out.push('\n');
    }
    gen.close_all(&mut out);
    out
}

fn write_comments_cpp(arena: &hast::Arena, node: NodeId, out: &mut String) {
    for &c in &arena.get(node).preceding_comments {
        match &arena.get(c).kind {
            NodeKind::LineComment { text } => out.push_str(&format!("//{text}\n")),
            NodeKind::BlockComment { text } => out.push_str(&format!("/*{text}*/\n")),
            _ => {}
        }
    }
}

fn collect_enum_names(arena: &hast::Arena, root: NodeId) -> HashSet<String> {
    hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Enum { .. }))
        .into_iter()
        .filter_map(|e| match &arena.get(e).kind {
            NodeKind::Enum { name: Some(n), .. } => Some(n.clone()),
            _ => None,
        })
        .collect()
}

/// Tracks the currently-open preprocessor conditionals while functions are
/// visited in source order, emitting only the delta between one function's
/// enclosing conditionals and the next's (spec §4.4 step 10).
#[derive(Default)]
struct ConditionalGenerator {
    open: Vec<(ConditionalKind, String, Branch)>,
}

impl ConditionalGenerator {
    fn advance_to(&mut self, ctx: &[(ConditionalKind, String, Branch)], out: &mut String) {
        let common = self.open.iter().zip(ctx.iter()).take_while(|(a, b)| a == b).count();
        for _ in common..self.open.len() {
            out.push_str("#endif\n");
        }
        self.open.truncate(common);
        for (kind, expression, branch) in &ctx[common..] {
            let directive = match kind {
                ConditionalKind::If => "#if",
                ConditionalKind::Ifdef => "#ifdef",
                ConditionalKind::Ifndef => "#ifndef",
            };
            out.push_str(&format!("{directive} {expression}\n"));
            if *branch == Branch::Else {
                out.push_str("#else\n");
            }
            self.open.push((*kind, expression.clone(), *branch));
        }
    }

    fn close_all(&mut self, out: &mut String) {
        for _ in 0..self.open.len() {
            out.push_str("#endif\n");
        }
        self.open.clear();
    }
}

fn write_one_thunk(
    arena: &hast::Arena,
    f: NodeId,
    config: &EmitConfig,
    enum_names: &HashSet<String>,
) -> String {
    let (name, return_type, arguments, role, is_variadic, original_class, export_macro, is_unformatted_helper) =
        match &arena.get(f).kind {
            NodeKind::FunctionDeclaration {
                name,
                return_type,
                arguments,
                role,
                is_variadic,
                original_class,
                export_macro,
                is_unformatted_helper,
                ..
            } => (
                name.clone(),
                *return_type,
                arguments.clone(),
                *role,
                *is_variadic,
                original_class.clone(),
                export_macro.clone(),
                *is_unformatted_helper,
            ),
            _ => return String::new(),
        };

    let args_decl = render_declared_argument_list(arena, &arguments, is_variadic);
    let ret_decl = render_type(arena, return_type);
    let prefix = export_macro.as_deref().map(|m| format!("{m} ")).unwrap_or_default();

    let mut body = String::new();
    let original_method_name = original_name(arena, f, &name);

    let call_args: Vec<String> = arguments
        .iter()
        .filter(|&&a| !matches!(&arena.get(a).kind, NodeKind::FunctionArgument { name: Some(n), .. } if n == "self"))
        .filter(|&&a| !matches!(&arena.get(a).kind, NodeKind::FunctionArgument { is_implicit_default: true, .. }))
        .map(|&a| forward_argument(arena, a, config, enum_names))
        .collect();

    let has_self = arguments.iter().any(|&a| matches!(&arena.get(a).kind, NodeKind::FunctionArgument { name: Some(n), .. } if n == "self"));

    if is_unformatted_helper {
        let base_name = name.strip_suffix("Unformatted").unwrap_or(&name);
        let target = call_target(&original_class, has_self, base_name);
        let mut fwd_args: Vec<String> = arguments
            .iter()
            .filter(|&&a| !matches!(&arena.get(a).kind, NodeKind::FunctionArgument { name: Some(n), .. } if n == "self" || n == "text"))
            .map(|&a| forward_argument(arena, a, config, enum_names))
            .collect();
        fwd_args.push("\"%s\"".to_string());
        fwd_args.push("text".to_string());
        let call = format!("{target}({})", fwd_args.join(", "));
        body.push_str(&receive_return_stmt(arena, &call, return_type, config, enum_names));
        return format!("{prefix}{ret_decl} {name}({args_decl})\n{{\n{body}}}\n");
    }

    let varargs_header = if is_variadic {
        let counterpart = config.varargs_suffix_overrides.get(&original_method_name).cloned().unwrap_or_else(|| format!("{original_method_name}V"));
        format!(
            "    va_list args;\n    va_start(args, {});\n",
            last_named_fixed_arg(arena, &arguments).unwrap_or_else(|| "fmt".to_string())
        ) + &format!(
            "    {}",
            va_call(arena, &counterpart, has_self, &original_class, &call_args, return_type, config, enum_names)
        )
            + "\n    va_end(args);\n"
    } else {
        String::new()
    };

    match role {
        FunctionRole::Constructor => {
            let class_name = original_class.as_ref().map(|c| c.class_name.clone()).unwrap_or_default();
            let ctor_call = format!("::{class_name}({})", call_args.join(", "));
            if config.placement_constructor_structs.contains(&class_name) && has_self {
                body.push_str(&format!("    IM_PLACEMENT_NEW(self) {ctor_call};\n    return self;\n"));
            } else {
                body.push_str(&format!("    return new {ctor_call};\n"));
            }
        }
        FunctionRole::Destructor => {
            let class_name = original_class.as_ref().map(|c| c.class_name.clone()).unwrap_or_default();
            let target = call_target(&original_class, has_self, &format!("~{class_name}"));
            body.push_str(&format!("    {target}();\n"));
        }
        FunctionRole::Method | FunctionRole::Free => {
            if is_variadic {
                body.push_str(&varargs_header);
            } else {
                let target = call_target(&original_class, has_self, &original_method_name);
                let call = format!("{target}({})", call_args.join(", "));
                body.push_str(&receive_return_stmt(arena, &call, return_type, config, enum_names));
            }
        }
    }

    format!("{prefix}{ret_decl} {name}({args_decl})\n{{\n{body}}}\n")
}

fn last_named_fixed_arg(arena: &hast::Arena, arguments: &[NodeId]) -> Option<String> {
    arguments
        .iter()
        .rev()
        .find_map(|&a| match &arena.get(a).kind {
            NodeKind::FunctionArgument { name: Some(n), .. } if n != "self" => Some(n.clone()),
            _ => None,
        })
}

/// Builds the call target for an original C++ entity, casting `self` back
/// to the original class (spec §8 scenario 2, §4.4 steps 3/7) or, for a free
/// function, qualifying it to global scope. The thunk `.cpp` includes both
/// the generated C header (where the class is only an opaque C typedef) and
/// the original C++ header, so a bare `self->m()`/`Name()` would bind to the
/// C typedef or risk resolving to an unrelated in-scope overload; the cast
/// and `::` qualifier make sure it reaches the real C++ declaration.
fn call_target(original_class: &Option<OriginalClassRef>, has_self: bool, method: &str) -> String {
    match original_class {
        Some(class) if has_self => {
            let const_kw = if class.was_const { "const " } else { "" };
            format!("reinterpret_cast<{const_kw}::{}*>(self)->{method}", class.class_name)
        }
        _ => format!("::{method}"),
    }
}

fn va_call(
    arena: &hast::Arena,
    counterpart: &str,
    has_self: bool,
    original_class: &Option<OriginalClassRef>,
    call_args: &[String],
    return_type: NodeId,
    config: &EmitConfig,
    enum_names: &HashSet<String>,
) -> String {
    let mut all_args = call_args.to_vec();
    all_args.push("args".to_string());
    let target = call_target(original_class, has_self, counterpart);
    let call = format!("{target}({})", all_args.join(", "));
    receive_return_stmt(arena, &call, return_type, config, enum_names)
}

/// Builds the statement that captures a C++ call's result and returns it
/// through the C signature, inserting the cast spec §4.4 step 5 requires
/// when the return type differs from what the unmodified twin declared.
fn receive_return_stmt(
    arena: &hast::Arena,
    call_expr: &str,
    return_type: NodeId,
    config: &EmitConfig,
    enum_names: &HashSet<String>,
) -> String {
    if is_void(arena, return_type) {
        return format!("    {call_expr};\n");
    }
    let expr = receive_value(arena, call_expr, return_type, config, enum_names);
    format!("    return {expr};\n")
}

fn is_void(arena: &hast::Arena, ty: NodeId) -> bool {
    matches!(&arena.get(ty).kind, NodeKind::Type { tokens, .. } if tokens.len() == 1 && tokens[0].text == "void")
}

/// Casts a C argument value on its way into the real C++ call (spec §4.4
/// step 5/6): dereferences pointers that only exist because of a
/// reference- or by-value-to-pointer conversion, routes by-value structs
/// through the generated `ConvertToCPP_X` helper, and otherwise
/// `reinterpret_cast`s when the twin's type text doesn't match.
fn forward_argument(arena: &hast::Arena, arg: NodeId, config: &EmitConfig, enum_names: &HashSet<String>) -> String {
    let (name, ty) = match &arena.get(arg).kind {
        NodeKind::FunctionArgument { name, ty, .. } => (name.clone().unwrap_or_default(), *ty),
        _ => return String::new(),
    };
    let (was_reference, non_nullable, primary) = match &arena.get(ty).kind {
        NodeKind::Type { was_reference, non_nullable, tokens, .. } => {
            (*was_reference, *non_nullable, primary_name(tokens))
        }
        _ => return name,
    };
    if was_reference || non_nullable {
        if config.by_value_structs.contains(&primary) {
            return format!("ConvertToCPP_{primary}(*{name})");
        }
        return format!("*{name}");
    }
    if enum_names.contains(&primary) && twin_text_differs(arena, ty) {
        let cpp_type = twin_render(arena, ty).unwrap_or(primary.clone());
        return format!("static_cast<{cpp_type}>({name})");
    }
    if twin_text_differs(arena, ty) {
        let cpp_type = twin_render(arena, ty).unwrap_or(primary);
        return format!("reinterpret_cast<{cpp_type}>({name})");
    }
    name
}

/// Casts a C++ return value back to the C signature's declared return
/// type, the inverse of [`forward_argument`].
fn receive_value(arena: &hast::Arena, expr: &str, ty: NodeId, config: &EmitConfig, enum_names: &HashSet<String>) -> String {
    let primary = match &arena.get(ty).kind {
        NodeKind::Type { tokens, .. } => primary_name(tokens),
        _ => return expr.to_string(),
    };
    if config.by_value_structs.contains(&primary) && !has_pointer_suffix(arena, ty) {
        return format!("ConvertFromCPP_{primary}({expr})");
    }
    if enum_names.contains(&primary) && twin_text_differs(arena, ty) {
        return format!("static_cast<{}>({expr})", render_type(arena, ty));
    }
    if twin_text_differs(arena, ty) {
        return format!("reinterpret_cast<{}>({expr})", render_type(arena, ty));
    }
    expr.to_string()
}

fn has_pointer_suffix(arena: &hast::Arena, ty: NodeId) -> bool {
    matches!(&arena.get(ty).kind, NodeKind::Type { tokens, .. } if tokens.last().map(|t| t.text == "*").unwrap_or(false))
}

fn primary_name(tokens: &[tokens::Token]) -> String {
    tokens
        .iter()
        .rev()
        .find(|t| t.kind == tokens::TokenKind::Thing)
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

fn twin_text_differs(arena: &hast::Arena, ty: NodeId) -> bool {
    let Some(twin) = arena.get(ty).twin else { return false };
    let NodeKind::Type { tokens, .. } = &arena.get(ty).kind else { return false };
    let NodeKind::Type { tokens: twin_tokens, .. } = &arena.get(twin).kind else { return false };
    collapse_tokens_to_string(tokens) != collapse_tokens_to_string(twin_tokens)
}

fn twin_render(arena: &hast::Arena, ty: NodeId) -> Option<String> {
    let twin = arena.get(ty).twin?;
    Some(render_type(arena, twin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hast::{Arena, OriginalClassRef};
    use tokens::Token;

    fn plain_ty(arena: &mut Arena, text: &str) -> NodeId {
        arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(tokens::TokenKind::Thing, text, 1, 0)],
            was_reference: false,
            non_nullable: false,
        })
    }

    #[test]
    fn const_method_thunk_casts_self_and_qualifies_call() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let self_ty = arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(tokens::TokenKind::Thing, "S", 1, 0), Token::new(tokens::TokenKind::Asterisk, "*", 1, 0)],
            was_reference: false,
            non_nullable: true,
        });
        let self_arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("self".into()),
            ty: self_ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        let void_ty = plain_ty(&mut arena, "void");
        let f = arena.alloc(NodeKind::FunctionDeclaration {
            name: "m".into(),
            return_type: void_ty,
            arguments: vec![self_arg],
            role: FunctionRole::Method,
            is_static: false,
            is_const_method: true,
            has_body: false,
            original_class: Some(OriginalClassRef { class_name: "S".into(), was_const: true }),
            export_macro: None,
            format_arg_index: None,
            is_variadic: false,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        });
        arena.append_child(file, f);
        // Snapshot the twin while the name is still "m" (pre-flattening), then
        // rename the live node the way flatten_members does, so
        // `original_name` recovers "m" for the call target.
        hast::save_unmodified_twins(&mut arena, root);
        if let NodeKind::FunctionDeclaration { name, .. } = &mut arena.get_mut(f).kind {
            *name = "S_m".into();
        }

        let config = EmitConfig::default();
        let out = write_thunks(&arena, file, &config, "t.h");
        assert!(
            out.contains("reinterpret_cast<const ::S*>(self)->m();"),
            "expected cast-and-qualified method call, got:\n{out}"
        );
    }

    #[test]
    fn destructor_thunk_calls_destructor() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let self_ty = plain_ty(&mut arena, "Widget");
        let self_arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("self".into()),
            ty: self_ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        let void_ty = plain_ty(&mut arena, "void");
        let f = arena.alloc(NodeKind::FunctionDeclaration {
            name: "Widget_destroy".into(),
            return_type: void_ty,
            arguments: vec![self_arg],
            role: FunctionRole::Destructor,
            is_static: false,
            is_const_method: false,
            has_body: false,
            original_class: Some(OriginalClassRef { class_name: "Widget".into(), was_const: false }),
            export_macro: Some("IMGUI_API".into()),
            format_arg_index: None,
            is_variadic: false,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        });
        arena.append_child(file, f);
        hast::save_unmodified_twins(&mut arena, root);

        let config = EmitConfig::default();
        let out = write_thunks(&arena, file, &config, "widget.h");
        assert!(out.contains("reinterpret_cast<::Widget*>(self)->~Widget();"), "expected cast destructor call, got:\n{out}");
    }

    #[test]
    fn constructor_thunk_heap_allocates_by_default() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let ret_ty = arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(tokens::TokenKind::Thing, "Widget", 1, 0), Token::new(tokens::TokenKind::Asterisk, "*", 1, 0)],
            was_reference: false,
            non_nullable: true,
        });
        let f = arena.alloc(NodeKind::FunctionDeclaration {
            name: "Widget_Widget".into(),
            return_type: ret_ty,
            arguments: vec![],
            role: FunctionRole::Constructor,
            is_static: false,
            is_const_method: false,
            has_body: false,
            original_class: Some(OriginalClassRef { class_name: "Widget".into(), was_const: false }),
            export_macro: None,
            format_arg_index: None,
            is_variadic: false,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        });
        arena.append_child(file, f);
        hast::save_unmodified_twins(&mut arena, root);

        let config = EmitConfig::default();
        let out = write_thunks(&arena, file, &config, "widget.h");
        assert!(out.contains("return new ::Widget();"), "expected heap new with global qualifier, got:\n{out}");
    }

    #[test]
    fn by_value_struct_return_uses_convert_helper() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let ret_ty = plain_ty(&mut arena, "ImVec2");
        let f = arena.alloc(NodeKind::FunctionDeclaration {
            name: "GetMousePos".into(),
            return_type: ret_ty,
            arguments: vec![],
            role: FunctionRole::Free,
            is_static: false,
            is_const_method: false,
            has_body: false,
            original_class: None,
            export_macro: None,
            format_arg_index: None,
            is_variadic: false,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        });
        arena.append_child(file, f);
        hast::save_unmodified_twins(&mut arena, root);

        let mut config = EmitConfig::default();
        config.by_value_structs.insert("ImVec2".into());
        let out = write_thunks(&arena, file, &config, "t.h");
        assert!(out.contains("ConvertFromCPP_ImVec2(::GetMousePos())"), "expected convert helper, got:\n{out}");
    }

    #[test]
    fn unformatted_helper_forwards_percent_s_and_text() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let void_ty = plain_ty(&mut arena, "void");
        let text_ty = plain_ty(&mut arena, "const char*");
        let text_arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("text".into()),
            ty: text_ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        let f = arena.alloc(NodeKind::FunctionDeclaration {
            name: "hUnformatted".into(),
            return_type: void_ty,
            arguments: vec![text_arg],
            role: FunctionRole::Free,
            is_static: false,
            is_const_method: false,
            has_body: false,
            original_class: None,
            export_macro: None,
            format_arg_index: None,
            is_variadic: false,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: true,
        });
        arena.append_child(file, f);
        hast::save_unmodified_twins(&mut arena, root);

        let config = EmitConfig::default();
        let out = write_thunks(&arena, file, &config, "t.h");
        assert!(out.contains("::h(\"%s\", text);"), "expected globally-qualified %s forwarding call, got:\n{out}");
    }
}
