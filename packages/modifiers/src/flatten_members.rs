use hast::{Arena, FunctionRole, NodeId, NodeKind, OriginalClassRef};

use crate::config::PipelineConfig;

/// Lifts every member function of every struct/class out to file scope as
/// a free function, C-struct style (spec §4.2 "Member function flattening",
/// grounded directly on dear_bindings's `mod_flatten_class_functions`):
///
/// - `StructName::Method(args)` becomes `StructName_Method(StructName* self, args)`.
/// - Constructors become `StructName_StructName(args)` returning `StructName*`.
/// - Destructors become `StructName_destroy(StructName* self)` returning `void`.
/// - `const` methods take `const StructName* self`.
/// - The lifted function remembers `original_class` so the thunk generator
///   can still call `self->Method(args)` against the real C++ type.
///
/// Classes named in `PipelineConfig::member_flatten_exclude_classes` are
/// left with their methods in place (SPEC_FULL "Per-name exclusion
/// lists") - used for the rare type the caller wants kept as a true
/// opaque C++-only handle with no flattened API.
pub fn flatten_members(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    let structs = crate::util::find_all_structs(arena, root);
    for s in structs {
        let name = match &arena.get(s).kind {
            NodeKind::ClassStructUnion { name: Some(n), .. } => n.clone(),
            _ => continue,
        };
        if config.member_flatten_exclude_classes.contains(&name) {
            continue;
        }
        flatten_one_struct(arena, s, &name);
    }
}

fn flatten_one_struct(arena: &mut Arena, s: NodeId, struct_name: &str) {
    let methods: Vec<NodeId> = arena
        .get(s)
        .children
        .iter()
        .copied()
        .filter(|&c| matches!(&arena.get(c).kind, NodeKind::FunctionDeclaration { .. }))
        .collect();

    let mut insertion_point = s;
    for f in methods {
        arena.detach(f);
        rewrite_member_function(arena, f, struct_name);
        arena.insert_after(insertion_point, f).ok();
        insertion_point = f;
    }
}

fn rewrite_member_function(arena: &mut Arena, f: NodeId, struct_name: &str) {
    let (role, is_const, old_name) = match &arena.get(f).kind {
        NodeKind::FunctionDeclaration { role, is_const_method, name, .. } => (*role, *is_const_method, name.clone()),
        _ => return,
    };

    let self_ty = make_self_type(arena, struct_name, is_const);

    match role {
        FunctionRole::Constructor => {
            let ret_ty = make_pointer_type(arena, struct_name);
            if let NodeKind::FunctionDeclaration { name, return_type, original_class, .. } = &mut arena.get_mut(f).kind
            {
                *name = format!("{struct_name}_{struct_name}");
                *return_type = ret_ty;
                *original_class = Some(OriginalClassRef { class_name: struct_name.to_string(), was_const: false });
            }
        }
        FunctionRole::Destructor => {
            let void_ty = arena.alloc(NodeKind::Type { tokens: vec![crate::util::make_token("void")], was_reference: false, non_nullable: false });
            if let NodeKind::FunctionDeclaration { name, return_type, arguments, original_class, .. } =
                &mut arena.get_mut(f).kind
            {
                *name = format!("{struct_name}_destroy");
                *return_type = void_ty;
                arguments.insert(0, make_self_arg(arena, self_ty));
                *original_class = Some(OriginalClassRef { class_name: struct_name.to_string(), was_const: false });
            } else {
                unreachable!()
            }
        }
        FunctionRole::Method => {
            if let NodeKind::FunctionDeclaration { name, arguments, original_class, .. } = &mut arena.get_mut(f).kind {
                *name = format!("{struct_name}_{old_name}");
                arguments.insert(0, make_self_arg(arena, self_ty));
                *original_class = Some(OriginalClassRef { class_name: struct_name.to_string(), was_const: is_const });
            }
        }
        FunctionRole::Free => {}
    }
}

fn make_self_arg(arena: &mut Arena, self_ty: NodeId) -> NodeId {
    arena.alloc(NodeKind::FunctionArgument {
        name: Some("self".to_string()),
        ty: self_ty,
        default_value: None,
        is_implicit_default: false,
        stub_call_value: None,
    })
}

fn make_self_type(arena: &mut Arena, struct_name: &str, is_const: bool) -> NodeId {
    let mut tokens = Vec::new();
    if is_const {
        tokens.push(crate::util::make_token("const"));
    }
    tokens.push(crate::util::make_token(struct_name));
    tokens.push(crate::util::make_token("*"));
    arena.alloc(NodeKind::Type { tokens, was_reference: false, non_nullable: true })
}

fn make_pointer_type(arena: &mut Arena, struct_name: &str) -> NodeId {
    arena.alloc(NodeKind::Type {
        tokens: vec![crate::util::make_token(struct_name), crate::util::make_token("*")],
        was_reference: false,
        non_nullable: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hast::StructKind;

    fn void_ty(arena: &mut Arena) -> NodeId {
        arena.alloc(NodeKind::Type { tokens: vec![crate::util::make_token("void")], was_reference: false, non_nullable: false })
    }

    fn method(arena: &mut Arena, role: FunctionRole, name: &str, is_const: bool) -> NodeId {
        let ret = void_ty(arena);
        arena.alloc(NodeKind::FunctionDeclaration {
            name: name.to_string(),
            return_type: ret,
            arguments: vec![],
            role,
            is_static: false,
            is_const_method: is_const,
            has_body: false,
            original_class: None,
            export_macro: None,
            format_arg_index: None,
            is_variadic: false,
            is_default_argument_helper: false,
            is_manual_helper: false,
            is_imstr_helper: false,
            is_unformatted_helper: false,
        })
    }

    #[test]
    fn constructor_and_method_and_destructor_are_lifted_and_renamed() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let s = arena.alloc(NodeKind::ClassStructUnion { name: Some("Widget".to_string()), kind: StructKind::Struct, base: None });
        let ctor = method(&mut arena, FunctionRole::Constructor, "Widget", false);
        let m = method(&mut arena, FunctionRole::Method, "Draw", true);
        let dtor = method(&mut arena, FunctionRole::Destructor, "~Widget", false);
        arena.append_child(s, ctor);
        arena.append_child(s, m);
        arena.append_child(s, dtor);
        arena.append_child(root, s);
        let config = PipelineConfig::default();

        flatten_members(&mut arena, root, &config);

        match &arena.get(ctor).kind {
            NodeKind::FunctionDeclaration { name, original_class, .. } => {
                assert_eq!(name, "Widget_Widget");
                assert!(original_class.is_some());
            }
            _ => unreachable!(),
        }
        match &arena.get(m).kind {
            NodeKind::FunctionDeclaration { name, arguments, .. } => {
                assert_eq!(name, "Widget_Draw");
                assert_eq!(arguments.len(), 1);
                match &arena.get(arguments[0]).kind {
                    NodeKind::FunctionArgument { name: Some(n), ty, .. } => {
                        assert_eq!(n, "self");
                        match &arena.get(*ty).kind {
                            NodeKind::Type { tokens, .. } => {
                                assert!(tokens.iter().any(|t| t.text == "const"));
                            }
                            _ => unreachable!(),
                        }
                    }
                    _ => unreachable!(),
                }
            }
            _ => unreachable!(),
        }
        match &arena.get(dtor).kind {
            NodeKind::FunctionDeclaration { name, arguments, .. } => {
                assert_eq!(name, "Widget_destroy");
                assert_eq!(arguments.len(), 1);
            }
            _ => unreachable!(),
        }
        // Lifted functions are siblings of the struct now, not its children.
        assert!(arena.get(s).children.is_empty());
    }

    #[test]
    fn excluded_class_keeps_methods_in_place() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let s = arena.alloc(NodeKind::ClassStructUnion { name: Some("Opaque".to_string()), kind: StructKind::Struct, base: None });
        let m = method(&mut arena, FunctionRole::Method, "Frob", false);
        arena.append_child(s, m);
        arena.append_child(root, s);
        let mut config = PipelineConfig::default();
        config.member_flatten_exclude_classes.insert("Opaque".to_string());

        flatten_members(&mut arena, root, &config);

        assert_eq!(arena.get(s).children, vec![m]);
        match &arena.get(m).kind {
            NodeKind::FunctionDeclaration { name, .. } => assert_eq!(name, "Frob"),
            _ => unreachable!(),
        }
    }
}
