use hast::{Arena, NodeId, NodeKind};

/// C has no templates, so a templated struct only reaches the output if
/// something actually instantiates it. This pass walks field/argument
/// types looking for `Name<Args>` spellings, and for each distinct
/// instantiation clones the template body with its parameter names
/// textually substituted, naming the clone `Name_Args` (spec §4.2
/// "Template flattening"). Runs to a fixpoint since a newly generated
/// instantiation can itself reference another template.
pub fn flatten_templates(arena: &mut Arena, root: NodeId) {
    loop {
        let templated = crate::util::find_all_structs(arena, root)
            .into_iter()
            .find(|&s| has_template_child(arena, s));
        let Some(tmpl_struct) = templated else { break };
        instantiate_all_uses(arena, root, tmpl_struct);
        // Remove the original template unconditionally so the outer loop
        // always makes progress (a template with zero remaining uses, or
        // one whose uses were just rewritten, must not be revisited) and so
        // no `Template` node survives to the fixpoint (property P5).
        arena.detach(tmpl_struct);
    }
}

fn has_template_child(arena: &Arena, s: NodeId) -> bool {
    arena.get(s).children.iter().any(|&c| matches!(arena.get(c).kind, NodeKind::Template { .. }))
}

fn template_params(arena: &Arena, s: NodeId) -> Vec<String> {
    arena
        .get(s)
        .children
        .iter()
        .find_map(|&c| match &arena.get(c).kind {
            NodeKind::Template { params } => Some(params.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Finds every `Type` node whose token text spells `BaseName<arg1, arg2>`,
/// clones `tmpl_struct` once per distinct argument list with its
/// template-parameter tokens substituted, and rewrites the use site to
/// reference the instantiation's synthesized name. Returns whether any use
/// was found.
fn instantiate_all_uses(arena: &mut Arena, root: NodeId, tmpl_struct: NodeId) -> bool {
    let base_name = match &arena.get(tmpl_struct).kind {
        NodeKind::ClassStructUnion { name: Some(n), .. } => n.clone(),
        _ => return false,
    };
    let params = template_params(arena, tmpl_struct);
    let types = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Type { .. }));
    let mut found = false;
    let mut instantiated: std::collections::HashMap<String, NodeId> = std::collections::HashMap::new();

    for ty in types {
        let Some((args, text)) = match_instantiation(arena, ty, &base_name) else { continue };
        found = true;
        let mangled = format!("{base_name}_{}", args.join("_").replace([' ', '*'], ""));
        let inst_id = *instantiated.entry(mangled.clone()).or_insert_with(|| {
            let clone = hast::deep_clone(arena, tmpl_struct);
            if let NodeKind::ClassStructUnion { name, .. } = &mut arena.get_mut(clone).kind {
                *name = Some(mangled.clone());
            }
            remove_template_marker(arena, clone);
            substitute_params(arena, clone, &params, &args);
            if let Some(parent) = arena.get(tmpl_struct).parent {
                arena.insert_before(parent_anchor(arena, tmpl_struct), clone).ok();
                let _ = parent;
            }
            clone
        });
        let _ = inst_id;
        if let NodeKind::Type { tokens, .. } = &mut arena.get_mut(ty).kind {
            *tokens = vec![crate::util::make_token(mangled.clone())];
        }
        let _ = text;
    }
    found
}

fn parent_anchor(_arena: &Arena, tmpl_struct: NodeId) -> NodeId {
    tmpl_struct
}

/// Strips the cloned `Template { params }` marker child a deep-clone of the
/// template body otherwise carries over, so an instantiation is an
/// ordinary concrete struct rather than one that still looks templated to
/// a later `has_template_child` check (property P5: no `Template` node
/// survives the fixpoint).
fn remove_template_marker(arena: &mut Arena, s: NodeId) {
    let marker = arena
        .get(s)
        .children
        .iter()
        .copied()
        .find(|&c| matches!(arena.get(c).kind, NodeKind::Template { .. }));
    if let Some(m) = marker {
        arena.detach(m);
    }
}

/// Parses `Base<arg, arg>` out of a type node's raw token spelling.
/// Returns the comma-split argument texts plus the full matched text.
fn match_instantiation(arena: &Arena, ty: NodeId, base_name: &str) -> Option<(Vec<String>, String)> {
    let tokens = match &arena.get(ty).kind {
        NodeKind::Type { tokens, .. } => tokens,
        _ => return None,
    };
    let text = crate::util::collapse_tokens_to_string(tokens);
    let prefix = format!("{base_name}<");
    let start = text.find(&prefix)?;
    let rest = &text[start + prefix.len()..];
    let end = rest.find('>')?;
    let inner = &rest[..end];
    let args: Vec<String> = inner.split(',').map(|s| s.trim().to_string()).collect();
    Some((args, text))
}

fn substitute_params(arena: &mut Arena, node: NodeId, params: &[String], args: &[String]) {
    let children = arena.get(node).children.clone();
    for c in children {
        substitute_params(arena, c, params, args);
    }
    if let NodeKind::Type { tokens, .. } = &mut arena.get_mut(node).kind {
        for tok in tokens.iter_mut() {
            if let Some(idx) = params.iter().position(|p| p == &tok.text) {
                if let Some(arg) = args.get(idx) {
                    tok.text = arg.clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hast::StructKind;
    use tokens::{Token, TokenKind};

    fn pointer_field(arena: &mut Arena, name: &str, base_ty_text: &str) -> NodeId {
        let ty = arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(TokenKind::Thing, base_ty_text, 1, 0), Token::new(TokenKind::Asterisk, "*", 1, 0)],
            was_reference: false,
            non_nullable: false,
        });
        arena.alloc(NodeKind::FieldDeclaration {
            names: vec![hast::FieldName { name: name.to_string(), array_bound: None, bitfield_width: None }],
            ty,
            accessibility: hast::Accessibility::Public,
            is_static: false,
        })
    }

    #[test]
    fn each_distinct_instantiation_gets_a_concrete_clone_and_template_is_removed() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let tmpl = arena.alloc(NodeKind::ClassStructUnion { name: Some("ImVector".to_string()), kind: StructKind::Struct, base: None });
        let marker = arena.alloc(NodeKind::Template { params: vec!["T".to_string()] });
        let data_field = pointer_field(&mut arena, "Data", "T");
        arena.append_child(tmpl, marker);
        arena.append_child(tmpl, data_field);
        arena.append_child(root, tmpl);

        let use_ty = arena.alloc(NodeKind::Type { tokens: vec![crate::util::make_token("ImVector<int>")], was_reference: false, non_nullable: false });
        let use_field = arena.alloc(NodeKind::FieldDeclaration {
            names: vec![hast::FieldName { name: "Items".to_string(), array_bound: None, bitfield_width: None }],
            ty: use_ty,
            accessibility: hast::Accessibility::Public,
            is_static: false,
        });
        let user_struct = arena.alloc(NodeKind::ClassStructUnion { name: Some("Holder".to_string()), kind: StructKind::Struct, base: None });
        arena.append_child(user_struct, use_field);
        arena.append_child(root, user_struct);

        flatten_templates(&mut arena, root);

        // No Template node survives (property P5).
        let remaining_templates = hast::find_all(&arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Template { .. }));
        assert!(remaining_templates.is_empty());

        // The use-site type was rewritten to the mangled instantiation name.
        match &arena.get(use_ty).kind {
            NodeKind::Type { tokens, .. } => assert_eq!(tokens[0].text, "ImVector_int"),
            _ => unreachable!(),
        }

        // A concrete ImVector_int struct now exists with its field substituted.
        let structs = crate::util::find_all_structs(&arena, root);
        let inst = structs
            .iter()
            .find(|&&s| matches!(&arena.get(s).kind, NodeKind::ClassStructUnion { name: Some(n), .. } if n == "ImVector_int"))
            .copied()
            .expect("instantiation struct present");
        let inst_field = arena
            .get(inst)
            .children
            .iter()
            .copied()
            .find(|&c| matches!(arena.get(c).kind, NodeKind::FieldDeclaration { .. }))
            .expect("field present");
        match &arena.get(inst_field).kind {
            NodeKind::FieldDeclaration { ty, .. } => match &arena.get(*ty).kind {
                NodeKind::Type { tokens, .. } => {
                    assert_eq!(tokens[0].text, "int");
                    assert_eq!(tokens[1].text, "*");
                }
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }
}
