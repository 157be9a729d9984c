use hast::{Arena, NodeId, NodeKind};
use tokens::TokenKind;

use crate::config::PipelineConfig;

/// Two related conversions C needs that C++ doesn't (spec §4.2
/// "Reference/pointer conversions"):
///
/// - every `T&` argument/return becomes `T*` with `was_reference: true`, so
///   the writer still emits `&` in the second (original-signature) form
///   while the first form and the thunk both see a pointer;
/// - when `convert_by_value_args_to_pointers` is set, a by-value struct
///   argument becomes `const T*` (`non_nullable: true`), with the thunk
///   dereferencing it back to a value on the call-through.
pub fn convert_references_to_pointers(arena: &mut Arena, root: NodeId) {
    let types = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::Type { .. }));
    for ty in types {
        if let NodeKind::Type { tokens, was_reference, non_nullable } = &mut arena.get_mut(ty).kind {
            if tokens.last().map(|t| t.kind) == Some(TokenKind::Ampersand) {
                let last = tokens.last_mut().unwrap();
                last.kind = TokenKind::Asterisk;
                last.text = "*".to_string();
                *was_reference = true;
                *non_nullable = true;
            }
        }
    }
}

pub fn convert_by_value_structs_to_pointers(arena: &mut Arena, root: NodeId, config: &PipelineConfig) {
    if !config.convert_by_value_args_to_pointers {
        return;
    }
    let args = hast::find_all(arena, root, |a, id| matches!(a.get(id).kind, NodeKind::FunctionArgument { .. }));
    for arg in args {
        let ty = match &arena.get(arg).kind {
            NodeKind::FunctionArgument { ty, .. } => *ty,
            _ => continue,
        };
        if !is_by_value_struct_type(arena, ty, config) {
            continue;
        }
        if let NodeKind::Type { tokens, non_nullable, .. } = &mut arena.get_mut(ty).kind {
            tokens.push(crate::util::make_token("*"));
            *non_nullable = true;
        }
    }
}

fn is_by_value_struct_type(arena: &Arena, ty: NodeId, config: &PipelineConfig) -> bool {
    match &arena.get(ty).kind {
        NodeKind::Type { tokens, .. } => tokens
            .last()
            .map(|t| config.by_value_structs.contains(&t.text))
            .unwrap_or(false)
            && tokens.iter().all(|t| t.kind != TokenKind::Asterisk),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokens::Token;

    #[test]
    fn trailing_ampersand_becomes_non_nullable_pointer() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let ty = arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(TokenKind::Thing, "ImVec2", 1, 0), Token::new(TokenKind::Ampersand, "&", 1, 0)],
            was_reference: false,
            non_nullable: false,
        });
        arena.append_child(root, ty);

        convert_references_to_pointers(&mut arena, root);

        match &arena.get(ty).kind {
            NodeKind::Type { tokens, was_reference, non_nullable } => {
                assert!(*was_reference);
                assert!(*non_nullable);
                assert_eq!(tokens.last().unwrap().kind, TokenKind::Asterisk);
                assert_eq!(tokens.last().unwrap().text, "*");
            }
            other => panic!("expected Type, got {other:?}"),
        }
    }

    #[test]
    fn by_value_struct_argument_is_converted_to_pointer_when_enabled() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let ty = arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(TokenKind::Thing, "ImVec2", 1, 0)],
            was_reference: false,
            non_nullable: false,
        });
        let arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("v".into()),
            ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        arena.append_child(root, arg);

        let mut config = PipelineConfig::default();
        config.convert_by_value_args_to_pointers = true;
        config.by_value_structs.insert("ImVec2".to_string());
        convert_by_value_structs_to_pointers(&mut arena, root, &config);

        match &arena.get(ty).kind {
            NodeKind::Type { tokens, non_nullable, .. } => {
                assert!(*non_nullable);
                assert_eq!(tokens.last().unwrap().text, "*");
            }
            other => panic!("expected Type, got {other:?}"),
        }
    }

    #[test]
    fn by_value_conversion_is_a_no_op_when_disabled() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let ty = arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(TokenKind::Thing, "ImVec2", 1, 0)],
            was_reference: false,
            non_nullable: false,
        });
        let arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("v".into()),
            ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        arena.append_child(root, arg);

        let mut config = PipelineConfig::default();
        config.by_value_structs.insert("ImVec2".to_string());
        convert_by_value_structs_to_pointers(&mut arena, root, &config);

        match &arena.get(ty).kind {
            NodeKind::Type { tokens, .. } => assert_eq!(tokens.len(), 1),
            other => panic!("expected Type, got {other:?}"),
        }
    }
}
