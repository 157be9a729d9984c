//! Recursive-descent parser that turns a tokenized header into a header AST
//! (HAST) arena. Builds exactly the subset of C++ declarations the modifier
//! pipeline knows how to flatten to C; anything else becomes an
//! `UnparsableThing` and parsing continues past it rather than aborting.

mod decl_spec;
mod dispatch;
mod functions;
mod parser;
mod preprocessor;
mod scope;
mod struct_enum;

pub use hast::{Arena, NodeId};
pub use parser::{parse, parse_additional, Parser};
pub use scope::Scope;

#[cfg(test)]
mod tests {
    use super::*;
    use hast::NodeKind;

    fn root_file_children(src: &str) -> (Arena, Vec<NodeId>) {
        let (arena, root) = parse(src, "test.h").unwrap();
        let file = arena.get(root).children[0];
        let children = arena.get(file).children.clone();
        (arena, children)
    }

    #[test]
    fn parses_simple_struct_with_fields() {
        let (arena, children) = root_file_children("struct Foo {\n    int a;\n    float b;\n};\n");
        assert_eq!(children.len(), 1);
        let node = arena.get(children[0]);
        match &node.kind {
            NodeKind::ClassStructUnion { name, kind, .. } => {
                assert_eq!(name.as_deref(), Some("Foo"));
                assert_eq!(*kind, hast::StructKind::Struct);
            }
            other => panic!("expected ClassStructUnion, got {other:?}"),
        }
        assert_eq!(node.children.len(), 2);
        match &arena.get(node.children[0]).kind {
            NodeKind::FieldDeclaration { names, .. } => assert_eq!(names[0].name, "a"),
            other => panic!("expected FieldDeclaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_enum_with_values() {
        let (arena, children) =
            root_file_children("enum Color {\n    Color_Red = 0,\n    Color_Green,\n    Color_COUNT\n};\n");
        let node = arena.get(children[0]);
        match &node.kind {
            NodeKind::Enum { name, .. } => assert_eq!(name.as_deref(), Some("Color")),
            other => panic!("expected Enum, got {other:?}"),
        }
        assert_eq!(node.children.len(), 3);
        match &arena.get(node.children[2]).kind {
            NodeKind::EnumElement { name, is_count, .. } => {
                assert_eq!(name, "Color_COUNT");
                assert!(is_count);
            }
            other => panic!("expected EnumElement, got {other:?}"),
        }
    }

    #[test]
    fn parses_namespace_with_nested_function() {
        let (arena, children) = root_file_children("namespace ImGui {\n    void Foo(int x);\n}\n");
        let ns = arena.get(children[0]);
        match &ns.kind {
            NodeKind::Namespace { name } => assert_eq!(name, "ImGui"),
            other => panic!("expected Namespace, got {other:?}"),
        }
        assert_eq!(ns.children.len(), 1);
        match &arena.get(ns.children[0]).kind {
            NodeKind::FunctionDeclaration { name, arguments, .. } => {
                assert_eq!(name, "Foo");
                assert_eq!(arguments.len(), 1);
            }
            other => panic!("expected FunctionDeclaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_preprocessor_conditional_with_else() {
        let (arena, children) =
            root_file_children("#ifdef FOO\nvoid A();\n#else\nvoid B();\n#endif\n");
        let cond = arena.get(children[0]);
        match &cond.kind {
            NodeKind::Conditional { kind, expression, else_children, .. } => {
                assert_eq!(*kind, hast::ConditionalKind::Ifdef);
                assert_eq!(expression, "FOO");
                assert_eq!(else_children.len(), 1);
            }
            other => panic!("expected Conditional, got {other:?}"),
        }
        assert_eq!(cond.children.len(), 1);
    }

    #[test]
    fn default_argument_is_captured_on_the_argument_node() {
        let (arena, children) = root_file_children("void Foo(int flags = 0);\n");
        match &arena.get(children[0]).kind {
            NodeKind::FunctionDeclaration { arguments, .. } => {
                match &arena.get(arguments[0]).kind {
                    NodeKind::FunctionArgument { name, default_value, .. } => {
                        assert_eq!(name.as_deref(), Some("flags"));
                        assert!(default_value.is_some());
                    }
                    other => panic!("expected FunctionArgument, got {other:?}"),
                }
            }
            other => panic!("expected FunctionDeclaration, got {other:?}"),
        }
    }

    #[test]
    fn line_comment_attaches_to_following_declaration() {
        let (arena, children) = root_file_children("// a comment\nint x;\n");
        let node = arena.get(children[0]);
        assert_eq!(node.preceding_comments.len(), 1);
    }

    #[test]
    fn blank_line_run_becomes_its_own_node_but_comment_still_attaches() {
        let (arena, children) = root_file_children("// still attaches\n\n\nint x;\n");
        assert!(children.iter().any(|&c| matches!(arena.get(c).kind, NodeKind::BlankLines { count: 2 })));
        let decl = children
            .iter()
            .find(|&&c| matches!(arena.get(c).kind, NodeKind::FieldDeclaration { .. }))
            .expect("field declaration present");
        assert_eq!(arena.get(*decl).preceding_comments.len(), 1);
    }

    #[test]
    fn function_pointer_field_is_structured() {
        let (arena, children) =
            root_file_children("struct S {\n    int (*cb)(float, void* user);\n};\n");
        let s = arena.get(children[0]);
        match &arena.get(s.children[0]).kind {
            NodeKind::FieldDeclaration { ty, .. } => match &arena.get(*ty).kind {
                NodeKind::FunctionPointerType { name, arguments, .. } => {
                    assert_eq!(name.as_deref(), Some("cb"));
                    assert_eq!(arguments.len(), 2);
                }
                other => panic!("expected FunctionPointerType, got {other:?}"),
            },
            other => panic!("expected FieldDeclaration, got {other:?}"),
        }
    }

    #[test]
    fn fmtargs_annotation_is_captured_as_format_arg_index() {
        let (arena, children) =
            root_file_children("void h(const char* fmt, ...) IM_FMTARGS(1);\n");
        match &arena.get(children[0]).kind {
            NodeKind::FunctionDeclaration { format_arg_index, is_variadic, .. } => {
                assert_eq!(*format_arg_index, Some(0));
                assert!(is_variadic);
            }
            other => panic!("expected FunctionDeclaration, got {other:?}"),
        }
    }

    #[test]
    fn unrecognised_construct_becomes_unparsable_and_parsing_continues() {
        let (arena, children) = root_file_children("= totally not a declaration;\nint x;\n");
        assert!(children.iter().any(|&c| matches!(arena.get(c).kind, NodeKind::UnparsableThing { .. })));
        assert!(children.iter().any(|&c| matches!(arena.get(c).kind, NodeKind::FieldDeclaration { .. })));
    }
}
