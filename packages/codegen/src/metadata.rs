use cu::pre::*;
use hast::{Arena, ConditionalKind, NodeId, NodeKind};

use crate::text::{collapse_tokens_to_string, original_name, render_type};

/// One `{condition, expression}` entry in a node's preprocessor-conditional
/// list (spec §4.5). `condition` folds the enclosing conditional's kind
/// together with which branch the node sits in: an `#ifdef`'s `#else`
/// branch reads the same as a plain `#ifndef`, and a plain `#if`'s `#else`
/// branch has no positive spelling, so it gets the synthetic `ifnot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConditional {
    pub condition: String,
    pub expression: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetaComment {
    pub text: String,
}

/// A type rendered two ways (spec §4.5): the plain C declaration, and a
/// second form with non-nullable pointers spelled `^` and converted
/// references spelled `&`, plus the TDP breakdown of that second form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaType {
    pub declaration: String,
    pub declaration_alt: String,
    pub parsed: tdp::TypeTree,
}

fn meta_type(arena: &Arena, ty: NodeId) -> MetaType {
    let declaration_alt = render_type(arena, ty);
    let declaration = match &arena.get(ty).kind {
        NodeKind::Type { tokens, .. } => collapse_tokens_to_string(tokens),
        _ => declaration_alt.clone(),
    };
    let parsed = tdp::parse(&declaration_alt);
    MetaType { declaration, declaration_alt, parsed }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaDefine {
    pub name: String,
    pub params: Option<Vec<String>>,
    pub value: String,
    pub original_fully_qualified_name: String,
    pub comments: Vec<MetaComment>,
    pub conditionals: Vec<MetaConditional>,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaEnumElement {
    pub name: String,
    pub value: Option<i64>,
    pub is_count: bool,
    pub is_internal: bool,
    pub comments: Vec<MetaComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaEnum {
    pub name: String,
    pub is_flags_enum: bool,
    pub elements: Vec<MetaEnumElement>,
    pub original_fully_qualified_name: String,
    pub comments: Vec<MetaComment>,
    pub conditionals: Vec<MetaConditional>,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaTypedef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: MetaType,
    pub original_fully_qualified_name: String,
    pub comments: Vec<MetaComment>,
    pub conditionals: Vec<MetaConditional>,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaField {
    pub name: String,
    pub array_bound: Option<u64>,
    pub bitfield_width: Option<u32>,
    #[serde(rename = "type")]
    pub ty: MetaType,
    pub comments: Vec<MetaComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaStruct {
    pub name: String,
    pub is_union: bool,
    pub fields: Vec<MetaField>,
    pub original_fully_qualified_name: String,
    pub comments: Vec<MetaComment>,
    pub conditionals: Vec<MetaConditional>,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaArgument {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: MetaType,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFunction {
    pub name: String,
    pub return_type: MetaType,
    pub arguments: Vec<MetaArgument>,
    pub is_variadic: bool,
    pub is_static: bool,
    pub is_default_argument_helper: bool,
    pub is_manual_helper: bool,
    pub is_imstr_helper: bool,
    pub has_imstr_helper: bool,
    pub is_unformatted_helper: bool,
    pub original_class: Option<String>,
    pub original_fully_qualified_name: String,
    pub comments: Vec<MetaComment>,
    pub conditionals: Vec<MetaConditional>,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metadata {
    pub defines: Vec<MetaDefine>,
    pub enums: Vec<MetaEnum>,
    pub typedefs: Vec<MetaTypedef>,
    pub structs: Vec<MetaStruct>,
    pub functions: Vec<MetaFunction>,
}

/// Walks the transformed tree rooted at `header_file` and builds the JSON
/// metadata document spec §4.5 describes. `source_name` is the file name
/// recorded against every node whose own token stream doesn't carry one
/// (everything but `UnparsableThing`/`Type`, in practice, since this is a
/// single-header-at-a-time generator and line numbers are all that vary).
pub fn collect_metadata(arena: &Arena, header_file: NodeId, source_name: &str) -> Metadata {
    let mut meta = Metadata::default();
    walk(arena, header_file, source_name, &mut meta);
    elide_superseded_forward_declarations(&mut meta);
    meta
}

fn walk(arena: &Arena, node: NodeId, source_name: &str, meta: &mut Metadata) {
    for &child in &arena.get(node).children.clone() {
        match &arena.get(child).kind {
            NodeKind::Define { name, params, value, exclude_from_metadata, .. } => {
                if !*exclude_from_metadata {
                    meta.defines.push(MetaDefine {
                        name: name.clone(),
                        params: params.clone(),
                        value: value.clone(),
                        original_fully_qualified_name: original_name(arena, child, name),
                        comments: comments_of(arena, child),
                        conditionals: conditionals_of(arena, child),
                        file: source_name.to_string(),
                        line: first_line(arena, child),
                    });
                }
            }
            NodeKind::Enum { name, is_flags_enum } => {
                let elements = arena
                    .get(child)
                    .children
                    .iter()
                    .filter_map(|&e| match &arena.get(e).kind {
                        NodeKind::EnumElement { name, computed_value, is_count, is_internal, .. } => {
                            Some(MetaEnumElement {
                                name: name.clone(),
                                value: *computed_value,
                                is_count: *is_count,
                                is_internal: *is_internal,
                                comments: comments_of(arena, e),
                            })
                        }
                        _ => None,
                    })
                    .collect();
                let own = name.clone().unwrap_or_default();
                meta.enums.push(MetaEnum {
                    name: own.clone(),
                    is_flags_enum: *is_flags_enum,
                    elements,
                    original_fully_qualified_name: original_name(arena, child, &own),
                    comments: comments_of(arena, child),
                    conditionals: conditionals_of(arena, child),
                    file: source_name.to_string(),
                    line: first_line(arena, child),
                });
            }
            NodeKind::Typedef { name, target } => {
                meta.typedefs.push(MetaTypedef {
                    name: name.clone(),
                    ty: meta_type(arena, *target),
                    original_fully_qualified_name: original_name(arena, child, name),
                    comments: comments_of(arena, child),
                    conditionals: conditionals_of(arena, child),
                    file: source_name.to_string(),
                    line: first_line(arena, child),
                });
            }
            NodeKind::ClassStructUnion { name, kind, is_forward_declaration, .. } => {
                let own = name.clone().unwrap_or_default();
                let fields = if *is_forward_declaration { Vec::new() } else { collect_fields(arena, child) };
                meta.structs.push(MetaStruct {
                    name: own.clone(),
                    is_union: matches!(kind, hast::StructKind::Union),
                    fields,
                    original_fully_qualified_name: original_name(arena, child, &own),
                    comments: comments_of(arena, child),
                    conditionals: conditionals_of(arena, child),
                    file: source_name.to_string(),
                    line: first_line(arena, child),
                });
                // a forward declaration has no member nodes to recurse into,
                // but a definition might have nested preprocessor-gated
                // members, so keep walking either way.
                walk(arena, child, source_name, meta);
            }
            NodeKind::FunctionDeclaration {
                name,
                return_type,
                arguments,
                is_static,
                is_variadic,
                original_class,
                is_default_argument_helper,
                is_manual_helper,
                is_imstr_helper,
                is_unformatted_helper,
                ..
            } => {
                let args: Vec<MetaArgument> = arguments
                    .iter()
                    .filter_map(|&a| match &arena.get(a).kind {
                        NodeKind::FunctionArgument { name, ty, default_value, .. } => Some(MetaArgument {
                            name: name.clone(),
                            ty: meta_type(arena, *ty),
                            default_value: default_value.as_ref().map(|t| collapse_tokens_to_string(t)),
                        }),
                        _ => None,
                    })
                    .collect();
                let has_imstr_helper = args.iter().any(|a| a.ty.declaration.contains("ImStr"));
                meta.functions.push(MetaFunction {
                    name: name.clone(),
                    return_type: meta_type(arena, *return_type),
                    arguments: args,
                    is_variadic: *is_variadic,
                    is_static: *is_static,
                    is_default_argument_helper: *is_default_argument_helper,
                    is_manual_helper: *is_manual_helper,
                    is_imstr_helper: *is_imstr_helper,
                    has_imstr_helper,
                    is_unformatted_helper: *is_unformatted_helper,
                    original_class: original_class.as_ref().map(|c| c.class_name.clone()),
                    original_fully_qualified_name: original_name(arena, child, name),
                    comments: comments_of(arena, child),
                    conditionals: conditionals_of(arena, child),
                    file: source_name.to_string(),
                    line: first_line(arena, child),
                });
            }
            NodeKind::Conditional { .. } => walk(arena, child, source_name, meta),
            _ => {}
        }
    }
}

/// Field list for a struct: recurses into preprocessor containers (a
/// member can be `#ifdef`-gated) and treats an anonymous nested struct as
/// an implicit field named after the struct itself, since C has no
/// anonymous-struct-member concept to fall back on here (spec §4.5).
fn collect_fields(arena: &Arena, s: NodeId) -> Vec<MetaField> {
    let mut out = Vec::new();
    collect_fields_into(arena, s, &mut out);
    out
}

fn collect_fields_into(arena: &Arena, node: NodeId, out: &mut Vec<MetaField>) {
    for &child in &arena.get(node).children.clone() {
        match &arena.get(child).kind {
            NodeKind::FieldDeclaration { names, ty, is_static, .. } => {
                if *is_static {
                    continue;
                }
                let ty_meta = meta_type(arena, *ty);
                for fname in names {
                    out.push(MetaField {
                        name: fname.name.clone(),
                        array_bound: fname.array_bound,
                        bitfield_width: fname.bitfield_width,
                        ty: ty_meta.clone(),
                        comments: comments_of(arena, child),
                    });
                }
            }
            NodeKind::ClassStructUnion { name: None, .. } => {
                out.push(MetaField {
                    name: anonymous_member_name(arena, child),
                    array_bound: None,
                    bitfield_width: None,
                    ty: MetaType {
                        declaration: "struct".to_string(),
                        declaration_alt: "struct".to_string(),
                        parsed: tdp::TypeTree::user("struct"),
                    },
                    comments: comments_of(arena, child),
                });
            }
            NodeKind::Conditional { .. } => collect_fields_into(arena, child, out),
            _ => {}
        }
    }
}

fn anonymous_member_name(arena: &Arena, s: NodeId) -> String {
    arena
        .get(s)
        .twin
        .and_then(|t| arena.get(t).own_name().map(|n| n.to_string()))
        .unwrap_or_else(|| "anon".to_string())
}

fn comments_of(arena: &Arena, node: NodeId) -> Vec<MetaComment> {
    let mut out: Vec<MetaComment> = arena
        .get(node)
        .preceding_comments
        .iter()
        .map(|&c| MetaComment { text: comment_text(arena, c) })
        .collect();
    if let Some(a) = arena.get(node).attached_comment {
        out.push(MetaComment { text: comment_text(arena, a) });
    }
    out
}

fn comment_text(arena: &Arena, c: NodeId) -> String {
    match &arena.get(c).kind {
        NodeKind::LineComment { text } | NodeKind::BlockComment { text } => text.clone(),
        _ => String::new(),
    }
}

fn first_line(arena: &Arena, node: NodeId) -> u32 {
    if let Some(t) = arena.get(node).raw_tokens.first() {
        return t.line;
    }
    for &c in &arena.get(node).children {
        let line = first_line(arena, c);
        if line != 0 {
            return line;
        }
    }
    0
}

fn conditionals_of(arena: &Arena, node: NodeId) -> Vec<MetaConditional> {
    hast::conditional_context(arena, node)
        .into_iter()
        .filter(|&(cond, _)| !is_include_guard_or_disable(arena, cond))
        .map(|(cond, branch)| {
            let (kind, expression) = match &arena.get(cond).kind {
                NodeKind::Conditional { kind, expression, .. } => (*kind, expression.clone()),
                _ => unreachable!("conditional_context only yields Conditional nodes"),
            };
            let condition = match (kind, branch) {
                (ConditionalKind::If, hast::Branch::Then) => "if",
                (ConditionalKind::If, hast::Branch::Else) => "ifnot",
                (ConditionalKind::Ifdef, hast::Branch::Then) => "ifdef",
                (ConditionalKind::Ifdef, hast::Branch::Else) => "ifndef",
                (ConditionalKind::Ifndef, hast::Branch::Then) => "ifndef",
                (ConditionalKind::Ifndef, hast::Branch::Else) => "ifdef",
            };
            MetaConditional { condition: condition.to_string(), expression }
        })
        .collect()
}

/// Recognises the classic `#ifndef FOO_H / #define FOO_H` include guard
/// (the conditional is the header's sole top-level child and its body
/// opens with a matching `#define`) and the project's `IMGUI_DISABLE`-style
/// feature-disable guard, both uninteresting as "this symbol is
/// conditional" metadata (spec §4.5).
fn is_include_guard_or_disable(arena: &Arena, cond: NodeId) -> bool {
    let (kind, expression) = match &arena.get(cond).kind {
        NodeKind::Conditional { kind, expression, .. } => (*kind, expression.as_str()),
        _ => return false,
    };
    if expression.ends_with("_DISABLE") {
        return true;
    }
    if kind != ConditionalKind::Ifndef {
        return false;
    }
    let Some(parent) = arena.get(cond).parent else { return false };
    if !matches!(arena.get(parent).kind, NodeKind::HeaderFile { .. }) {
        return false;
    }
    if arena.get(parent).children.first() != Some(&cond) {
        return false;
    }
    arena.get(cond).children.iter().any(|&c| matches!(&arena.get(c).kind, NodeKind::Define { name, .. } if name == expression))
}

/// Spec §4.5: "Forward-declared structs that also have a full definition
/// are elided; bare forward declarations are kept." A struct name with
/// both a forward-declaration entry (empty field list) and a definition
/// entry keeps only the definition.
fn elide_superseded_forward_declarations(meta: &mut Metadata) {
    let defined: std::collections::HashSet<String> =
        meta.structs.iter().filter(|s| !s.fields.is_empty()).map(|s| s.name.clone()).collect();
    meta.structs.retain(|s| !s.fields.is_empty() || !defined.contains(&s.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use hast::{Arena, StructKind};
    use tokens::Token;

    fn ty(arena: &mut Arena, text: &str) -> NodeId {
        arena.alloc(NodeKind::Type {
            tokens: vec![Token::new(tokens::TokenKind::Thing, text, 1, 0)],
            was_reference: false,
            non_nullable: false,
        })
    }

    #[test]
    fn elides_forward_declaration_with_matching_definition() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let fwd = arena.alloc(NodeKind::ClassStructUnion {
            name: Some("Foo".into()),
            kind: StructKind::Struct,
            is_forward_declaration: true,
            has_forward_declaration: false,
            by_value: false,
            keep_unmodified_name: false,
            base: None,
        });
        arena.append_child(file, fwd);
        let def = arena.alloc(NodeKind::ClassStructUnion {
            name: Some("Foo".into()),
            kind: StructKind::Struct,
            is_forward_declaration: false,
            has_forward_declaration: true,
            by_value: false,
            keep_unmodified_name: false,
            base: None,
        });
        let fty = ty(&mut arena, "int");
        let field = arena.alloc(NodeKind::FieldDeclaration {
            names: vec![hast::FieldName { name: "x".into(), array_bound: None, bitfield_width: None }],
            ty: fty,
            accessibility: hast::Accessibility::Public,
            is_static: false,
        });
        arena.append_child(def, field);
        arena.append_child(file, def);
        hast::save_unmodified_twins(&mut arena, root);

        let meta = collect_metadata(&arena, file, "t.h");
        assert_eq!(meta.structs.len(), 1);
        assert_eq!(meta.structs[0].fields.len(), 1);
    }

    #[test]
    fn bare_forward_declaration_with_no_definition_is_kept() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let fwd = arena.alloc(NodeKind::ClassStructUnion {
            name: Some("OpaqueHandle".into()),
            kind: StructKind::Struct,
            is_forward_declaration: true,
            has_forward_declaration: false,
            by_value: false,
            keep_unmodified_name: true,
            base: None,
        });
        arena.append_child(file, fwd);
        hast::save_unmodified_twins(&mut arena, root);

        let meta = collect_metadata(&arena, file, "t.h");
        assert_eq!(meta.structs.len(), 1);
        assert!(meta.structs[0].fields.is_empty());
    }

    #[test]
    fn function_metadata_carries_argument_types_and_flags() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::HeaderFileSet);
        let file = arena.alloc(NodeKind::HeaderFile { filename: "t.h".into() });
        arena.append_child(root, file);
        let ret = ty(&mut arena, "void");
        let arg_ty = ty(&mut arena, "int");
        let arg = arena.alloc(NodeKind::FunctionArgument {
            name: Some("count".into()),
            ty: arg_ty,
            default_value: None,
            is_implicit_default: false,
            stub_call_value: None,
        });
        let f = arena.alloc(NodeKind::FunctionDeclaration {
            name: "Widget_Resize".into(),
            return_type: ret,
            arguments: vec![arg],
            role: hast::FunctionRole::Method,
            is_static: false,
            is_const_method: false,
            has_body: false,
            original_class: Some(hast::OriginalClassRef { class_name: "Widget".into(), was_const: false }),
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

        let meta = collect_metadata(&arena, file, "t.h");
        assert_eq!(meta.functions.len(), 1);
        let func = &meta.functions[0];
        assert_eq!(func.original_class.as_deref(), Some("Widget"));
        assert_eq!(func.arguments.len(), 1);
        assert_eq!(func.arguments[0].name.as_deref(), Some("count"));
        assert_eq!(func.arguments[0].ty.declaration, "int");
    }
}
