use tokens::Token;

use crate::NodeId;

/// One node of the header AST.
///
/// The fields on this struct are the ones every variant shares (spec §3.1);
/// variant-specific data (arguments, else-branches, the type child, ...)
/// lives in [`NodeKind`] itself.
#[derive(Debug, Clone)]
pub struct Node {
    /// Navigation-only back reference. Never used for ownership: only
    /// membership in a child list (primary, preceding-comments, etc.) owns a
    /// node (design note, §9).
    pub parent: Option<NodeId>,
    /// Ordered primary children.
    pub children: Vec<NodeId>,
    /// Comments collected before this node (block or line, blank-line runs
    /// reset attachment - spec §4.1).
    pub preceding_comments: Vec<NodeId>,
    /// A single trailing line-comment on the same source line, if any.
    pub attached_comment: Option<NodeId>,
    /// Verbatim tokens for round-tripping fragments the parser didn't decode
    /// structurally (mostly populated on `UnparsableThing` and `Type`).
    pub raw_tokens: Vec<Token>,
    /// Shadow-tree counterpart captured before any modifier ran (spec §3.5).
    pub twin: Option<NodeId>,
    /// Overrides how the "original" (pre-rewrite) name is rendered when
    /// re-emitting the C++ side, e.g. after a rename pass.
    pub name_override: Option<String>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            preceding_comments: Vec::new(),
            attached_comment: None,
            raw_tokens: Vec::new(),
            twin: None,
            name_override: None,
            kind,
        }
    }

    /// The node's own name, if it has one, ignoring `name_override`. Used by
    /// passes that need the *current* (possibly already-rewritten) name.
    pub fn own_name(&self) -> Option<&str> {
        self.kind.own_name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    Class,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    If,
    Ifdef,
    Ifndef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionRole {
    Free,
    Method,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, Default)]
pub struct OriginalClassRef {
    /// Name of the class/struct the function was lifted out of.
    pub class_name: String,
    /// Whether the method was declared `const`.
    pub was_const: bool,
}

/// One name in a field declaration that named multiple fields
/// (`int a, b[4];` declares `a` and `b`).
#[derive(Debug, Clone)]
pub struct FieldName {
    pub name: String,
    pub array_bound: Option<u64>,
    pub bitfield_width: Option<u32>,
}

/// The closed set of HAST node kinds (spec §3.2).
#[derive(Debug, Clone)]
pub enum NodeKind {
    HeaderFileSet,
    HeaderFile {
        filename: String,
    },
    Namespace {
        name: String,
    },
    ClassStructUnion {
        name: Option<String>,
        kind: StructKind,
        is_forward_declaration: bool,
        has_forward_declaration: bool,
        by_value: bool,
        /// Keep the unmodified (non-`_t`-suffixed) tag name on emission, used
        /// for foreign opaque handle types (spec §4.3).
        keep_unmodified_name: bool,
        /// Single base class, spliced to the front of the field list by the
        /// inheritance-flattening pass.
        base: Option<String>,
    },
    Enum {
        name: Option<String>,
        is_flags_enum: bool,
    },
    EnumElement {
        name: String,
        value_expr: Vec<Token>,
        computed_value: Option<i64>,
        is_count: bool,
        is_internal: bool,
    },
    Typedef {
        name: String,
        target: NodeId,
    },
    FieldDeclaration {
        names: Vec<FieldName>,
        ty: NodeId,
        accessibility: Accessibility,
        /// `static`/`extern`/`constexpr` data member; such fields have no
        /// home in a C struct and are dropped by a structural-normalisation
        /// pass (spec §4.2) rather than emitted.
        is_static: bool,
    },
    FunctionDeclaration {
        name: String,
        return_type: NodeId,
        arguments: Vec<NodeId>,
        role: FunctionRole,
        is_static: bool,
        is_const_method: bool,
        has_body: bool,
        original_class: Option<OriginalClassRef>,
        export_macro: Option<String>,
        format_arg_index: Option<usize>,
        is_variadic: bool,
        is_default_argument_helper: bool,
        is_manual_helper: bool,
        is_imstr_helper: bool,
        is_unformatted_helper: bool,
    },
    FunctionArgument {
        name: Option<String>,
        ty: NodeId,
        default_value: Option<Vec<Token>>,
        is_implicit_default: bool,
        stub_call_value: Option<String>,
    },
    FunctionPointerType {
        name: Option<String>,
        return_type: NodeId,
        arguments: Vec<NodeId>,
    },
    /// A sequence of type-forming tokens (`const char *`, `int`, ...).
    Type {
        tokens: Vec<Token>,
        /// Set by reference-to-pointer conversion (spec §4.2); the writer
        /// re-renders such pointers as `&` in metadata's second declaration
        /// string and the thunk dereferences on the way back to C++.
        was_reference: bool,
        /// Set when the pointer is known non-null (by-value-to-pointer
        /// conversion, `self`, ...); renders as `^` in metadata.
        non_nullable: bool,
    },
    Template {
        params: Vec<String>,
    },
    ExternC {
        has_cplusplus_guard: bool,
    },
    CodeBlock,
    Define {
        name: String,
        params: Option<Vec<String>>,
        value: String,
        exclude_from_metadata: bool,
    },
    Undef {
        name: String,
    },
    Include {
        path: String,
        is_system: bool,
    },
    Pragma {
        text: String,
    },
    ErrorDirective {
        text: String,
    },
    Conditional {
        kind: ConditionalKind,
        expression: String,
        else_children: Vec<NodeId>,
        is_elif_converted: bool,
    },
    BlankLines {
        count: u32,
    },
    LineComment {
        text: String,
    },
    BlockComment {
        text: String,
    },
    UnparsableThing {
        text: String,
    },
}

impl NodeKind {
    pub fn own_name(&self) -> Option<&str> {
        match self {
            NodeKind::Namespace { name } => Some(name),
            NodeKind::ClassStructUnion { name, .. } => name.as_deref(),
            NodeKind::Enum { name, .. } => name.as_deref(),
            NodeKind::EnumElement { name, .. } => Some(name),
            NodeKind::Typedef { name, .. } => Some(name),
            NodeKind::FunctionDeclaration { name, .. } => Some(name),
            NodeKind::FunctionArgument { name, .. } => name.as_deref(),
            NodeKind::FunctionPointerType { name, .. } => name.as_deref(),
            NodeKind::Define { name, .. } => Some(name),
            NodeKind::Undef { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, NodeKind::Conditional { .. })
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, NodeKind::LineComment { .. } | NodeKind::BlockComment { .. })
    }
}
