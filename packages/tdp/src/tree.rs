use cu::pre::*;

/// A `const`/`volatile`/`mutable` annotation attached to a single node of a
/// [`TypeTree`]. Several can apply to the same node (`const volatile`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    Const,
    Volatile,
    Mutable,
}

/// The built-in primitive kinds the parser recognizes, after collapsing
/// multi-word spellings (`unsigned long long` -> one kind, not three nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Builtin {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    LongDouble,
}

impl Builtin {
    /// The canonical C spelling, used when rendering a tree back to text.
    pub fn spelling(self) -> &'static str {
        match self {
            Builtin::Void => "void",
            Builtin::Bool => "bool",
            Builtin::Char => "char",
            Builtin::SignedChar => "signed char",
            Builtin::UnsignedChar => "unsigned char",
            Builtin::Short => "short",
            Builtin::UnsignedShort => "unsigned short",
            Builtin::Int => "int",
            Builtin::UnsignedInt => "unsigned int",
            Builtin::Long => "long",
            Builtin::UnsignedLong => "unsigned long",
            Builtin::LongLong => "long long",
            Builtin::UnsignedLongLong => "unsigned long long",
            Builtin::Float => "float",
            Builtin::Double => "double",
            Builtin::LongDouble => "long double",
        }
    }
}

/// A parsed type-description tree, as produced by [`crate::parse`].
///
/// Every variant carries its own `storage` list (the qualifiers that sit
/// textually closest to that particular layer, not the whole declaration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeTree {
    /// A named declarator: `inner` is the type of the thing named `name`.
    Type { name: String, inner: Box<TypeTree> },
    /// A pointer or reference layer.
    Pointer {
        /// `false` for a plain `*`/`&`; also `false` when annotated `^`/non-null.
        #[serde(default = "default_true")]
        nullable: bool,
        /// Whether this layer is a C++ reference (`&`) rather than a pointer (`*`).
        #[serde(default)]
        reference: bool,
        #[serde(default)]
        storage: Vec<Storage>,
        inner: Box<TypeTree>,
    },
    /// A fixed- or unknown-bound array.
    Array {
        bounds: Option<u64>,
        #[serde(default)]
        storage: Vec<Storage>,
        inner: Box<TypeTree>,
    },
    /// A function type: `params` are themselves `TypeTree`s (usually unnamed).
    Function {
        ret: Box<TypeTree>,
        params: Vec<TypeTree>,
    },
    Builtin {
        kind: Builtin,
        #[serde(default)]
        storage: Vec<Storage>,
    },
    /// A reference to a user-defined type (struct/class/enum/typedef) by name.
    User {
        name: String,
        #[serde(default)]
        storage: Vec<Storage>,
    },
}

fn default_true() -> bool {
    true
}

impl TypeTree {
    pub fn builtin(kind: Builtin) -> TypeTree {
        TypeTree::Builtin { kind, storage: Vec::new() }
    }

    pub fn user(name: impl Into<String>) -> TypeTree {
        TypeTree::User { name: name.into(), storage: Vec::new() }
    }

    /// The storage-class list attached to this node, if the variant has one.
    pub fn storage(&self) -> &[Storage] {
        match self {
            TypeTree::Pointer { storage, .. }
            | TypeTree::Array { storage, .. }
            | TypeTree::Builtin { storage, .. }
            | TypeTree::User { storage, .. } => storage,
            TypeTree::Type { .. } | TypeTree::Function { .. } => &[],
        }
    }

    /// Number of pointer/array/function layers, used by the by-value-struct
    /// heuristic (a bare `Builtin`/`User` with no wrapping is "complexity 0").
    pub fn complexity(&self) -> usize {
        match self {
            TypeTree::Type { inner, .. } => inner.complexity(),
            TypeTree::Pointer { inner, .. } | TypeTree::Array { inner, .. } => 1 + inner.complexity(),
            TypeTree::Function { ret, params } => {
                1 + ret.complexity() + params.iter().map(TypeTree::complexity).sum::<usize>()
            }
            TypeTree::Builtin { .. } | TypeTree::User { .. } => 0,
        }
    }
}
