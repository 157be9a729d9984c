//! The Header AST (HAST): a typed tree of C/C++ declarations plus
//! preprocessor structure, with attached-comment association,
//! ownership/parent discipline, an "unmodified twin" shadow tree, and a
//! declarative tree-mutation API.
//!
//! See spec §3 for the data model this crate implements.

mod arena;
mod comments;
mod mutate;
mod node;
mod preprocessor;
mod twin;
mod walk;

pub use arena::{Arena, NodeId};
pub use comments::{attach_preceding_comments, attach_trailing_comment};
pub use node::{
    Accessibility, ConditionalKind, FieldName, FunctionRole, Node, NodeKind, OriginalClassRef,
    StructKind,
};
pub use preprocessor::{are_mutually_exclusive, conditional_context, Branch};
pub use twin::{deep_clone, save_unmodified_twins};
pub use walk::{ancestors, find_all, walk, walk_prunable};
