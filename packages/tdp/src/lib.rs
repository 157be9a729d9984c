//! A small, self-contained parser for C declarators ("type descriptions"):
//! `const char*`, `int (*)(float, void*)`, `ImVec2 pos[4]`, and so on.
//!
//! This is independent of the header lexer/parser - it works directly on a
//! declarator substring (a field's type text, a cast target, a function's
//! return type) and produces a small tree suitable for embedding in
//! generated metadata. See the generator's type-description fields for why
//! this exists alongside the main HAST `Type` node: the HAST only needs to
//! carry the original token text around faithfully, but downstream
//! consumers of the metadata need a structured breakdown of it.

mod parser;
mod render;
mod tokenizer;
mod tree;

pub use parser::parse;
pub use render::render;
pub use tree::{Builtin, Storage, TypeTree};
