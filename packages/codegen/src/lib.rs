//! Turns a fully transformed HAST into the three output artifacts spec
//! §4.3-§4.5 describe: a pretty-printed C header, a C++ thunk-body source
//! file, and a JSON metadata document.

pub mod config;
pub mod metadata;
mod text;
mod thunk;
mod writer;

pub use config::EmitConfig;
pub use metadata::{collect_metadata, Metadata};
pub use thunk::write_thunks;
pub use writer::write_header;
