//! The fixed-order pipeline of HAST-rewriting passes that turns a parsed
//! header into the shape the C/C++/JSON emitters expect (spec §4.2, §6.4).

pub mod config;
mod cosmetic;
mod default_args;
mod disambiguate;
mod flatten_inheritance;
mod flatten_members;
mod flatten_namespace;
mod flatten_template;
mod forward_decl;
mod helpers;
mod includes;
mod pipeline;
mod references;
mod remove;
mod rename;
mod structural;
mod unformatted;
pub mod util;

pub use config::PipelineConfig;
pub use pipeline::run_pipeline;
