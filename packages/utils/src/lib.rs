//! Shared configuration types for the CLI driver (spec §6.1,
//! SPEC_FULL "Configuration").

mod config;
pub use config::*;
