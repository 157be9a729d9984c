use std::path::Path;

use cu::pre::*;

mod paths;
pub use paths::*;

/// Top level `-C/--config` TOML file: where to find the input headers and
/// how to shape the generated output. Anything irregular enough to need a
/// table (suffix remaps, rename lists, exclusion lists) lives in
/// `[pipeline]`, re-exported as `hdrbind_modifiers::PipelineConfig`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub pipeline: modifiers::PipelineConfig,
}

impl Config {
    /// Load config from a file, resolving every relative path against the
    /// directory the config file itself lives in.
    pub fn load(path: impl AsRef<Path>) -> cu::Result<Self> {
        let path = path.as_ref();
        let file_content = cu::fs::read_string(path)?;
        let mut config = toml::parse::<Config>(&file_content)?;

        let base = path.parent_abs()?;
        config.paths.resolve_paths(&base)?;

        cu::ensure!(!config.paths.inputs.is_empty(), "config.paths.inputs must be non-empty")?;

        Ok(config)
    }
}
