use std::path::{Path, PathBuf};

use cu::pre::*;

/// Path configuration for a single binding-generation run (spec §6.1).
///
/// For all paths, if it's a relative path, it's resolved relative to the
/// directory containing the config file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathsConfig {
    /// Public header(s) to parse, in order. The first entry is treated as
    /// the "main" header whose name seeds the output file stems.
    pub inputs: Vec<PathBuf>,
    /// Extra internal headers (not part of the public API surface) parsed
    /// for type information but excluded from the metadata's declaration
    /// list unless referenced by a public declaration.
    #[serde(default)]
    pub internal_inputs: Vec<PathBuf>,
    /// Output file stem; `<output>.h`, `<output>.cpp`, `<output>.json` are
    /// written alongside it (`--output`).
    pub output: PathBuf,
    /// Directory containing backend-specific template headers, if any
    /// (`--templatedir`).
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    /// Directory the generated header should `#include` the real library's
    /// public header from (`--imgui-include-dir` in spirit; kept generic).
    #[serde(default)]
    pub library_include_dir: Option<PathBuf>,
    /// Backend-specific include directory, added to the generated header's
    /// include list when `pipeline.backend` is set (`--backend-include-dir`).
    #[serde(default)]
    pub backend_include_dir: Option<PathBuf>,
    /// Extra verbatim `#include` lines to splice into the generated header
    /// (`--include`, repeatable).
    #[serde(default)]
    pub extra_includes: Vec<String>,
    /// Path to a project-specific config override header, forwarded into
    /// the generated header as an include (`--imconfig-path`).
    #[serde(default)]
    pub config_header: Option<PathBuf>,
    /// When set, also emit `<output>.combined.json` merging every parsed
    /// header's metadata into one document (`--emit-combined-json-metadata`).
    #[serde(default)]
    pub emit_combined_json_metadata: bool,
}

impl PathsConfig {
    pub fn resolve_paths(&mut self, base: &Path) -> cu::Result<()> {
        for input in self.inputs.iter_mut().chain(self.internal_inputs.iter_mut()) {
            resolve_path(base, input)?;
        }
        resolve_path(base, &mut self.output)?;
        for opt in [&mut self.template_dir, &mut self.library_include_dir, &mut self.backend_include_dir, &mut self.config_header] {
            if let Some(p) = opt {
                resolve_path(base, p)?;
            }
        }
        Ok(())
    }
}

fn resolve_path(base: &Path, path: &mut PathBuf) -> cu::Result<()> {
    if !path.is_absolute() {
        *path = base.join(&path).normalize()?;
    }
    Ok(())
}
