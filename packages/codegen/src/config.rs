use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

/// Everything the emitters need that isn't already baked into the HAST by
/// the modifier pipeline (spec §4.3-§4.6). Deliberately smaller than
/// `hdrbind_modifiers::PipelineConfig` - the driver constructs one of these
/// from the same TOML document rather than this crate depending on the
/// modifiers package directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EmitConfig {
    /// Struct names whose by-value conversion the thunk must cast through
    /// `ConvertToCPP_X`/`ConvertFromCPP_X` helpers rather than a bare
    /// `reinterpret_cast` (spec §4.4).
    pub by_value_structs: BTreeSet<String>,
    /// Struct names whose constructor thunk uses placement-new against a
    /// caller-supplied buffer rather than heap `new`.
    pub placement_constructor_structs: BTreeSet<String>,
    /// Extra verbatim `#include` lines for the generated header.
    pub extra_includes: Vec<String>,
    /// The real library's own public header, `#include`d by the generated
    /// C header so opaque forward-declared types still resolve for C++
    /// callers building the thunk file.
    pub library_header: Option<String>,
    /// Backend-specific header, included only when `backend` is set.
    pub backend_header: Option<String>,
    pub backend: bool,
    /// Caller's `imconfig`-equivalent override header.
    pub config_header: Option<String>,
    pub emit_combined_json_metadata: bool,
    /// varargs-calling-convention suffix overrides, keyed by the
    /// non-varargs function's original name (`appendf` -> `appendfv`); see
    /// the thunk generator's varargs handling (spec §4.4 step 4).
    pub varargs_suffix_overrides: BTreeMap<String, String>,
}
