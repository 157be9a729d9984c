use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

/// One `rename_by_signature` rule (spec §4.2).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenameBySignatureRule {
    pub function_name: String,
    pub argument_name: String,
    pub new_name: String,
}

/// Everything the pipeline's individual passes need beyond the HAST itself:
/// the CLI feature switches from spec §6.1, plus the table-valued data
/// (name suffix remaps, by-value struct lists, rename tables, exclusion
/// lists) that's too irregular to be a flag and instead comes from the
/// driver's TOML config (SPEC_FULL "Configuration").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PipelineConfig {
    /// `--nopassingstructsbyvalue`: convert by-value struct arguments to
    /// pointer-to-struct (spec §4.2 "Reference/pointer conversions").
    pub convert_by_value_args_to_pointers: bool,
    /// Disabled by `--nogeneratedefaultargfunctions`.
    pub generate_default_argument_functions: bool,
    /// `--generateunformattedfunctions`.
    pub generate_unformatted_functions: bool,
    /// `--backend`: treat the input as a backend header (changes include
    /// rewriting and the implicit imconfig location upstream; here it only
    /// changes which include set `mod_change_includes` installs).
    pub backend: bool,
    /// `--custom-namespace-prefix`, falls back to `<Namespace>_` per
    /// namespace when absent.
    pub custom_namespace_prefix: Option<String>,
    /// Per-namespace prefix overrides, keyed by the namespace's own name;
    /// takes priority over `custom_namespace_prefix`.
    pub namespace_prefix_overrides: BTreeMap<String, String>,

    /// §4.2 step 3: full type string -> suffix, e.g. `"const char*": "Str"`.
    pub name_suffix_remap: BTreeMap<String, String>,
    /// Names the disambiguator must leave untouched even if they collide.
    pub disambiguation_exclude: BTreeSet<String>,
    /// Names the default-argument pass must skip.
    pub default_argument_exclude: BTreeSet<String>,
    /// Class names whose member functions `mod_flatten_class_functions`
    /// must leave in place (SPEC_FULL "Per-name exclusion lists").
    pub member_flatten_exclude_classes: BTreeSet<String>,

    /// Struct names flagged by-value (constructed/returned by value across
    /// the boundary, with `ConvertToCPP_`/`ConvertFromCPP_` helpers).
    pub by_value_structs: BTreeSet<String>,
    /// Struct names that keep their unmodified tag name in C (foreign
    /// opaque handles: `ID3D11Device`, `HWND`, ...).
    pub keep_unmodified_name_structs: BTreeSet<String>,
    /// Struct names whose constructor should use placement-new style
    /// (`IM_PLACEMENT_NEW(self) C(args)`) rather than heap allocation.
    pub placement_constructor_structs: BTreeSet<String>,
    /// Struct names rendered as a single-line typedef (small generated
    /// template instantiations).
    pub single_line_structs: BTreeSet<String>,

    /// `--replace-prefix OLD=NEW`, repeatable; applied to define names and,
    /// separately, to every other named declaration (functions, structs,
    /// enums, typedefs) - spec §4.2 "rename entire prefix".
    pub replace_prefixes: Vec<(String, String)>,
    /// Specific define renames (`IMGUI_API` -> caller's export macro).
    pub rename_defines: BTreeMap<String, String>,
    /// §4.2 "rename by signature": a function keeps its flattened name
    /// unless it has an argument with the given name, in which case it's
    /// renamed. Used to hand-disambiguate overloads that only differ by an
    /// argument's name rather than its type.
    pub rename_by_signature: Vec<RenameBySignatureRule>,
    /// §4.2 "rewrite the nearest enclosing preprocessor conditional around
    /// a specific function to a new expression", keyed by function name.
    pub rewrite_function_conditionals: BTreeMap<String, String>,
    /// `mod_make_all_functions_use_imgui_api`: export-macro token stamped
    /// on every generated free function.
    pub api_export_macro: Option<String>,
    /// `mod_add_function_comment`: function name -> extra trailing note
    /// appended to its preceding comments.
    pub function_comments: BTreeMap<String, String>,

    /// `mod_remove_structs`/`mod_remove_functions` by name, applied before
    /// the rest of the pipeline runs.
    pub remove_structs: BTreeSet<String>,
    pub remove_functions: BTreeSet<String>,

    /// Extra `#include`s to add, and include paths to drop, during the
    /// include-rewrite pass.
    pub added_includes: Vec<String>,
    pub removed_includes: BTreeSet<String>,

    /// varargs-calling-convention suffix overrides, keyed by the
    /// non-varargs function's original name (`appendf` -> `appendfv`);
    /// consumed by the thunk generator, not a HAST pass, but configured
    /// alongside the rest of the irregular per-function tables.
    pub varargs_suffix_overrides: BTreeMap<String, String>,
}

impl PipelineConfig {
    /// Resolve the prefix a namespace's members get flattened under:
    /// per-namespace override, else the global custom prefix template with
    /// the namespace name substituted, else `"<Name>_"`.
    pub fn namespace_prefix(&self, namespace_name: &str) -> String {
        if let Some(p) = self.namespace_prefix_overrides.get(namespace_name) {
            return p.clone();
        }
        if let Some(template) = &self.custom_namespace_prefix {
            if template.contains("%s") {
                return template.replace("%s", namespace_name);
            }
            return template.clone();
        }
        format!("{namespace_name}_")
    }
}
