use hast::{Arena, NodeId};

use crate::config::PipelineConfig;

/// Runs every modifier pass in the fixed order spec §6.4 requires. The
/// unmodified twin must already be saved (`hast::save_unmodified_twins`)
/// before calling this - the pipeline only ever mutates the live tree.
///
/// Ordering rationale, matching the original tool's own pass order:
/// structural cleanup and name removal happen first so later passes never
/// have to reason about dead code; namespace/inheritance/template
/// flattening happen before member-function lifting so a method inherited
/// from a flattened base, or belonging to a namespaced class, is already
/// in its final class shape when it's lifted; disambiguation and
/// default-argument generation run after lifting, since lifting is what
/// creates most of the name collisions and default-argument signatures
/// worth stubbing; renaming, include rewriting and cosmetic passes run
/// last because they only touch presentation.
pub fn run_pipeline(arena: &mut Arena, root: NodeId, config: &PipelineConfig) -> cu::Result<()> {
    crate::structural::remove_named_declarations(arena, root, config);
    crate::structural::attach_preceding_comments(arena, root);
    crate::structural::remove_function_bodies(arena, root, config);
    crate::structural::remove_static_fields(arena, root);
    crate::structural::hoist_nested_typedefs(arena, root)?;
    crate::structural::assign_anonymous_names(arena, root);
    crate::structural::compute_enum_values(arena, root);
    crate::structural::mark_flags_and_special_enum_values(arena, root);
    crate::structural::strip_cpp_only_type_tokens(arena, root);
    crate::structural::apply_struct_config_flags(arena, root, config);

    crate::flatten_namespace::flatten_namespaces(arena, root, config);
    crate::flatten_inheritance::flatten_inheritance(arena, root);
    crate::flatten_template::flatten_templates(arena, root);
    crate::flatten_members::flatten_members(arena, root, config);

    crate::references::convert_references_to_pointers(arena, root);
    crate::references::convert_by_value_structs_to_pointers(arena, root, config);

    crate::disambiguate::disambiguate_functions(arena, root, config);
    crate::default_args::generate_default_argument_functions(arena, root, config);
    crate::unformatted::generate_unformatted_functions(arena, root, config);
    crate::helpers::mark_imstr_helpers(arena, root);
    crate::forward_decl::generate_forward_declarations(arena, root);

    crate::rename::rename_by_signature(arena, root, config);
    crate::rename::rewrite_function_conditionals(arena, root, config);
    crate::rename::rename_defines(arena, root, config);
    crate::rename::rename_entire_prefix(arena, root, config);
    crate::rename::apply_export_macro(arena, root, config);
    crate::includes::rewrite_includes(arena, root, config);
    crate::remove::add_function_comments(arena, root, config);

    crate::helpers::wrap_extern_c(arena, root);
    crate::cosmetic::collapse_excess_blank_lines(arena, root);

    arena.validate_hierarchy()?;
    Ok(())
}
