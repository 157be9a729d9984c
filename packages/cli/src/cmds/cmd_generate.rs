use std::path::Path;

use cu::pre::*;
use hast::{Arena, NodeId};
use utils::Config;

/// Runs the whole pipeline spec §6.4 describes: parse every configured
/// header into one arena, snapshot the unmodified twins, run the fixed
/// modifier sequence, then emit the C header, C++ thunk source, and JSON
/// metadata (spec §6.5).
pub fn run(config: Config) -> cu::Result<()> {
    let (mut arena, root, public_files) = parse_inputs(&config)?;

    cu::info!(
        "parsed {} public header(s), {} internal header(s)",
        public_files.len(),
        config.paths.internal_inputs.len()
    );

    // Snapshot before any modifier runs so thunks/metadata can recover the
    // pre-rewrite name and type (spec §3.5).
    hast::save_unmodified_twins(&mut arena, root);

    modifiers::run_pipeline(&mut arena, root, &config.pipeline)
        .context("modifier pipeline failed")?;
    cu::info!("modifier pipeline complete");

    emit_outputs(&arena, &public_files, &config)
}

fn parse_inputs(config: &Config) -> cu::Result<(Arena, NodeId, Vec<(NodeId, String)>)> {
    let paths = &config.paths;
    cu::ensure!(!paths.inputs.is_empty(), "config.paths.inputs must be non-empty")?;

    let mut inputs = paths.inputs.iter();
    let first = inputs.next().expect("checked non-empty above");
    let first_name = header_name(first)?;
    let first_src = cu::fs::read_string(first)?;
    let (mut arena, root) = parser::parse(&first_src, &first_name)
        .context(format!("failed to parse {}", first.display()))?;

    let first_file = arena.get(root).children[0];
    let mut public_files = vec![(first_file, first_name)];

    for input in inputs {
        let name = header_name(input)?;
        let src = cu::fs::read_string(input)?;
        let (new_arena, file) = parser::parse_additional(arena, root, &src, &name)
            .context(format!("failed to parse {}", input.display()))?;
        arena = new_arena;
        public_files.push((file, name));
    }

    // Internal/prerequisite headers (`--include`) are parsed into the same
    // DOM so modifiers that scan the whole tree (template instantiation,
    // reference rewriting) can see their types, but they are never passed
    // to a writer below - spec §6.1 "parsed into the DOM but not itself
    // emitted".
    for input in &paths.internal_inputs {
        let name = header_name(input)?;
        let src = cu::fs::read_string(input)?;
        let (new_arena, _file) = parser::parse_additional(arena, root, &src, &name)
            .context(format!("failed to parse internal header {}", input.display()))?;
        arena = new_arena;
    }

    Ok((arena, root, public_files))
}

fn header_name(path: &Path) -> cu::Result<String> {
    let display = path.display();
    let name = cu::check!(path.file_name(), "input path {display} has no file name")?;
    Ok(name.to_string_lossy().into_owned())
}

fn emit_outputs(arena: &Arena, public_files: &[(NodeId, String)], config: &Config) -> cu::Result<()> {
    let emit_config = build_emit_config(config);
    let output = &config.paths.output;
    let output_display = output.display();
    let output_stem = cu::check!(output.file_stem(), "output path {output_display} has no file stem")?
        .to_string_lossy()
        .into_owned();

    let header_name = format!("{output_stem}.h");
    let header_path = with_extension(output, "h");
    let thunk_path = with_extension(output, "cpp");

    let mut header_out = String::new();
    let mut thunk_out = String::new();
    let mut combined = codegen::Metadata::default();

    for (file, source_name) in public_files {
        header_out.push_str(&codegen::write_header(arena, *file, &emit_config));
        header_out.push('\n');

        thunk_out.push_str(&codegen::write_thunks(arena, *file, &emit_config, &header_name));
        thunk_out.push('\n');

        let metadata = codegen::collect_metadata(arena, *file, source_name);
        if config.paths.emit_combined_json_metadata {
            merge_metadata(&mut combined, metadata);
        } else {
            let stem = Path::new(source_name).file_stem().map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| source_name.clone());
            let json_path = output.with_file_name(format!("{output_stem}_{stem}.json"));
            write_metadata(&json_path, &metadata)?;
        }
    }

    let header_out = apply_templates(&config.paths, "h", &output_stem, header_out)?;
    let thunk_out = apply_templates(&config.paths, "cpp", &output_stem, thunk_out)?;

    cu::fs::write(&header_path, header_out)?;
    cu::fs::write(&thunk_path, thunk_out)?;
    cu::info!("wrote {}", header_path.display());
    cu::info!("wrote {}", thunk_path.display());

    if config.paths.emit_combined_json_metadata {
        let json_path = with_extension(output, "json");
        write_metadata(&json_path, &combined)?;
    }

    Ok(())
}

fn write_metadata(path: &Path, metadata: &codegen::Metadata) -> cu::Result<()> {
    let text = json::stringify_pretty(metadata)?;
    cu::fs::write(path, text)?;
    cu::info!("wrote {}", path.display());
    Ok(())
}

fn merge_metadata(combined: &mut codegen::Metadata, mut other: codegen::Metadata) {
    combined.defines.append(&mut other.defines);
    combined.enums.append(&mut other.enums);
    combined.typedefs.append(&mut other.typedefs);
    combined.structs.append(&mut other.structs);
    combined.functions.append(&mut other.functions);
}

fn with_extension(output: &Path, ext: &str) -> std::path::PathBuf {
    let mut p = output.to_path_buf();
    p.set_extension(ext);
    p
}

fn build_emit_config(config: &Config) -> codegen::EmitConfig {
    let paths = &config.paths;
    let pipeline = &config.pipeline;
    codegen::EmitConfig {
        by_value_structs: pipeline.by_value_structs.clone(),
        placement_constructor_structs: pipeline.placement_constructor_structs.clone(),
        extra_includes: paths.extra_includes.clone(),
        library_header: paths.library_include_dir.as_ref().map(|p| p.display().to_string()),
        backend_header: paths.backend_include_dir.as_ref().map(|p| p.display().to_string()),
        backend: pipeline.backend,
        config_header: paths.config_header.as_ref().map(|p| p.display().to_string()),
        emit_combined_json_metadata: paths.emit_combined_json_metadata,
        varargs_suffix_overrides: pipeline.varargs_suffix_overrides.clone(),
    }
}

/// Template-file concatenation (spec §6.3): two files per output extension,
/// `common-<stem>-template.<ext>` and `<src-stem>-<stem>-template.<ext>`
/// where `<stem>` is `header` for `.h` and `impl` for `.cpp`, read from
/// `paths.template_dir` and prepended to the generated content after
/// substituting the documented placeholders. A configured template
/// directory with a missing file is a fatal error; no `template_dir`
/// configured means no templates are prepended at all.
fn apply_templates(paths: &utils::PathsConfig, ext: &str, output_stem: &str, body: String) -> cu::Result<String> {
    let Some(dir) = &paths.template_dir else {
        return Ok(body);
    };
    let kind = if ext == "h" { "header" } else { "impl" };

    let mut out = String::new();
    for prefix in ["common", output_stem] {
        let file = dir.join(format!("{prefix}-{kind}-template.{ext}"));
        let text = cu::fs::read_string(&file)
            .context(format!("missing template file {}", file.display()))?;
        out.push_str(&substitute_placeholders(&text, paths, output_stem));
        out.push('\n');
    }
    out.push_str(&body);
    Ok(out)
}

fn substitute_placeholders(text: &str, paths: &utils::PathsConfig, output_stem: &str) -> String {
    let no_internal = output_stem.trim_end_matches("_internal");
    text.replace("%OUTPUT_HEADER_NAME%", &format!("{output_stem}.h"))
        .replace("%OUTPUT_HEADER_NAME_NO_INTERNAL%", &format!("{no_internal}.h"))
        .replace(
            "%IMGUI_INCLUDE_DIR%",
            paths.library_include_dir.as_ref().map(|p| p.display().to_string()).as_deref().unwrap_or(""),
        )
        .replace(
            "%BACKEND_INCLUDE_DIR%",
            paths.backend_include_dir.as_ref().map(|p| p.display().to_string()).as_deref().unwrap_or(""),
        )
}
