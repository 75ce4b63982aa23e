//! Output-project assembly: one file per named shape, a support-types
//! module, a crate manifest, and a lib.rs tying them together.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use super::adts::generate_adt;
use super::bindings::{emit_support_types, generate_request_bindings};
use super::context::RunContext;
use super::structs::generate_structure;
use super::testgen::generate_struct_tests;
use crate::member::naming::to_snake_case;
use crate::model::{Model, ShapeKind};

/// Generate a complete crate from a model into `out_dir`.
///
/// Refuses to touch an existing `src/` unless `force` is set. Structures
/// that fail constraint checking abort the whole run; partially written
/// output is not cleaned up, matching the fail-fast model-error contract.
pub fn generate_project(
    model: &Model,
    out_dir: &Path,
    crate_name: &str,
    force: bool,
) -> anyhow::Result<PathBuf> {
    let src_dir = out_dir.join("src");
    if src_dir.exists() && !force {
        anyhow::bail!(
            "output directory {src_dir:?} already exists (use --force to overwrite)"
        );
    }
    fs::create_dir_all(&src_dir)
        .with_context(|| format!("Failed to create output directory {src_dir:?}"))?;

    let ctx = RunContext::new(model);
    let mut modules = Vec::new();

    write_file(&src_dir.join("types.rs"), &emit_support_types())?;
    modules.push("types".to_string());

    for shape in model.named_shapes() {
        let module = to_snake_case(shape.id.name());
        let mut file = String::new();
        match &shape.kind {
            ShapeKind::Structure { .. } => {
                // Hash is in scope for the manual impl; the glob picks up
                // sibling types and the support module.
                file.push_str("use std::hash::Hash;\n\nuse super::*;\n\n");
                file.push_str(&generate_structure(&ctx, shape)?);
                if let Some(bindings) = generate_request_bindings(&ctx, shape)? {
                    file.push('\n');
                    file.push_str(&bindings);
                }
                if let Some(tests) = generate_struct_tests(&ctx, shape)? {
                    file.push('\n');
                    file.push_str(&tests);
                }
            }
            ShapeKind::Union { .. } => {
                file.push_str("#[allow(unused_imports)]\nuse super::*;\n\n");
                file.push_str(&generate_adt(&ctx, shape)?);
            }
            _ => {
                file.push_str(&generate_adt(&ctx, shape)?);
            }
        }
        write_file(&src_dir.join(format!("{module}.rs")), &file)?;
        info!(shape = %shape.id, module, "generated");
        println!("✅ Generated {module}.rs for {}", shape.id);
        modules.push(module);
    }

    let mut lib = String::new();
    lib.push_str(&format!(
        "//! Generated data types for the `{crate_name}` model. Do not edit by hand.\n\n"
    ));
    for module in &modules {
        lib.push_str(&format!("mod {module};\n"));
    }
    lib.push('\n');
    for module in &modules {
        lib.push_str(&format!("pub use {module}::*;\n"));
    }
    write_file(&src_dir.join("lib.rs"), &lib)?;
    write_file(&out_dir.join("Cargo.toml"), &cargo_manifest(crate_name))?;
    println!("✅ Generated project at {out_dir:?} ({} modules)", modules.len());
    Ok(out_dir.to_path_buf())
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {path:?}"))
}

fn cargo_manifest(crate_name: &str) -> String {
    format!(
        "[package]\n\
         name = \"{crate_name}\"\n\
         version = \"0.1.0\"\n\
         edition = \"2021\"\n\
         \n\
         [dependencies]\n\
         serde = {{ version = \"1.0\", features = [\"derive\"] }}\n\
         serde_json = \"1.0\"\n\
         regex = \"1\"\n\
         time = {{ version = \"0.3\", features = [\"parsing\", \"formatting\", \"serde-well-known\", \"macros\"] }}\n\
         num-bigint = {{ version = \"0.4\", features = [\"serde\"] }}\n\
         bigdecimal = {{ version = \"0.4\", features = [\"serde\"] }}\n"
    )
}
