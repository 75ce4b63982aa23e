use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::constraints::ConstraintChecker;
use crate::generator::{generate_project, RunContext};
use crate::model::load_model;

#[derive(Parser)]
#[command(name = "shapegen")]
#[command(about = "shapegen CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a crate of validated data types from a shape model
    Generate {
        #[arg(short, long)]
        model: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Crate name for the generated Cargo.toml
        #[arg(long)]
        name: Option<String>,

        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Check constraint compatibility without generating anything
    Lint {
        #[arg(short, long)]
        model: PathBuf,
    },
    /// Print the resolved member model: names, types, weights
    Inspect {
        #[arg(short, long)]
        model: PathBuf,
    },
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            model,
            output,
            name,
            force,
        } => {
            let loaded = load_model(&model)?;
            let crate_name = name.unwrap_or_else(|| {
                output
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "generated-types".to_string())
            });
            generate_project(&loaded, &output, &crate_name, force)?;
            Ok(())
        }
        Commands::Lint { model } => {
            let loaded = load_model(&model)?;
            let checker = ConstraintChecker::new(&loaded);
            let mut failures = 0usize;
            for shape in loaded.shapes().filter(|s| !s.id.is_prelude()) {
                let result = match &shape.kind {
                    crate::model::ShapeKind::Structure { .. } => checker.check_structure(shape),
                    _ => checker.check_shape(shape),
                };
                if let Err(err) = result {
                    failures += 1;
                    eprintln!("❌ {}: {err}", shape.id);
                    warn!(shape = %shape.id, %err, "constraint violation");
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} shape(s) failed constraint checking");
            }
            println!("✅ Model is constraint-compatible");
            Ok(())
        }
        Commands::Inspect { model } => {
            let loaded = load_model(&model)?;
            let ctx = RunContext::new(&loaded);
            for shape in loaded.structures() {
                println!("{}", shape.id);
                for sm in ctx.members_of(shape)?.iter() {
                    println!(
                        "  {:<24} {:<32} weight {:>8.2}{}{}",
                        sm.field(),
                        sm.rust_type().field_type(),
                        sm.weight(),
                        if sm.is_required() { "  required" } else { "" },
                        if sm.has_default() { "  defaulted" } else { "" },
                    );
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write;

    fn model_file(doc: serde_json::Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{doc}").unwrap();
        file
    }

    fn pet_doc() -> serde_json::Value {
        serde_json::json!({
            "shapes": [{
                "id": "example#Pet",
                "type": "structure",
                "members": [
                    { "name": "name", "target": "shapegen.api#String",
                      "traits": { "required": true, "length": { "min": 1, "max": 30 } } }
                ]
            }]
        })
    }

    #[test]
    fn generate_command_writes_project() {
        let file = model_file(pet_doc());
        let out = tempfile::tempdir().unwrap();
        let cli = Cli {
            command: Commands::Generate {
                model: file.path().to_path_buf(),
                output: out.path().to_path_buf(),
                name: Some("pets".to_string()),
                force: true,
            },
        };
        run_cli(cli).unwrap();
        assert!(out.path().join("src").join("pet.rs").exists());
    }

    #[test]
    fn lint_command_fails_on_inverted_bounds() {
        let file = model_file(serde_json::json!({
            "shapes": [{
                "id": "example#Name",
                "type": "string",
                "traits": { "length": { "min": 5, "max": 4 } }
            }]
        }));
        let cli = Cli {
            command: Commands::Lint {
                model: file.path().to_path_buf(),
            },
        };
        let err = run_cli(cli).unwrap_err();
        assert!(err.to_string().contains("failed constraint checking"));
    }

    #[test]
    fn lint_command_accepts_clean_model() {
        let file = model_file(pet_doc());
        let cli = Cli {
            command: Commands::Lint {
                model: file.path().to_path_buf(),
            },
        };
        run_cli(cli).unwrap();
    }
}
