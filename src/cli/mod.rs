//! # CLI Module
//!
//! Command-line interface for the `shapegen-gen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Generate a crate of data types from a shape model:
//!
//! ```bash
//! shapegen-gen generate --model model.json --output my-types
//! ```
//!
//! Options:
//! - `--model <FILE>` - Path to the shape model (JSON or YAML)
//! - `--output <DIR>` - Output directory for the generated crate
//! - `--name <NAME>` - Generated crate name (default: output directory name)
//! - `--force` - Overwrite existing generated sources
//!
//! ### `lint`
//!
//! Run constraint compatibility checking only, emitting nothing:
//!
//! ```bash
//! shapegen-gen lint --model model.json
//! ```
//!
//! ### `inspect`
//!
//! Dump the resolved member model (names, representations, weights):
//!
//! ```bash
//! shapegen-gen inspect --model model.json
//! ```

mod commands;

pub use commands::{run_cli, Cli, Commands};
