//! # shapegen
//!
//! **shapegen** is a schema-driven Rust source generator: given a graph of
//! schema *shapes* (scalars, lists, maps, structures, unions, enums)
//! annotated with constraint *traits* (required, default, range, length,
//! pattern, uniqueItems), it emits data structs with validating
//! constructors, equality/hash contracts, matching randomized test suites,
//! and HTTP request-binding glue.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`model`]** - The shape/trait/member graph and its JSON/YAML loader
//! - **[`member`]** - Per-run structure member resolution: representation
//!   policy, naming, comparison-cost weighting
//! - **[`constraints`]** - Fail-fast constraint compatibility checking
//! - **[`emit`]** - The low-level source writer and the pluggable
//!   validation-failure provider
//! - **[`generator`]** - Struct/enum/union emission, construction-time
//!   validation, default resolution, equality/hash contracts, request
//!   bindings, randomized test generation, and project assembly
//! - **[`random`]** - Deterministic per-shape value synthesis, including
//!   regex-directed string sampling and negative-sample confounding
//! - **[`cli`]** - The `shapegen-gen` command line
//!
//! ## Generation Flow
//!
//! ```text
//! model.json → load_model → Model
//!     → ConstraintChecker (per structure, fail fast)
//!     → StructureMember resolution (names, types, weights; cached per run)
//!     → validation / defaults / equality emission
//!     → ValueSynthesizer (seeded per shape) → generated #[cfg(test)] suites
//!     → project files on disk
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use shapegen::generator::generate_project;
//! use shapegen::model::load_model;
//!
//! # fn main() -> anyhow::Result<()> {
//! let model = load_model("model.json".as_ref())?;
//! generate_project(&model, "my-types".as_ref(), "my-types", false)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - **Fail fast**: contradictory or out-of-domain constraints abort the
//!   affected structure before a single line is emitted.
//! - **Deterministic**: value synthesis is seeded from the shape id, so the
//!   same model generates the same code and tests, run after run.
//! - **Run isolation**: all caches live in a [`generator::RunContext`]
//!   passed down the call tree; runs share no global state.

pub mod cli;
pub mod constraints;
pub mod emit;
pub mod errors;
pub mod generator;
pub mod member;
pub mod model;
pub mod random;

pub use constraints::ConstraintChecker;
pub use errors::StructuralError;
pub use generator::{generate_project, RunContext};
pub use member::{DefaultNamer, Namer, NumberKind, RustType, StructureMember};
pub use model::{load_model, Member, Model, Shape, ShapeId, ShapeKind, TraitSet};
pub use random::{SampleValue, ValueSynthesizer, Xeger};
