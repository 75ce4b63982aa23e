//! # Generator Module
//!
//! Turns a checked shape model into Rust source: data structs with
//! validating constructors, equality/hash contracts, default constants,
//! enum/union definitions, HTTP request-binding glue, and randomized test
//! suites.
//!
//! ## Flow
//!
//! ```text
//! Model → ConstraintChecker → StructureMember resolution
//!       → {validation, defaults, equality, bindings} emission
//!       → randomized test synthesis → project files on disk
//! ```
//!
//! Constraint checking runs per structure before any emission and aborts
//! that structure on the first violation; a structure either generates
//! completely or not at all. All per-run state lives in [`RunContext`].
//!
//! ## Programmatic usage
//!
//! ```rust,ignore
//! use shapegen::generator::{generate_project, RunContext};
//! use shapegen::model::load_model;
//!
//! let model = load_model("model.json".as_ref())?;
//! generate_project(&model, "out".as_ref(), "my-types", false)?;
//! ```

mod adts;
mod bindings;
mod context;
mod defaults;
mod equality;
mod project;
mod structs;
mod testgen;
mod validation;

pub use adts::generate_adt;
pub use bindings::{emit_support_types, generate_request_bindings};
pub use context::RunContext;
pub use defaults::{resolve_default, DefaultConst};
pub use equality::emit_equality_impls;
pub use project::generate_project;
pub use structs::generate_structure;
pub use testgen::generate_struct_tests;
pub use validation::emit_member_checks;
