//! Randomized test-suite generation.
//!
//! Values are drawn at generation time from the per-shape synthesizer and
//! embedded as literals, so the generated tests are deterministic. Coverage
//! per structure: construction from valid values, the equality/hash
//! contract, constraint-violation cases (out-of-range numerics, confounded
//! patterns, undersized strings), default application, and span ordering.

use tracing::debug;

use super::context::RunContext;
use super::defaults::resolve_default;
use super::structs::boxed_ctor_arg;
use crate::emit::SourceWriter;
use crate::errors::StructuralError;
use crate::member::{NumberKind, StructureMember};
use crate::model::{Shape, ShapeKind};
use crate::random::{out_of_range_values, SampleValue, StructArg, ValueSynthesizer};

/// Generate the `#[cfg(test)]` module for one structure, or `None` when the
/// shape has no members to exercise.
pub fn generate_struct_tests<'m>(
    ctx: &RunContext<'m>,
    shape: &'m Shape,
) -> Result<Option<String>, StructuralError> {
    let members = ctx.members_of(shape)?;
    if members.is_empty() {
        return Ok(None);
    }
    let mut synth = ValueSynthesizer::for_shape(ctx.model(), ctx.namer(), &shape.id);
    let sample = synth.synthesize(shape)?;
    let SampleValue::Structure { type_name, args } = &sample else {
        return Ok(None);
    };

    let mut w = SourceWriter::new();
    w.line("#[cfg(test)]");
    w.open("mod tests");
    w.line("#![allow(clippy::unwrap_used)]");
    w.blank();
    w.line("use super::*;");
    w.blank();
    w.open("fn hash_of<T: std::hash::Hash>(value: &T) -> u64");
    w.line("use std::hash::Hasher;");
    w.line("let mut hasher = std::collections::hash_map::DefaultHasher::new();");
    w.line("value.hash(&mut hasher);");
    w.line("hasher.finish()");
    w.close();

    emit_construction_test(&mut w, type_name, args);
    emit_negative_range_test(&mut w, &members, type_name, args);
    emit_pattern_tests(&mut w, shape, &mut synth, &members, type_name, args);
    emit_length_test(&mut w, &members, type_name, args);
    emit_default_test(ctx, &mut w, shape, &members, type_name, args)?;
    emit_span_test(&mut w, shape, &mut synth, &members)?;

    w.close();
    debug!(shape = %shape.id, "generated test module");
    Ok(Some(w.finish()))
}

fn render_args(args: &[StructArg], replace: Option<(usize, &str)>) -> String {
    args.iter()
        .enumerate()
        .map(|(i, arg)| match replace {
            Some((idx, expr)) if idx == i => expr.to_string(),
            _ => {
                if arg.boxed {
                    format!("Some({})", arg.value.render())
                } else {
                    arg.value.render()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_construction_test(w: &mut SourceWriter, type_name: &str, args: &[StructArg]) {
    w.blank();
    w.line("#[test]");
    w.open("fn construction_and_equality_contract()");
    w.line(format!(
        "let a = {type_name}::new({}).unwrap();",
        render_args(args, None)
    ));
    w.line(format!(
        "let b = {type_name}::new({}).unwrap();",
        render_args(args, None)
    ));
    w.line("assert_eq!(a, b);");
    w.line("assert_eq!(hash_of(&a), hash_of(&b));");
    w.close();
}

/// One test per first range-constrained integral member: every probe just
/// outside the declared bounds must be rejected.
fn emit_negative_range_test(
    w: &mut SourceWriter,
    members: &[StructureMember<'_>],
    type_name: &str,
    args: &[StructArg],
) {
    let Some((idx, sm, kind, probes)) = members.iter().enumerate().find_map(|(i, sm)| {
        let kind = sm.number_kind().filter(|k| !k.is_floating_point())?;
        let range = sm.range()?;
        let probes = out_of_range_values(kind, range);
        (!probes.is_empty()).then_some((i, sm, kind, probes))
    }) else {
        return;
    };
    w.blank();
    w.line("#[test]");
    w.open(format!("fn rejects_out_of_range_{}()", sm.field().trim_start_matches("r#")));
    for probe in probes {
        let literal = wrap_boxed(&args[idx], &format!("{probe}{}", kind.rust_name()));
        w.line(format!(
            "assert!({type_name}::new({}).is_err());",
            render_args(args, Some((idx, literal.as_str())))
        ));
    }
    w.close();
}

fn emit_pattern_tests<'m>(
    w: &mut SourceWriter,
    shape: &Shape,
    synth: &mut ValueSynthesizer<'m>,
    members: &[StructureMember<'m>],
    type_name: &str,
    args: &[StructArg],
) {
    let Some((idx, sm)) = members
        .iter()
        .enumerate()
        .find(|(_, sm)| sm.pattern().is_some() && matches!(sm.target().kind, ShapeKind::String))
    else {
        return;
    };
    // A missing negative sample is a coverage gap, not an error.
    let Some(invalid) = synth.invalid_string(sm.target(), Some(sm.member())) else {
        debug!(shape = %shape.id, member = sm.name(), "no negative pattern sample; skipping test");
        return;
    };
    w.blank();
    w.line("#[test]");
    w.open(format!(
        "fn rejects_mismatched_{}()",
        sm.field().trim_start_matches("r#")
    ));
    let literal = wrap_boxed(&args[idx], &format!("{invalid:?}.to_string()"));
    w.line(format!(
        "assert!({type_name}::new({}).is_err());",
        render_args(args, Some((idx, literal.as_str())))
    ));
    w.close();
}

/// Undersized-string rejection for the first string member with a length
/// minimum above zero and no pattern (a pattern would dominate the failure).
fn emit_length_test(
    w: &mut SourceWriter,
    members: &[StructureMember<'_>],
    type_name: &str,
    args: &[StructArg],
) {
    let Some((idx, sm, min)) = members.iter().enumerate().find_map(|(i, sm)| {
        if !matches!(sm.target().kind, ShapeKind::String) || sm.pattern().is_some() {
            return None;
        }
        let min = sm.length()?.min.filter(|m| *m >= 1)?;
        Some((i, sm, min))
    }) else {
        return;
    };
    w.blank();
    w.line("#[test]");
    w.open(format!(
        "fn rejects_undersized_{}()",
        sm.field().trim_start_matches("r#")
    ));
    let short = "x".repeat((min - 1) as usize);
    let literal = wrap_boxed(&args[idx], &format!("{short:?}.to_string()"));
    w.line(format!(
        "assert!({type_name}::new({}).is_err());",
        render_args(args, Some((idx, literal.as_str())))
    ));
    w.close();
}

/// Passing `None` for a defaulted member must apply the shared constant.
fn emit_default_test(
    ctx: &RunContext<'_>,
    w: &mut SourceWriter,
    shape: &Shape,
    members: &[StructureMember<'_>],
    type_name: &str,
    args: &[StructArg],
) -> Result<(), StructuralError> {
    for (idx, sm) in members.iter().enumerate() {
        if !sm.has_default() {
            continue;
        }
        let Some(default) = resolve_default(ctx, shape, sm)? else {
            continue;
        };
        // Only consts compare cleanly against the getter; lazily built
        // defaults (timestamps, big numerics) are covered by construction.
        if default.expr != default.const_name {
            continue;
        }
        w.blank();
        w.line("#[test]");
        w.open(format!(
            "fn default_applies_to_{}()",
            sm.field().trim_start_matches("r#")
        ));
        w.line(format!(
            "let instance = {type_name}::new({}).unwrap();",
            render_args(args, Some((idx, "None")))
        ));
        w.line(format!(
            "assert_eq!(instance.{}(), {});",
            sm.getter(),
            default.const_name
        ));
        w.close();
        return Ok(());
    }
    Ok(())
}

/// Span invariant: across several synthesized instances the lesser member
/// never exceeds the greater.
fn emit_span_test<'m>(
    w: &mut SourceWriter,
    shape: &'m Shape,
    synth: &mut ValueSynthesizer<'m>,
    members: &[StructureMember<'_>],
) -> Result<(), StructuralError> {
    let Some(span) = &shape.traits.span else {
        return Ok(());
    };
    let lesser = members.iter().find(|sm| sm.name() == span.lesser);
    let greater = members.iter().find(|sm| sm.name() == span.greater);
    let (Some(lesser), Some(greater)) = (lesser, greater) else {
        return Ok(());
    };
    w.blank();
    w.line("#[test]");
    w.open("fn span_ordering_holds()");
    for _ in 0..3 {
        let sample = synth.synthesize(shape)?;
        let SampleValue::Structure { type_name, args } = &sample else {
            continue;
        };
        w.line(format!(
            "let instance = {type_name}::new({}).unwrap();",
            render_args(args, None)
        ));
        w.line(format!(
            "assert!(instance.{}() <= instance.{}());",
            lesser.getter(),
            greater.getter()
        ));
    }
    w.close();
    Ok(())
}

fn wrap_boxed(arg: &StructArg, expr: &str) -> String {
    if arg.boxed {
        format!("Some({expr})")
    } else {
        expr.to_string()
    }
}
