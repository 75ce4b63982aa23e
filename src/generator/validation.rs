//! Construction-time validation emission.
//!
//! For each constructor argument carrying constraints the checks come out in
//! a fixed order: null guard (only for members that are neither required nor
//! defaulted, wrapping everything else), pattern, length, numeric range.
//! Checks for an unconstrained direction — a bound equal to the kind's
//! natural extreme — are omitted entirely.

use crate::emit::{quote_raw, FailureProvider, SourceWriter};
use crate::errors::StructuralError;
use crate::member::{NumberKind, StructureMember};
use crate::model::{number_as_i128, ShapeKind};
use crate::random::anchored;

/// Emit all checks for one member. `value` names a binding holding the
/// (present) value; `by_ref` is true when that binding is a reference.
/// Returns module-level items (pattern statics, boundary constants) to hoist
/// to the top of the generated file.
pub fn emit_member_checks(
    w: &mut SourceWriter,
    failures: &dyn FailureProvider,
    sm: &StructureMember<'_>,
    value: &str,
    by_ref: bool,
) -> Result<Vec<String>, StructuralError> {
    let mut statics = Vec::new();
    emit_pattern_check(w, failures, sm, value, &mut statics)?;
    emit_length_check(w, failures, sm, value);
    emit_range_check(w, failures, sm, value, by_ref, &mut statics);
    Ok(statics)
}

fn emit_pattern_check(
    w: &mut SourceWriter,
    failures: &dyn FailureProvider,
    sm: &StructureMember<'_>,
    value: &str,
    statics: &mut Vec<String>,
) -> Result<(), StructuralError> {
    let Some(pattern) = sm.pattern() else {
        return Ok(());
    };
    if !matches!(sm.target().kind, ShapeKind::String) {
        return Ok(());
    }
    // Compiling here proves the pattern is sound before any text is emitted.
    let anchored_pattern = anchored(pattern);
    regex::Regex::new(&anchored_pattern).map_err(|e| StructuralError::MalformedPattern {
        location: sm.name().to_string(),
        detail: e.to_string(),
    })?;

    let static_name = format!("RE_{}", upper(sm.field()));
    statics.push(format!(
        "static {static_name}: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();\n"
    ));
    w.line(format!(
        "let re = {static_name}.get_or_init(|| regex::Regex::new({}).expect(\"pattern verified at generation time\"));",
        quote_raw(&anchored_pattern)
    ));
    w.open(format!("if !re.is_match(&{value})"));
    failures.emit_failure(
        w,
        &format!(
            "format!(\"{} must match pattern {} but was {{:?}}\", {value})",
            sm.name(),
            escape_braces(pattern),
        ),
    );
    w.close();
    Ok(())
}

fn emit_length_check(
    w: &mut SourceWriter,
    failures: &dyn FailureProvider,
    sm: &StructureMember<'_>,
    value: &str,
) {
    let Some(length) = sm.length() else {
        return;
    };
    let len_expr = match &sm.target().kind {
        ShapeKind::String => format!("{value}.chars().count()"),
        ShapeKind::List { .. } | ShapeKind::Map { .. } | ShapeKind::Blob => {
            format!("{value}.len()")
        }
        _ => return,
    };
    let what = match &sm.target().kind {
        ShapeKind::String => "length",
        _ => "size",
    };
    // Minimum zero is the natural extreme; no check to emit.
    if let Some(min) = length.min.filter(|m| *m > 0) {
        w.open(format!("if {len_expr} < {min}"));
        failures.emit_failure(
            w,
            &format!(
                "format!(\"{} must have a minimum {what} of {min} but was {{}}\", {len_expr})",
                sm.name()
            ),
        );
        w.close();
    }
    if let Some(max) = length.max {
        w.open(format!("if {len_expr} > {max}"));
        failures.emit_failure(
            w,
            &format!(
                "format!(\"{} must have a maximum {what} of {max} but was {{}}\", {len_expr})",
                sm.name()
            ),
        );
        w.close();
    }
}

fn emit_range_check(
    w: &mut SourceWriter,
    failures: &dyn FailureProvider,
    sm: &StructureMember<'_>,
    value: &str,
    by_ref: bool,
    statics: &mut Vec<String>,
) {
    let Some(range) = sm.range() else {
        return;
    };
    match &sm.target().kind {
        ShapeKind::BigInteger => {
            emit_big_range(w, failures, sm, value, statics, "num_bigint::BigInt", range)
        }
        ShapeKind::BigDecimal => {
            emit_big_range(w, failures, sm, value, statics, "bigdecimal::BigDecimal", range)
        }
        kind => {
            let Some(number_kind) = NumberKind::for_kind(kind) else {
                return;
            };
            let deref = if by_ref { "*" } else { "" };
            if let Some(min) = range.min.as_ref().filter(|m| !is_kind_minimum(number_kind, m)) {
                let lit = number_kind.format_literal(min);
                w.open(format!("if {deref}{value} < {lit}"));
                failures.emit_failure(
                    w,
                    &format!(
                        "format!(\"{} must be >= {} but was {{}}\", {value})",
                        sm.name(),
                        min
                    ),
                );
                w.close();
            }
            if let Some(max) = range.max.as_ref().filter(|m| !is_kind_maximum(number_kind, m)) {
                let lit = number_kind.format_literal(max);
                w.open(format!("if {deref}{value} > {lit}"));
                failures.emit_failure(
                    w,
                    &format!(
                        "format!(\"{} must be <= {} but was {{}}\", {value})",
                        sm.name(),
                        max
                    ),
                );
                w.close();
            }
        }
    }
}

/// Range checks for the arbitrary-precision kinds use the sign of `cmp`
/// against precomputed boundary constants.
fn emit_big_range(
    w: &mut SourceWriter,
    failures: &dyn FailureProvider,
    sm: &StructureMember<'_>,
    value: &str,
    statics: &mut Vec<String>,
    type_name: &str,
    range: &crate::model::RangeBounds,
) {
    for (bound, is_min) in [(range.min.as_ref(), true), (range.max.as_ref(), false)] {
        let Some(bound) = bound else { continue };
        let suffix = if is_min { "MIN" } else { "MAX" };
        let static_name = format!("{}_{suffix}", upper(sm.field()));
        let accessor = static_name.to_ascii_lowercase();
        statics.push(format!(
            "static {static_name}: std::sync::OnceLock<{type_name}> = std::sync::OnceLock::new();\n\
             fn {accessor}() -> &'static {type_name} {{\n    \
                 {static_name}.get_or_init(|| {})\n\
             }}\n",
            big_constant_expr(type_name, bound)
        ));
        let ordering = if is_min { "Less" } else { "Greater" };
        let op = if is_min { ">=" } else { "<=" };
        w.open(format!(
            "if {value}.cmp({accessor}()) == std::cmp::Ordering::{ordering}"
        ));
        failures.emit_failure(
            w,
            &format!(
                "format!(\"{} must be {op} {} but was {{}}\", {value})",
                sm.name(),
                bound
            ),
        );
        w.close();
    }
}

/// Boundary constants reuse the canonical zero/one/two/ten forms when a
/// bound equals one of them; anything else parses its literal form once.
fn big_constant_expr(type_name: &str, bound: &serde_json::Number) -> String {
    if let Some(v) = number_as_i128(bound) {
        let exact = bound.as_f64().map(|f| f.fract() == 0.0).unwrap_or(true);
        if exact && matches!(v, 0 | 1 | 2 | 10) {
            return format!("{type_name}::from({v}u8)");
        }
    }
    format!(
        "{:?}.parse::<{type_name}>().expect(\"bound literal verified at generation time\")",
        bound.to_string()
    )
}

fn is_kind_minimum(kind: NumberKind, bound: &serde_json::Number) -> bool {
    match kind.integer_domain() {
        Some((lo, _)) => number_as_i128(bound) == Some(lo),
        None => kind
            .float_domain()
            .map(|(lo, _)| bound.as_f64() == Some(lo))
            .unwrap_or(false),
    }
}

fn is_kind_maximum(kind: NumberKind, bound: &serde_json::Number) -> bool {
    match kind.integer_domain() {
        Some((_, hi)) => number_as_i128(bound) == Some(hi),
        None => kind
            .float_domain()
            .map(|(_, hi)| bound.as_f64() == Some(hi))
            .unwrap_or(false),
    }
}

fn upper(field: &str) -> String {
    field.trim_start_matches("r#").to_ascii_uppercase()
}

fn escape_braces(pattern: &str) -> String {
    pattern.replace('{', "{{").replace('}', "}}").replace('"', "\\\"")
}
