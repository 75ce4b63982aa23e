//! Default-value resolution.
//!
//! Each defaulted member resolves to one shared constant (or lazily
//! initialized static for non-const-constructible types) emitted at the top
//! of the generated file and reused by every constructor. Defaulted
//! collections, structures, unions, blobs and documents are an intentional
//! unimplemented case: they raise, never silently approximate.

use serde_json::Value;

use super::context::RunContext;
use crate::errors::StructuralError;
use crate::member::{naming::enum_variant_name, NumberKind, StructureMember};
use crate::model::{number_as_i128, Shape, ShapeKind};

/// A resolved default: the items to hoist to the top of the file and the
/// expression constructors use to obtain the value.
#[derive(Debug, Clone)]
pub struct DefaultConst {
    pub const_name: String,
    /// Module-level item text (constant or static plus accessor).
    pub decl: String,
    /// Expression yielding an owned default inside a constructor.
    pub expr: String,
}

pub fn resolve_default(
    ctx: &RunContext<'_>,
    structure: &Shape,
    sm: &StructureMember<'_>,
) -> Result<Option<DefaultConst>, StructuralError> {
    let Some(value) = sm.default_value() else {
        return Ok(None);
    };
    let name = ctx.default_const_name(structure, sm.field());
    let member_id = format!("{}${}", structure.id, sm.name());
    let target = sm.target();

    let resolved = match &target.kind {
        ShapeKind::Boolean => {
            let v = value
                .as_bool()
                .ok_or_else(|| malformed(&member_id, "bool", value))?;
            DefaultConst {
                decl: format!("pub const {name}: bool = {v};\n"),
                expr: name.clone(),
                const_name: name,
            }
        }
        ShapeKind::Byte | ShapeKind::Short | ShapeKind::Integer | ShapeKind::Long => {
            let kind = NumberKind::for_kind(&target.kind).unwrap_or(NumberKind::Long);
            let v = value
                .as_number()
                .and_then(number_as_i128)
                .ok_or_else(|| malformed(&member_id, kind.rust_name(), value))?;
            let (lo, hi) = kind.integer_domain().unwrap_or((i128::MIN, i128::MAX));
            if v < lo || v > hi {
                return Err(malformed(&member_id, kind.rust_name(), value));
            }
            DefaultConst {
                decl: format!("pub const {name}: {} = {v};\n", kind.rust_name()),
                expr: name.clone(),
                const_name: name,
            }
        }
        ShapeKind::Float | ShapeKind::Double => {
            let kind = NumberKind::for_kind(&target.kind).unwrap_or(NumberKind::Double);
            let v = value
                .as_f64()
                .ok_or_else(|| malformed(&member_id, kind.rust_name(), value))?;
            DefaultConst {
                decl: format!("pub const {name}: {} = {v:?};\n", kind.rust_name()),
                expr: name.clone(),
                const_name: name,
            }
        }
        ShapeKind::String => {
            let v = value
                .as_str()
                .ok_or_else(|| malformed(&member_id, "string", value))?;
            DefaultConst {
                decl: format!("pub const {name}: &str = {v:?};\n"),
                expr: format!("{name}.to_string()"),
                const_name: name,
            }
        }
        ShapeKind::Enum { constants } => {
            let v = value
                .as_str()
                .ok_or_else(|| malformed(&member_id, "enum value", value))?;
            // The model stores these inverted: the trait carries the wire
            // value, so the constant is found by value, not declared name.
            let constant = constants
                .iter()
                .find(|c| c.value == v)
                .ok_or_else(|| StructuralError::NoSuchEnumConstant {
                    member: member_id.clone(),
                    target: target.id.clone(),
                    value: v.to_string(),
                })?;
            let type_name = ctx.namer().type_name(&target.id);
            let variant = enum_variant_name(&constant.name);
            DefaultConst {
                decl: format!("pub const {name}: {type_name} = {type_name}::{variant};\n"),
                expr: name.clone(),
                const_name: name,
            }
        }
        ShapeKind::IntEnum { constants } => {
            let v = value
                .as_i64()
                .ok_or_else(|| malformed(&member_id, "intEnum value", value))?;
            let constant = constants
                .iter()
                .find(|c| i64::from(c.value) == v)
                .ok_or_else(|| StructuralError::NoSuchEnumConstant {
                    member: member_id.clone(),
                    target: target.id.clone(),
                    value: v.to_string(),
                })?;
            let type_name = ctx.namer().type_name(&target.id);
            let variant = enum_variant_name(&constant.name);
            DefaultConst {
                decl: format!("pub const {name}: {type_name} = {type_name}::{variant};\n"),
                expr: name.clone(),
                const_name: name,
            }
        }
        ShapeKind::Timestamp => {
            let v = value
                .as_str()
                .ok_or_else(|| malformed(&member_id, "ISO-8601 timestamp", value))?;
            if !looks_like_iso_timestamp(v) {
                return Err(malformed(&member_id, "ISO-8601 timestamp", value));
            }
            let accessor = accessor_name(&name);
            let decl = format!(
                "static {name}: std::sync::OnceLock<time::OffsetDateTime> = std::sync::OnceLock::new();\n\
                 fn {accessor}() -> time::OffsetDateTime {{\n    \
                     *{name}.get_or_init(|| {{\n        \
                         time::OffsetDateTime::parse({v:?}, &time::format_description::well_known::Rfc3339)\n            \
                             .expect(\"default timestamp literal verified at generation time\")\n    \
                     }})\n\
                 }}\n"
            );
            DefaultConst {
                decl,
                expr: format!("{accessor}()"),
                const_name: name,
            }
        }
        ShapeKind::BigInteger => {
            let literal = integral_literal(value)
                .ok_or_else(|| malformed(&member_id, "bigInteger", value))?;
            big_default(&name, "num_bigint::BigInt", &literal)
        }
        ShapeKind::BigDecimal => {
            let literal = decimal_literal(value)
                .ok_or_else(|| malformed(&member_id, "bigDecimal", value))?;
            big_default(&name, "bigdecimal::BigDecimal", &literal)
        }
        ShapeKind::List { .. }
        | ShapeKind::Map { .. }
        | ShapeKind::Structure { .. }
        | ShapeKind::Union { .. }
        | ShapeKind::Blob
        | ShapeKind::Document => {
            return Err(StructuralError::UnsupportedDefault {
                member: member_id,
                target: target.id.clone(),
                kind: target.kind.label(),
            });
        }
    };
    Ok(Some(resolved))
}

fn big_default(name: &str, type_name: &str, literal: &str) -> DefaultConst {
    let accessor = accessor_name(name);
    let decl = format!(
        "static {name}: std::sync::OnceLock<{type_name}> = std::sync::OnceLock::new();\n\
         fn {accessor}() -> &'static {type_name} {{\n    \
             {name}.get_or_init(|| {{\n        \
                 {literal:?}.parse::<{type_name}>()\n            \
                     .expect(\"default literal verified at generation time\")\n    \
                 }})\n\
         }}\n"
    );
    DefaultConst {
        decl,
        expr: format!("{accessor}().clone()"),
        const_name: name.to_string(),
    }
}

fn accessor_name(const_name: &str) -> String {
    const_name.to_ascii_lowercase()
}

/// Accept a numeric or string literal form for a big-integer default.
fn integral_literal(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => number_as_i128(n).map(|v| v.to_string()),
        Value::String(s)
            if !s.is_empty()
                && s.trim_start_matches(['-', '+']).chars().all(|c| c.is_ascii_digit()) =>
        {
            Some(s.clone())
        }
        _ => None,
    }
}

fn decimal_literal(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.parse::<f64>().is_ok() => Some(s.clone()),
        _ => None,
    }
}

fn looks_like_iso_timestamp(v: &str) -> bool {
    let bytes = v.as_bytes();
    bytes.len() >= 20
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b'T'
        && bytes[0..4].iter().all(u8::is_ascii_digit)
}

fn malformed(member: &str, kind: &'static str, value: &Value) -> StructuralError {
    StructuralError::MalformedDefault {
        member: member.to_string(),
        kind,
        value: value.to_string(),
    }
}
